// SQLite data store implementation
use crate::application::data_store::DataStore;
use crate::domain::dashboard::Row;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Statement};
use serde_json::{Number, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Owned handle to one SQLite connection. Statements run one at a time on
/// the blocking pool; each is an independent read, so there is no
/// transaction around them. Anything that would write is rejected before
/// it is stepped.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Self::from_connection(conn))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run one or more statements that return nothing, e.g. schema setup.
    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database mutex poisoned"))?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    async fn with_statement<T, F>(&self, sql: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Statement<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let conn = conn
                .lock()
                .map_err(|_| anyhow::anyhow!("database mutex poisoned"))?;
            let mut stmt = conn.prepare(&sql)?;
            if !stmt.readonly() {
                anyhow::bail!("Refusing to run a statement that writes to the database: {}", sql);
            }
            Ok(f(&mut stmt)?)
        })
        .await
        .context("Database task panicked")?
    }
}

fn column_names(stmt: &Statement<'_>) -> Vec<String> {
    stmt.column_names().into_iter().map(String::from).collect()
}

fn read_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Row> {
    let mut out = Row::new();
    for (idx, name) in columns.iter().enumerate() {
        out.insert(name.clone(), cell_to_json(row.get_ref(idx)?));
    }
    Ok(out)
}

fn cell_to_json(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(Number::from(i)),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => Value::String("[BLOB]".to_string()),
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn query_rows(&self, sql: &str) -> Result<Vec<Row>> {
        self.with_statement(sql, |stmt| {
            let columns = column_names(stmt);
            let mut rows = stmt.query([])?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(read_row(row, &columns)?);
            }
            Ok(out)
        })
        .await
    }

    async fn query_first(&self, sql: &str) -> Result<Option<Row>> {
        self.with_statement(sql, |stmt| {
            let columns = column_names(stmt);
            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Ok(Some(read_row(row, &columns)?)),
                None => Ok(None),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE t (a INTEGER, b REAL, c TEXT, d BLOB, e TEXT);
                 INSERT INTO t VALUES (1, 2.5, 'x', x'00ff', NULL);
                 INSERT INTO t VALUES (2, 0.5, 'y', NULL, 'z');",
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_query_rows_maps_every_storage_class() {
        let rows = store().query_rows("SELECT a, b, c, d, e FROM t ORDER BY a").await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"a": 1, "b": 2.5, "c": "x", "d": "[BLOB]", "e": null})
        );
    }

    #[tokio::test]
    async fn test_column_order_follows_select_list() {
        let rows = store().query_rows("SELECT e, c, a FROM t").await.unwrap();
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["e", "c", "a"]);
    }

    #[tokio::test]
    async fn test_query_first() {
        let store = store();
        let row = store.query_first("SELECT COUNT(*) AS n FROM t").await.unwrap().unwrap();
        assert_eq!(row["n"], json!(2));

        let none = store.query_first("SELECT a FROM t WHERE a > 10").await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_bad_sql_is_an_error() {
        let err = store().query_rows("SELECT missing FROM t").await.unwrap_err();
        assert!(format!("{:#}", err).contains("missing"));
    }

    #[tokio::test]
    async fn test_writing_statements_are_rejected() {
        let store = store();
        for sql in ["DELETE FROM t", "DROP TABLE t", "INSERT INTO t (a) VALUES (3)", "UPDATE t SET a = 0"] {
            let err = store.query_rows(sql).await.unwrap_err();
            assert!(format!("{:#}", err).contains("writes to the database"), "{}", sql);
        }
        assert!(store.query_first("DELETE FROM t").await.is_err());

        let row = store.query_first("SELECT COUNT(*) AS n, SUM(a) AS s FROM t").await.unwrap().unwrap();
        assert_eq!(row["n"], json!(2));
        assert_eq!(row["s"], json!(3));
    }

    #[tokio::test]
    async fn test_trailing_semicolon_is_accepted() {
        let rows = store().query_rows("SELECT a FROM t;").await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
