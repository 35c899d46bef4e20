// Data store trait - read access to the relational store
use crate::domain::dashboard::Row;
use async_trait::async_trait;

#[async_trait]
pub trait DataStore: Send + Sync {
    /// Run a read statement and return every row.
    async fn query_rows(&self, sql: &str) -> anyhow::Result<Vec<Row>>;

    /// Run a read statement and return its first row, if any.
    async fn query_first(&self, sql: &str) -> anyhow::Result<Option<Row>>;
}
