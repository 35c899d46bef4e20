// Local filter rewriting - splice a predicate into previously generated SQL
//
// The scan is textual, not a parse: a WHERE that only exists inside a
// subquery or CTE can be mistaken for the outer one, and keywords inside
// comments or string literals are matched like any other text. Statements
// come from our own planner and filters from a trusted single-user UI, so
// the semicolon strip below is not an injection guard.
use regex::Regex;
use std::sync::LazyLock;

static WHERE_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sWHERE\s").expect("valid WHERE pattern"));

static TRAILING_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:GROUP\s+BY|ORDER\s+BY|LIMIT)\s").expect("valid clause pattern")
});

/// Trim whitespace and trailing semicolons from a statement.
pub fn clean_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Remove every semicolon so the predicate cannot end the statement.
pub fn sanitize_filter(filter: &str) -> String {
    filter.replace(';', "")
}

/// Byte offset before which a predicate goes: the earliest GROUP BY,
/// ORDER BY or LIMIT, or the end of the statement.
pub fn injection_point(statement: &str) -> usize {
    TRAILING_CLAUSE
        .find(statement)
        .map(|m| m.start())
        .unwrap_or(statement.len())
}

/// Rewrite `sql` so it only returns rows matching `filter`.
///
/// An existing WHERE ahead of the injection point is extended with
/// `AND (filter)`; otherwise `WHERE (filter)` is inserted there.
pub fn apply_filter(sql: &str, filter: &str) -> String {
    let statement = clean_statement(sql);
    let predicate = sanitize_filter(filter);
    let injection = injection_point(statement);

    let has_outer_where = WHERE_CLAUSE
        .find(statement)
        .is_some_and(|m| m.start() < injection);
    let keyword = if has_outer_where { "AND" } else { "WHERE" };

    let (before, after) = statement.split_at(injection);
    format!("{} {} ({}){}", before, keyword, predicate, after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_without_where() {
        let sql = "SELECT status, COUNT(*) as c FROM bookings GROUP BY status";
        assert_eq!(
            apply_filter(sql, "status='confirmed'"),
            "SELECT status, COUNT(*) as c FROM bookings WHERE (status='confirmed') GROUP BY status"
        );
    }

    #[test]
    fn test_existing_where_at_end_gets_and() {
        let rewritten = apply_filter("SELECT * FROM costs WHERE amount > 100", "category = 'Software'");
        assert_eq!(rewritten, "SELECT * FROM costs WHERE amount > 100 AND (category = 'Software')");
        assert!(rewritten.ends_with("AND (category = 'Software')"));
    }

    #[test]
    fn test_no_where_no_trailing_clause_appends_where() {
        assert_eq!(
            apply_filter("SELECT COUNT(*) FROM calls;", "1=1"),
            "SELECT COUNT(*) FROM calls WHERE (1=1)"
        );
    }

    #[test]
    fn test_and_goes_before_group_by() {
        let rewritten = apply_filter(
            "SELECT category, SUM(amount) FROM costs WHERE amount > 0 GROUP BY category ORDER BY 2 DESC",
            "date >= date('now','-30 days')",
        );
        assert_eq!(
            rewritten,
            "SELECT category, SUM(amount) FROM costs WHERE amount > 0 AND (date >= date('now','-30 days')) GROUP BY category ORDER BY 2 DESC"
        );
        let and_at = rewritten.find("AND (").unwrap();
        let group_at = rewritten.find("GROUP BY").unwrap();
        assert!(and_at < group_at);
    }

    #[test]
    fn test_earliest_trailing_clause_wins() {
        assert_eq!(
            apply_filter("SELECT * FROM bookings ORDER BY date LIMIT 10", "status = 'confirmed'"),
            "SELECT * FROM bookings WHERE (status = 'confirmed') ORDER BY date LIMIT 10"
        );
        assert_eq!(
            apply_filter("SELECT * FROM bookings LIMIT 5", "1=1"),
            "SELECT * FROM bookings WHERE (1=1) LIMIT 5"
        );
    }

    #[test]
    fn test_keywords_match_case_insensitively() {
        assert_eq!(
            apply_filter("select type, count(*) from calls where duration > 60 group by type", "type = 'inbound'"),
            "select type, count(*) from calls where duration > 60 AND (type = 'inbound') group by type"
        );
    }

    #[test]
    fn test_multiline_statements_use_same_rewrite_points() {
        let sql = "SELECT status, COUNT(*) AS c\nFROM bookings\nWHERE date > '2024-01-01'\nGROUP BY status;";
        assert_eq!(
            apply_filter(sql, "status='confirmed'"),
            "SELECT status, COUNT(*) AS c\nFROM bookings\nWHERE date > '2024-01-01' AND (status='confirmed')\nGROUP BY status"
        );
    }

    #[test]
    fn test_where_after_injection_point_is_ignored() {
        let sql = "SELECT status FROM bookings GROUP BY status HAVING status IN (SELECT status FROM bookings WHERE customer = 'x')";
        assert_eq!(
            apply_filter(sql, "1=1"),
            "SELECT status FROM bookings WHERE (1=1) GROUP BY status HAVING status IN (SELECT status FROM bookings WHERE customer = 'x')"
        );
    }

    #[test]
    fn test_semicolons_are_stripped_from_filter() {
        assert_eq!(
            apply_filter("SELECT * FROM bookings", "1=1; DROP TABLE bookings"),
            "SELECT * FROM bookings WHERE (1=1 DROP TABLE bookings)"
        );
        assert_eq!(sanitize_filter(";;a;"), "a");
    }

    #[test]
    fn test_identifiers_containing_keywords_are_not_clauses() {
        let sql = "SELECT limit_value FROM quotas";
        assert_eq!(injection_point(sql), sql.len());
        assert_eq!(apply_filter(sql, "1=1"), "SELECT limit_value FROM quotas WHERE (1=1)");
    }

    #[test]
    fn test_clean_statement() {
        assert_eq!(clean_statement("  SELECT 1 ;  "), "SELECT 1");
        assert_eq!(clean_statement("SELECT 1;;"), "SELECT 1");
    }
}
