// Domain layer - Pure types and rules, no I/O
pub mod conversation;
pub mod dashboard;
pub mod errors;
pub mod kpi;
pub mod routing;
pub mod sql_filter;
