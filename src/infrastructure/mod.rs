// Infrastructure layer - External dependencies and adapters
pub mod anthropic_client;
pub mod config;
pub mod file_dashboard_store;
pub mod http_response;
pub mod sqlite_store;
