// Application layer - Use cases and the traits at external boundaries
pub mod chat_service;
pub mod completion_service;
pub mod config_executor;
pub mod current_dashboard_service;
pub mod dashboard_repository;
pub mod data_store;
pub mod intent_classifier;
pub mod query_planner;
pub mod responder;
pub mod saved_dashboard_service;

#[cfg(test)]
pub mod testing;
