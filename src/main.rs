// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::chat_service::ChatService;
use crate::application::config_executor::ConfigExecutor;
use crate::application::current_dashboard_service::CurrentDashboardService;
use crate::application::intent_classifier::IntentClassifier;
use crate::application::query_planner::QueryPlanner;
use crate::application::responder::Responder;
use crate::application::saved_dashboard_service::SavedDashboardService;
use crate::infrastructure::anthropic_client::AnthropicClient;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::file_dashboard_store::FileDashboardStore;
use crate::infrastructure::sqlite_store::SqliteStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    chat, delete_dashboard, filter_config, get_config, get_dashboard, health_check,
    list_dashboards, save_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create adapters (infrastructure layer)
    let completion = Arc::new(AnthropicClient::new(&settings.anthropic));
    let store = Arc::new(SqliteStore::open(&settings.storage.database_path)?);
    let files = Arc::new(FileDashboardStore::new(
        &settings.storage.current_config_path,
        &settings.storage.dashboards_dir,
    ));

    // Create services (application layer)
    let agents = &settings.agents;
    let executor = ConfigExecutor::new(store);
    let chat_service = ChatService::new(
        IntentClassifier::new(completion.clone(), agents.classifier_max_tokens),
        Responder::new(completion.clone(), agents.responder_max_tokens),
        QueryPlanner::new(
            completion,
            settings.planner.schema.clone(),
            agents.planner_max_tokens,
            agents.max_charts,
        ),
        executor.clone(),
        files.clone(),
    );
    let current_dashboard_service = CurrentDashboardService::new(files.clone(), executor);
    let saved_dashboard_service = SavedDashboardService::new(files);

    // Create application state
    let state = Arc::new(AppState {
        chat_service,
        current_dashboard_service,
        saved_dashboard_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/config", get(get_config))
        .route("/api/config/filter", post(filter_config))
        .route("/api/dashboards", get(list_dashboards).post(save_dashboard))
        .route("/api/dashboards/:id", get(get_dashboard).delete(delete_dashboard))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.bind_addr.parse()?;
    tracing::info!("Starting chat-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
