// HTTP request handlers
use crate::application::chat_service::ChatReply;
use crate::application::dashboard_repository::{DashboardSummary, PersistedDashboard};
use crate::domain::conversation::Message;
use crate::domain::dashboard::{DashboardConfig, Provenance};
use crate::domain::errors::DashboardError;
use crate::infrastructure::http_response::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub filter_context: String,
}

#[derive(Deserialize)]
pub struct SaveDashboardRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Serialize)]
pub struct SaveDashboardResponse {
    pub success: bool,
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct DeleteDashboardResponse {
    pub success: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Classify the conversation and either build a dashboard or reply in text
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = body?;
    let reply = state.chat_service.handle(&request.messages).await?;
    Ok(Json(reply))
}

/// The current dashboard, empty until one has been generated
pub async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardConfig>, ApiError> {
    Ok(Json(state.current_dashboard_service.current().await?))
}

/// Re-run the current dashboard with an extra predicate
pub async fn filter_config(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FilterRequest>, JsonRejection>,
) -> Result<Json<DashboardConfig>, ApiError> {
    let Json(request) = body?;
    let config = state
        .current_dashboard_service
        .apply_filter(&request.filter_context)
        .await?;
    Ok(Json(config))
}

pub async fn list_dashboards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DashboardSummary>>, ApiError> {
    Ok(Json(state.saved_dashboard_service.list().await?))
}

pub async fn save_dashboard(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SaveDashboardRequest>, JsonRejection>,
) -> Result<Json<SaveDashboardResponse>, ApiError> {
    let Json(request) = body?;
    let document = request.config.ok_or_else(|| {
        DashboardError::InvalidRequest("Name and config are required".to_string())
    })?;
    let (config, report) = DashboardConfig::from_untrusted(document, Provenance::Stored);
    for note in &report.notes {
        tracing::warn!("Repaired dashboard before saving: {}", note);
    }

    let id = state.saved_dashboard_service.save(&request.name, &config).await?;
    Ok(Json(SaveDashboardResponse {
        success: true,
        id,
        name: request.name.trim().to_string(),
    }))
}

pub async fn get_dashboard(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PersistedDashboard>, ApiError> {
    Ok(Json(state.saved_dashboard_service.get(&id).await?))
}

pub async fn delete_dashboard(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteDashboardResponse>, ApiError> {
    state.saved_dashboard_service.delete(&id).await?;
    Ok(Json(DeleteDashboardResponse { success: true }))
}
