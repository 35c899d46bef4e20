// HTTP response utilities for JSON error bodies
use crate::domain::errors::DashboardError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// A pipeline error on its way out of a handler as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl From<DashboardError> for ApiError {
    fn from(value: DashboardError) -> Self {
        Self(value)
    }
}

/// Malformed or mistyped JSON bodies get the same `{"error"}` shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DashboardError::InvalidRequest(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DashboardError::InvalidConfigFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::PlanningFailed => StatusCode::BAD_GATEWAY,
            DashboardError::ConfigNotFound | DashboardError::DashboardNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DashboardError::MissingFilter | DashboardError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            // Parser details stay in the logs.
            DashboardError::InvalidConfigFormat(_) => {
                "Could not generate dashboard configuration".to_string()
            }
            DashboardError::Storage(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
