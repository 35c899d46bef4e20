// Error kinds surfaced by the dashboard pipeline
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to plan a dashboard for this request")]
    PlanningFailed,

    #[error("Could not generate dashboard configuration: {0}")]
    InvalidConfigFormat(String),

    #[error("Dashboard config not found. Please ask the AI to generate a dashboard first.")]
    ConfigNotFound,

    #[error("filterContext is required")]
    MissingFilter,

    #[error("Dashboard not found: {0}")]
    DashboardNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for DashboardError {
    fn from(value: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", value))
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
