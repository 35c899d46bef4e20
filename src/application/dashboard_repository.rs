// Repository traits for dashboard persistence
use crate::domain::dashboard::DashboardConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDashboard {
    pub id: String,
    pub name: String,
    pub config: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single "current" dashboard the chat pipeline produces and the
/// filter endpoint reads back.
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn load_current(&self) -> anyhow::Result<Option<DashboardConfig>>;

    async fn save_current(&self, config: &DashboardConfig) -> anyhow::Result<()>;
}

/// Named dashboard snapshots keyed by a generated id. No update operation.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Store a snapshot and return its new id.
    async fn save(&self, name: &str, config: &DashboardConfig) -> anyhow::Result<String>;

    /// Summaries, most recently updated first.
    async fn list(&self) -> anyhow::Result<Vec<DashboardSummary>>;

    async fn get(&self, id: &str) -> anyhow::Result<Option<PersistedDashboard>>;

    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
}
