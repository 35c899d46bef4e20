// Saved dashboard service - named dashboard snapshots
use crate::application::dashboard_repository::{DashboardRepository, DashboardSummary, PersistedDashboard};
use crate::domain::dashboard::DashboardConfig;
use crate::domain::errors::{DashboardError, DashboardResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct SavedDashboardService {
    repository: Arc<dyn DashboardRepository>,
}

impl SavedDashboardService {
    pub fn new(repository: Arc<dyn DashboardRepository>) -> Self {
        Self { repository }
    }

    pub async fn save(&self, name: &str, config: &DashboardConfig) -> DashboardResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidRequest("Name and config are required".to_string()));
        }
        let id = self.repository.save(name, config).await?;
        tracing::info!(id = %id, "Saved dashboard {}", name);
        Ok(id)
    }

    pub async fn list(&self) -> DashboardResult<Vec<DashboardSummary>> {
        Ok(self.repository.list().await?)
    }

    pub async fn get(&self, id: &str) -> DashboardResult<PersistedDashboard> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DashboardError::DashboardNotFound(id.to_string()))
    }

    pub async fn delete(&self, id: &str) -> DashboardResult<()> {
        self.repository.delete(id).await?;
        Ok(())
    }
}
