// Current dashboard service - read back and locally filter the last dashboard
use crate::application::config_executor::ConfigExecutor;
use crate::application::dashboard_repository::ConfigRepository;
use crate::domain::dashboard::DashboardConfig;
use crate::domain::errors::{DashboardError, DashboardResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct CurrentDashboardService {
    configs: Arc<dyn ConfigRepository>,
    executor: ConfigExecutor,
}

impl CurrentDashboardService {
    pub fn new(configs: Arc<dyn ConfigRepository>, executor: ConfigExecutor) -> Self {
        Self { configs, executor }
    }

    /// The last materialized dashboard, or an empty one before any exists.
    pub async fn current(&self) -> DashboardResult<DashboardConfig> {
        Ok(self
            .configs
            .load_current()
            .await?
            .unwrap_or_else(DashboardConfig::empty))
    }

    /// Re-run the current dashboard with `filter_context` spliced into every
    /// stored statement. The result is returned, not saved, so the next
    /// filter starts again from the original queries.
    pub async fn apply_filter(&self, filter_context: &str) -> DashboardResult<DashboardConfig> {
        if filter_context.trim().is_empty() {
            return Err(DashboardError::MissingFilter);
        }

        let config = self
            .configs
            .load_current()
            .await?
            .ok_or(DashboardError::ConfigNotFound)?;

        tracing::info!(filter = %filter_context, "Applying local filter");
        Ok(self.executor.materialize_filtered(config, filter_context).await)
    }
}
