// File-backed dashboard persistence
use crate::application::dashboard_repository::{
    ConfigRepository, DashboardRepository, DashboardSummary, PersistedDashboard,
};
use crate::domain::dashboard::{DashboardConfig, Provenance};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Keeps the current dashboard in one JSON file and each named dashboard
/// in `<dashboards_dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileDashboardStore {
    current_path: PathBuf,
    dashboards_dir: PathBuf,
}

impl FileDashboardStore {
    pub fn new(current_path: impl Into<PathBuf>, dashboards_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_path: current_path.into(),
            dashboards_dir: dashboards_dir.into(),
        }
    }

    fn dashboard_path(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dashboards_dir.join(format!("{}.json", id)))
    }
}

/// Write to a sibling temp file, then rename over the target so readers
/// never see a partial document. Concurrent writers: last rename wins.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Persistence path has no file name")?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

async fn read_json(path: &Path) -> Result<Option<Value>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn stored_config(document: Value) -> DashboardConfig {
    let (config, report) = DashboardConfig::from_untrusted(document, Provenance::Stored);
    for note in &report.notes {
        tracing::warn!("Repaired stored dashboard: {}", note);
    }
    config
}

#[async_trait]
impl ConfigRepository for FileDashboardStore {
    async fn load_current(&self) -> Result<Option<DashboardConfig>> {
        Ok(read_json(&self.current_path).await?.map(stored_config))
    }

    async fn save_current(&self, config: &DashboardConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(config)?;
        write_atomic(&self.current_path, &bytes).await?;
        tracing::debug!("Saved current dashboard to {}", self.current_path.display());
        Ok(())
    }
}

#[async_trait]
impl DashboardRepository for FileDashboardStore {
    async fn save(&self, name: &str, config: &DashboardConfig) -> Result<String> {
        let id = format!("dashboard-{}", Uuid::new_v4().simple());
        let path = self
            .dashboard_path(&id)
            .context("Generated dashboard id is not a valid file name")?;

        let snapshot = PersistedDashboard {
            id: id.clone(),
            name: name.to_string(),
            config: config.clone(),
        };
        write_atomic(&path, &serde_json::to_vec_pretty(&snapshot)?).await?;
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<DashboardSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.dashboards_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to list {}", self.dashboards_dir.display())
                });
            }
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            if id.starts_with('.') {
                continue;
            }

            match summarize(&path, id).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::error!("Error reading dashboard file {}: {:#}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn get(&self, id: &str) -> Result<Option<PersistedDashboard>> {
        let Some(path) = self.dashboard_path(id) else {
            return Ok(None);
        };
        let Some(mut document) = read_json(&path).await? else {
            return Ok(None);
        };

        let name = document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unnamed Dashboard")
            .to_string();
        let config = stored_config(document.get_mut("config").map(Value::take).unwrap_or(Value::Null));

        Ok(Some(PersistedDashboard {
            id: id.to_string(),
            name,
            config,
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let Some(path) = self.dashboard_path(id) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}

async fn summarize(path: &Path, id: String) -> Result<DashboardSummary> {
    let metadata = tokio::fs::metadata(path).await?;
    let document = read_json(path).await?.context("Dashboard file disappeared")?;

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unnamed Dashboard")
        .to_string();
    let updated_at: DateTime<Utc> = metadata.modified()?.into();
    let created_at: DateTime<Utc> = metadata.created().map(Into::into).unwrap_or(updated_at);

    Ok(DashboardSummary {
        id,
        name,
        created_at,
        updated_at,
    })
}
