// Chat service - classify, route, then plan a dashboard or reply in text
use crate::application::config_executor::ConfigExecutor;
use crate::application::dashboard_repository::ConfigRepository;
use crate::application::intent_classifier::IntentClassifier;
use crate::application::query_planner::QueryPlanner;
use crate::application::responder::Responder;
use crate::domain::conversation::{latest_user_message, Message, Role};
use crate::domain::dashboard::DashboardConfig;
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::routing::{route_for, Route};
use serde::Serialize;
use std::sync::Arc;

pub const DASHBOARD_READY: &str = "Your dashboard is ready!";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub role: Role,
    pub content: String,
    pub action: String,
    pub dataviz: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<DashboardConfig>,
}

#[derive(Clone)]
pub struct ChatService {
    classifier: IntentClassifier,
    responder: Responder,
    planner: QueryPlanner,
    executor: ConfigExecutor,
    configs: Arc<dyn ConfigRepository>,
}

impl ChatService {
    pub fn new(
        classifier: IntentClassifier,
        responder: Responder,
        planner: QueryPlanner,
        executor: ConfigExecutor,
        configs: Arc<dyn ConfigRepository>,
    ) -> Self {
        Self {
            classifier,
            responder,
            planner,
            executor,
            configs,
        }
    }

    /// One request, run sequentially to completion.
    pub async fn handle(&self, messages: &[Message]) -> DashboardResult<ChatReply> {
        if messages.is_empty() {
            return Err(DashboardError::InvalidRequest("Invalid messages format".to_string()));
        }

        let action = self.classifier.classify(messages).await;

        match route_for(&action) {
            Route::DataAnalysis => {
                let query = latest_user_message(messages).ok_or_else(|| {
                    DashboardError::InvalidRequest("No user message to analyze".to_string())
                })?;
                let dashboard = self.build_dashboard(query).await?;
                Ok(ChatReply {
                    role: Role::Assistant,
                    content: ready_message(&dashboard),
                    action,
                    dataviz: true,
                    dashboard: Some(dashboard),
                })
            }
            Route::Conversation => {
                let content = self.responder.respond(messages, &action).await;
                Ok(ChatReply {
                    role: Role::Assistant,
                    content,
                    action,
                    dataviz: false,
                    dashboard: None,
                })
            }
        }
    }

    async fn build_dashboard(&self, query: &str) -> DashboardResult<DashboardConfig> {
        let planned = self.planner.plan(query).await?;
        let dashboard = self.executor.materialize(planned).await;

        if let Err(e) = self.configs.save_current(&dashboard).await {
            tracing::error!("Failed to persist current dashboard: {:#}", e);
        }
        Ok(dashboard)
    }
}

/// Chat bubble text for a finished dashboard, with the KPI headline numbers.
fn ready_message(dashboard: &DashboardConfig) -> String {
    if dashboard.kpis.is_empty() {
        return DASHBOARD_READY.to_string();
    }
    let headline = dashboard
        .kpis
        .iter()
        .map(|kpi| format!("{}: {}", kpi.title, kpi.display_value()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {}", DASHBOARD_READY, headline)
}
