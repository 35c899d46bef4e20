use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_SCHEMA: &str = r#"Tables:
- bookings (id, title, date, time, status, customer)
- calls (id, date, duration, "from", "to", type)
- costs (id, category, amount, date, description)"#;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub anthropic: AnthropicSettings,
    pub agents: AgentSettings,
    pub storage: StorageSettings,
    pub planner: PlannerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnthropicSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub api_version: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentSettings {
    pub classifier_max_tokens: u32,
    pub responder_max_tokens: u32,
    pub planner_max_tokens: u32,
    pub max_charts: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub database_path: String,
    pub current_config_path: String,
    pub dashboards_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlannerSettings {
    pub schema: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            classifier_max_tokens: 1024,
            responder_max_tokens: 1024,
            planner_max_tokens: 4096,
            max_charts: 3,
        }
    }
}

/// Defaults, then `config/app.*`, then `DASHBOARD__*` environment
/// variables. `ANTHROPIC_API_KEY` fills the key when nothing else does.
pub fn load_settings() -> anyhow::Result<AppSettings> {
    let agents = AgentSettings::default();
    let settings = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("anthropic.base_url", "https://api.anthropic.com")?
        .set_default("anthropic.model", "claude-opus-4-6")?
        .set_default("anthropic.api_version", "2023-06-01")?
        .set_default("agents.classifier_max_tokens", agents.classifier_max_tokens)?
        .set_default("agents.responder_max_tokens", agents.responder_max_tokens)?
        .set_default("agents.planner_max_tokens", agents.planner_max_tokens)?
        .set_default("agents.max_charts", agents.max_charts as u64)?
        .set_default("storage.database_path", "local.db")?
        .set_default("storage.current_config_path", "data/dashboardConfig.json")?
        .set_default("storage.dashboards_dir", "data/dashboards")?
        .set_default("planner.schema", DEFAULT_SCHEMA)?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let mut settings: AppSettings = settings.try_deserialize()?;
    if settings.anthropic.api_key.is_empty() {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            settings.anthropic.api_key = key;
        }
    }
    if settings.anthropic.api_key.is_empty() {
        tracing::warn!("No Anthropic API key configured; completion calls will fail");
    }

    Ok(settings)
}

/// Replace `${name}` placeholders in a prompt template
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let mut vars = HashMap::new();
        vars.insert("schema".to_string(), "- costs (id, amount)".to_string());
        vars.insert("max_charts".to_string(), "3".to_string());

        let template = "Schema:\n${schema}\nUse at most ${max_charts} charts. Keep ${unknown}.";
        let result = render_template(template, &vars);

        assert_eq!(result, "Schema:\n- costs (id, amount)\nUse at most 3 charts. Keep ${unknown}.");
    }

    #[test]
    fn test_default_schema_lists_seed_tables() {
        for table in ["bookings", "calls", "costs"] {
            assert!(DEFAULT_SCHEMA.contains(table));
        }
    }
}
