// Query planner - turns a request into a schema-only dashboard config
use crate::application::completion_service::{CompletionRequest, CompletionService};
use crate::domain::conversation::Message;
use crate::domain::dashboard::{strip_markdown_fences, ChartType, DashboardConfig, Provenance};
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::infrastructure::config::render_template;
use std::collections::HashMap;
use std::sync::Arc;

pub const REQUESTED_KPIS: usize = 4;

const SYSTEM_TEMPLATE: &str = r#"You are an expert Data Analyst, SQL developer and dashboard designer.
Your goal is to answer the user's question with a dashboard configuration that is filled by querying a SQLite database.

Database Schema:
${schema}

Output a single JSON object with this shape:
{
  "charts": [
    {
      "type": one of ${chart_types},
      "title": "short title",
      "sql": "SELECT ... (SQLite)",
      "xAxisKey": "column for the category/x axis (Bar/Line/Area/Composed/Scatter)",
      "dataKey": "value column (Pie/RadialBar/Treemap/Funnel)",
      "nameKey": "label column (Pie/Radar/RadialBar/Treemap/Funnel)",
      "yAxisKey": "y column (Scatter)",
      "zAxisKey": "size column (Scatter, optional)",
      "series": [{ "dataKey": "column", "name": "label", "type": "line|bar|area (ComposedChart only)" }]
    }
  ],
  "kpis": [
    {
      "title": "short title",
      "sql": "SELECT ... returning exactly one row with one column",
      "prefix": "optional, e.g. $",
      "suffix": "optional",
      "format": "compact" | "currency" | "number",
      "color": "indigo" | "cyan" | "amber" | "rose" | "emerald"
    }
  ]
}

Rules:
1. Use at most ${max_charts} charts; pick the chart types that best answer the question.
2. Always return exactly ${kpis} KPIs.
3. Every chart and every KPI MUST have a "sql" field. Never embed literal data arrays or values.
4. Every key mapping must name a column returned by that chart's SQL.
5. When using UNION or UNION ALL, do NOT use ORDER BY inside the sub-queries.
6. Return ONLY raw JSON. No markdown, no backticks, no explanations."#;

#[derive(Clone)]
pub struct QueryPlanner {
    completion: Arc<dyn CompletionService>,
    schema: String,
    max_tokens: u32,
    max_charts: usize,
}

impl QueryPlanner {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        schema: String,
        max_tokens: u32,
        max_charts: usize,
    ) -> Self {
        Self {
            completion,
            schema,
            max_tokens,
            max_charts,
        }
    }

    fn system_prompt(&self) -> String {
        let chart_types = ChartType::ALL
            .iter()
            .map(|t| format!("\"{}\"", t.as_str()))
            .collect::<Vec<_>>()
            .join(" | ");

        let mut vars = HashMap::new();
        vars.insert("schema".to_string(), self.schema.clone());
        vars.insert("chart_types".to_string(), chart_types);
        vars.insert("max_charts".to_string(), self.max_charts.to_string());
        vars.insert("kpis".to_string(), REQUESTED_KPIS.to_string());
        render_template(SYSTEM_TEMPLATE, &vars)
    }

    pub async fn plan(&self, query: &str) -> DashboardResult<DashboardConfig> {
        let request = CompletionRequest {
            system: self.system_prompt(),
            messages: vec![Message::user(query)],
            max_tokens: self.max_tokens,
        };

        let completion = self.completion.complete(request).await.map_err(|e| {
            tracing::error!("Error in query planner: {:#}", e);
            DashboardError::PlanningFailed
        })?;

        let text = completion.first_text().unwrap_or_default();
        if text.trim().is_empty() {
            tracing::error!("Query planner returned an empty completion");
            return Err(DashboardError::PlanningFailed);
        }

        let body = strip_markdown_fences(text);
        let document: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            tracing::error!(output = %body, "Planner output is not valid JSON: {}", e);
            DashboardError::InvalidConfigFormat(e.to_string())
        })?;

        let (mut config, report) = DashboardConfig::from_untrusted(document, Provenance::Planner);
        if !report.is_clean() {
            tracing::warn!("Repaired planner output: {}", report.notes.join("; "));
        }

        if config.charts.len() > self.max_charts {
            tracing::warn!(
                "Planner returned {} charts, keeping the first {}",
                config.charts.len(),
                self.max_charts
            );
            config.charts.truncate(self.max_charts);
        }
        if config.kpis.len() != REQUESTED_KPIS {
            tracing::warn!("Planner returned {} KPIs instead of {}", config.kpis.len(), REQUESTED_KPIS);
        }
        for chart in config.charts.iter().filter(|c| c.source_sql().is_none()) {
            tracing::warn!("Planned chart {} has no SQL", chart.title);
        }
        for kpi in config.kpis.iter().filter(|k| k.source_sql().is_none()) {
            tracing::warn!("Planned KPI {} has no SQL", kpi.title);
        }

        tracing::info!(
            "Planned dashboard with {} charts and {} KPIs",
            config.charts.len(),
            config.kpis.len()
        );
        Ok(config)
    }
}
