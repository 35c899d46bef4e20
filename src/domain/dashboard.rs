// Dashboard configuration domain model
use super::kpi::{KpiFormat, KpiSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row. Column order follows the SELECT list; the shape is
/// whatever the generated SQL produced.
pub type Row = Map<String, Value>;

/// Inline error placed on a chart whose query failed.
pub const CHART_QUERY_ERROR: &str = "Error executing chart data query";
/// Inline error placed on a chart whose filtered query failed.
pub const FILTERED_CHART_QUERY_ERROR: &str = "Error executing filtered chart query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    BarChart,
    LineChart,
    PieChart,
    AreaChart,
    RadarChart,
    ComposedChart,
    ScatterChart,
    RadialBarChart,
    Treemap,
    FunnelChart,
}

impl ChartType {
    pub const ALL: [ChartType; 10] = [
        ChartType::BarChart,
        ChartType::LineChart,
        ChartType::PieChart,
        ChartType::AreaChart,
        ChartType::RadarChart,
        ChartType::ComposedChart,
        ChartType::ScatterChart,
        ChartType::RadialBarChart,
        ChartType::Treemap,
        ChartType::FunnelChart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::BarChart => "BarChart",
            ChartType::LineChart => "LineChart",
            ChartType::PieChart => "PieChart",
            ChartType::AreaChart => "AreaChart",
            ChartType::RadarChart => "RadarChart",
            ChartType::ComposedChart => "ComposedChart",
            ChartType::ScatterChart => "ScatterChart",
            ChartType::RadialBarChart => "RadialBarChart",
            ChartType::Treemap => "Treemap",
            ChartType::FunnelChart => "FunnelChart",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub data_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sub-type for composed charts: line, bar or area.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_axis_key: Option<String>,
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Fields this service does not interpret, kept for the renderer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartSpec {
    #[cfg(test)]
    pub fn new(chart_type: ChartType, title: impl Into<String>, sql: Option<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            sql,
            x_axis_key: None,
            data_key: None,
            name_key: None,
            y_axis_key: None,
            z_axis_key: None,
            series: Vec::new(),
            data: None,
            error: None,
            extra: Map::new(),
        }
    }

    /// The source query, ignoring blank strings.
    pub fn source_sql(&self) -> Option<&str> {
        self.sql.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
    #[serde(default)]
    pub kpis: Vec<KpiSpec>,
}

/// Which fields to trust when normalizing an untrusted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Fresh language model output: results are recomputed, so any
    /// literal `data`, `value` or `error` is discarded.
    Planner,
    /// A document this service materialized earlier.
    Stored,
}

/// What normalization had to change to make a document usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub notes: Vec<String>,
}

impl RepairReport {
    fn note(&mut self, note: String) {
        self.notes.push(note);
    }

    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

impl DashboardConfig {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a config from a parsed JSON document of unknown quality.
    /// Non-array `charts`/`kpis` become empty lists; entries that cannot
    /// be repaired are dropped and recorded in the report.
    pub fn from_untrusted(document: Value, provenance: Provenance) -> (Self, RepairReport) {
        let mut report = RepairReport::default();
        let mut root = match document {
            Value::Object(map) => map,
            other => {
                report.note(format!("document is {} rather than an object", json_kind(&other)));
                Map::new()
            }
        };

        let charts = take_array(&mut root, "charts", &mut report)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| repair_chart(idx, entry, provenance, &mut report))
            .collect();

        let kpis = take_array(&mut root, "kpis", &mut report)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| repair_kpi(idx, entry, provenance, &mut report))
            .collect();

        (Self { charts, kpis }, report)
    }
}

fn take_array(root: &mut Map<String, Value>, key: &str, report: &mut RepairReport) -> Vec<Value> {
    match root.remove(key) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            report.note(format!("`{}` was {}, replaced with []", key, json_kind(&other)));
            Vec::new()
        }
    }
}

fn repair_chart(
    idx: usize,
    entry: Value,
    provenance: Provenance,
    report: &mut RepairReport,
) -> Option<ChartSpec> {
    let Value::Object(mut chart) = entry else {
        report.note(format!("chart {} is not an object, dropped", idx));
        return None;
    };

    match chart.get("type").and_then(Value::as_str) {
        Some(raw) if ChartType::parse(raw).is_some() => {}
        Some(raw) => {
            report.note(format!("chart {} has unknown type `{}`, dropped", idx, raw));
            return None;
        }
        None => {
            report.note(format!("chart {} has no type, dropped", idx));
            return None;
        }
    }

    if !chart.get("title").is_some_and(Value::is_string) {
        report.note(format!("chart {} has no title", idx));
        chart.insert("title".to_string(), Value::from("Untitled chart"));
    }

    let series = match chart.remove("series") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(|s| s.get("dataKey").is_some_and(Value::is_string))
            .collect(),
        _ => {
            report.note(format!("chart {} has no series list", idx));
            Vec::new()
        }
    };
    chart.insert("series".to_string(), Value::Array(series));

    match provenance {
        Provenance::Planner => {
            if chart.remove("data").is_some() {
                report.note(format!("chart {} carried literal data, discarded", idx));
            }
            chart.remove("error");
        }
        Provenance::Stored => {
            if chart.get("data").is_some_and(|d| !d.is_array()) {
                chart.insert("data".to_string(), Value::Array(Vec::new()));
            }
        }
    }

    match serde_json::from_value::<ChartSpec>(Value::Object(chart)) {
        Ok(spec) => Some(spec),
        Err(e) => {
            report.note(format!("chart {} is malformed ({}), dropped", idx, e));
            None
        }
    }
}

fn repair_kpi(
    idx: usize,
    entry: Value,
    provenance: Provenance,
    report: &mut RepairReport,
) -> Option<KpiSpec> {
    let Value::Object(mut kpi) = entry else {
        report.note(format!("kpi {} is not an object, dropped", idx));
        return None;
    };

    if !kpi.get("title").is_some_and(Value::is_string) {
        report.note(format!("kpi {} has no title", idx));
        kpi.insert("title".to_string(), Value::from("Untitled KPI"));
    }

    if let Some(format) = kpi.get("format") {
        let known = format.as_str().is_some_and(|f| KpiFormat::parse(f).is_some());
        if !known {
            report.note(format!("kpi {} has unknown format {}, removed", idx, format));
            kpi.remove("format");
        }
    }

    match provenance {
        Provenance::Planner => {
            if kpi.remove("value").is_some() {
                report.note(format!("kpi {} carried a literal value, discarded", idx));
            }
        }
        Provenance::Stored => {
            if kpi.get("value").is_some_and(|v| !(v.is_number() || v.is_string())) {
                kpi.remove("value");
            }
        }
    }

    match serde_json::from_value::<KpiSpec>(Value::Object(kpi)) {
        Ok(spec) => Some(spec),
        Err(e) => {
            report.note(format!("kpi {} is malformed ({}), dropped", idx, e));
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Remove leading and trailing markdown code fences from model output.
pub fn strip_markdown_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(end) if rest[..end].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                &rest[end + 1..]
            }
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    let trimmed = body.trim_end();
    if let Some(rest) = trimmed.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}
