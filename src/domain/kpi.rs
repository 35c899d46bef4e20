// KPI domain model and display formatting
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Value placed on a KPI whose query failed.
pub const KPI_ERROR_VALUE: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiFormat {
    Compact,
    Currency,
    Number,
}

impl KpiFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "compact" => Some(KpiFormat::Compact),
            "currency" => Some(KpiFormat::Currency),
            "number" => Some(KpiFormat::Number),
            _ => None,
        }
    }
}

/// A materialized KPI value. Numeric on success, the `"Error"` sentinel
/// (or any text the query returned) otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Number(Number),
    Text(String),
}

impl KpiValue {
    pub fn zero() -> Self {
        KpiValue::Number(Number::from(0))
    }

    pub fn error() -> Self {
        KpiValue::Text(KPI_ERROR_VALUE.to_string())
    }

    /// Convert the first cell of a result row. NULL counts as zero, so an
    /// aggregate over no rows still renders.
    pub fn from_cell(cell: &Value) -> Self {
        match cell {
            Value::Number(n) => KpiValue::Number(n.clone()),
            Value::String(s) => KpiValue::Text(s.clone()),
            Value::Null => KpiValue::zero(),
            other => KpiValue::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSpec {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<KpiFormat>,
    /// Accent tag for the renderer: indigo, cyan, amber, rose or emerald.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<KpiValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KpiSpec {
    #[cfg(test)]
    pub fn new(title: impl Into<String>, sql: Option<String>) -> Self {
        Self {
            title: title.into(),
            sql,
            prefix: None,
            suffix: None,
            format: None,
            color: None,
            value: None,
            extra: Map::new(),
        }
    }

    pub fn source_sql(&self) -> Option<&str> {
        self.sql.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The value as a dashboard tile shows it: prefix, formatted value, suffix.
    pub fn display_value(&self) -> String {
        let body = match &self.value {
            Some(KpiValue::Number(n)) => match n.as_f64() {
                Some(v) => format_number(v, self.format),
                None => n.to_string(),
            },
            Some(KpiValue::Text(s)) => s.clone(),
            None => String::new(),
        };
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            body,
            self.suffix.as_deref().unwrap_or("")
        )
    }
}

fn format_number(value: f64, format: Option<KpiFormat>) -> String {
    match format {
        Some(KpiFormat::Currency) => group_thousands(&format!("{:.0}", value)),
        Some(KpiFormat::Compact) => {
            if value >= 1_000_000.0 {
                format!("{:.1}M", value / 1_000_000.0)
            } else if value >= 1_000.0 {
                format!("{:.1}K", value / 1_000.0)
            } else {
                value.to_string()
            }
        }
        Some(KpiFormat::Number) | None => {
            let fixed = format!("{:.3}", value);
            let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
            group_thousands(trimmed)
        }
    }
}

/// Insert `,` separators into the integer part of a plain decimal string.
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kpi(value: Value, format: Option<KpiFormat>) -> KpiSpec {
        let mut spec = KpiSpec::new("Revenue", None);
        spec.value = Some(serde_json::from_value(value).unwrap());
        spec.format = format;
        spec
    }

    #[test]
    fn test_currency_format() {
        let mut spec = kpi(json!(1234567.89), Some(KpiFormat::Currency));
        spec.prefix = Some("$".to_string());
        assert_eq!(spec.display_value(), "$1,234,568");
    }

    #[test]
    fn test_compact_format() {
        assert_eq!(kpi(json!(2500000), Some(KpiFormat::Compact)).display_value(), "2.5M");
        assert_eq!(kpi(json!(1530), Some(KpiFormat::Compact)).display_value(), "1.5K");
        assert_eq!(kpi(json!(999), Some(KpiFormat::Compact)).display_value(), "999");
    }

    #[test]
    fn test_number_format() {
        let mut spec = kpi(json!(12345.5), None);
        spec.suffix = Some(" min".to_string());
        assert_eq!(spec.display_value(), "12,345.5 min");
        assert_eq!(kpi(json!(-1000), Some(KpiFormat::Number)).display_value(), "-1,000");
        assert_eq!(kpi(json!(0.1234), None).display_value(), "0.123");
    }

    #[test]
    fn test_error_sentinel_passes_through() {
        let mut spec = KpiSpec::new("Calls", None);
        spec.value = Some(KpiValue::error());
        spec.format = Some(KpiFormat::Currency);
        spec.prefix = Some("$".to_string());
        assert_eq!(spec.display_value(), "$Error");
    }

    #[test]
    fn test_value_from_cell() {
        assert_eq!(KpiValue::from_cell(&json!(7)), KpiValue::Number(Number::from(7)));
        assert_eq!(KpiValue::from_cell(&Value::Null), KpiValue::zero());
        assert_eq!(KpiValue::from_cell(&json!("n/a")), KpiValue::Text("n/a".to_string()));
    }

    #[test]
    fn test_value_serializes_untagged() {
        assert_eq!(serde_json::to_value(KpiValue::zero()).unwrap(), json!(0));
        assert_eq!(serde_json::to_value(KpiValue::error()).unwrap(), json!("Error"));
    }
}
