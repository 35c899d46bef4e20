// Config executor - fills a dashboard config with live query results
use crate::application::data_store::DataStore;
use crate::domain::dashboard::{
    ChartSpec, DashboardConfig, CHART_QUERY_ERROR, FILTERED_CHART_QUERY_ERROR,
};
use crate::domain::kpi::{KpiSpec, KpiValue};
use crate::domain::sql_filter::apply_filter;
use std::sync::Arc;

/// How a config is being executed.
#[derive(Debug, Clone, Copy)]
enum Pass<'a> {
    /// First materialization of a freshly planned config.
    Initial,
    /// Re-execution of a materialized config with a predicate spliced into
    /// every stored statement.
    Filtered(&'a str),
}

impl Pass<'_> {
    fn statement(&self, sql: &str) -> String {
        match self {
            Pass::Initial => sql.to_string(),
            Pass::Filtered(filter) => apply_filter(sql, filter),
        }
    }

    fn chart_error(&self) -> &'static str {
        match self {
            Pass::Initial => CHART_QUERY_ERROR,
            Pass::Filtered(_) => FILTERED_CHART_QUERY_ERROR,
        }
    }
}

/// Runs every chart and KPI statement in document order, one at a time.
/// A failing statement only affects its own item. The `sql` fields are
/// never modified, so later filters always start from the stored query.
#[derive(Clone)]
pub struct ConfigExecutor {
    store: Arc<dyn DataStore>,
}

impl ConfigExecutor {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn materialize(&self, config: DashboardConfig) -> DashboardConfig {
        self.execute(config, Pass::Initial).await
    }

    pub async fn materialize_filtered(&self, config: DashboardConfig, filter: &str) -> DashboardConfig {
        self.execute(config, Pass::Filtered(filter)).await
    }

    async fn execute(&self, mut config: DashboardConfig, pass: Pass<'_>) -> DashboardConfig {
        for chart in config.charts.iter_mut() {
            self.execute_chart(chart, pass).await;
        }
        for kpi in config.kpis.iter_mut() {
            self.execute_kpi(kpi, pass).await;
        }
        config
    }

    async fn execute_chart(&self, chart: &mut ChartSpec, pass: Pass<'_>) {
        let Some(sql) = chart.source_sql() else {
            match pass {
                Pass::Initial => chart.data = Some(Vec::new()),
                Pass::Filtered(_) => {
                    tracing::warn!("Chart {} has no stored SQL, filter not applied", chart.title);
                    chart.data.get_or_insert_with(Vec::new);
                }
            }
            return;
        };

        let statement = pass.statement(sql);
        if let Pass::Filtered(_) = pass {
            tracing::debug!(original = %sql, rewritten = %statement, "Filtering chart {}", chart.title);
        }

        match self.store.query_rows(&statement).await {
            Ok(rows) => {
                tracing::debug!("Chart {} returned {} rows", chart.title, rows.len());
                chart.data = Some(rows);
                chart.error = None;
            }
            Err(e) => {
                tracing::error!(sql = %statement, "Error executing SQL for chart {}: {:#}", chart.title, e);
                chart.data = Some(Vec::new());
                chart.error = Some(pass.chart_error().to_string());
            }
        }
    }

    async fn execute_kpi(&self, kpi: &mut KpiSpec, pass: Pass<'_>) {
        let Some(sql) = kpi.source_sql() else {
            if let Pass::Initial = pass {
                kpi.value = Some(KpiValue::zero());
            }
            return;
        };

        let statement = pass.statement(sql);
        if let Pass::Filtered(_) = pass {
            tracing::debug!(original = %sql, rewritten = %statement, "Filtering KPI {}", kpi.title);
        }

        let value = match self.store.query_first(&statement).await {
            Ok(Some(row)) => row.values().next().map(KpiValue::from_cell).unwrap_or_else(KpiValue::zero),
            Ok(None) => KpiValue::zero(),
            Err(e) => {
                tracing::error!(sql = %statement, "Error executing SQL for KPI {}: {:#}", kpi.title, e);
                KpiValue::error()
            }
        };
        kpi.value = Some(value);
    }
}
