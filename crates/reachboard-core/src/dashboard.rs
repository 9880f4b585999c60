use crate::{
    assemble_chart, build_day_frames, build_user_series, load_metric, ChartPair, DataConfig,
    MetricName, Result, TableSource, FOLLOWERS_SCALE,
};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub followers_scale: f64,
    pub default_user: Option<String>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            followers_scale: FOLLOWERS_SCALE,
            default_user: None,
        }
    }
}

impl From<&DataConfig> for DashboardOptions {
    fn from(config: &DataConfig) -> Self {
        Self {
            followers_scale: config.followers_scale,
            default_user: config.default_user.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub title: String,
    pub chart: ChartPair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub tabs: Vec<Tab>,
}

impl Dashboard {
    pub fn tab(&self, metric: MetricName) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.chart.metric == metric)
    }
}

/// Load, reshape and assemble the chart pair for a single metric.
#[instrument(skip_all, fields(metric = %metric))]
pub fn build_metric_chart<S: TableSource + ?Sized>(
    source: &S,
    metric: MetricName,
    options: &DashboardOptions,
) -> Result<ChartPair> {
    let data = load_metric(source, metric)?;
    let frames = build_day_frames(&data, options.followers_scale)?;
    let series = build_user_series(&data.engagement, &data.days)?;
    Ok(assemble_chart(
        &data,
        frames,
        series,
        options.default_user.as_deref(),
    ))
}

/// One tab per metric, in the order given. The first failing metric
/// aborts the whole dashboard.
pub fn build_dashboard<S: TableSource + ?Sized>(
    source: &S,
    metrics: &[MetricName],
    options: &DashboardOptions,
) -> Result<Dashboard> {
    let tabs = metrics
        .iter()
        .map(|&metric| {
            build_metric_chart(source, metric, options).map(|chart| Tab {
                title: metric.title(),
                chart,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(tabs = tabs.len(), "dashboard assembled");
    Ok(Dashboard { tabs })
}
