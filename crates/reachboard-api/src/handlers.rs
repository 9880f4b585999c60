use crate::{page, ApiError, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use reachboard_core::{build_dashboard, components, Dashboard, MetricName};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Optional `?metrics=likes,comments` override of the configured tab list.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub metrics: Option<String>,
}

impl DashboardQuery {
    pub fn resolve(&self, configured: &[MetricName]) -> ApiResult<Vec<MetricName>> {
        let Some(raw) = self.metrics.as_deref() else {
            return Ok(configured.to_vec());
        };
        let metrics = raw
            .split(',')
            .filter(|m| !m.trim().is_empty())
            .map(str::parse::<MetricName>)
            .collect::<Result<Vec<MetricName>, _>>()?;
        if metrics.is_empty() {
            return Err(ApiError::BadRequest("no metrics requested".to_string()));
        }
        Ok(metrics)
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Rebuilds the dashboard from the input tables. Runs on the blocking pool
/// since loading and reshaping are synchronous file work.
async fn load_dashboard(state: &AppState, metrics: Vec<MetricName>) -> ApiResult<Dashboard> {
    let source = state.source.clone();
    let options = state.dashboard_options();
    let started = Instant::now();

    let dashboard =
        tokio::task::spawn_blocking(move || build_dashboard(source.as_ref(), &metrics, &options))
            .await
            .map_err(|e| ApiError::Internal(format!("dashboard task failed: {e}")))??;

    debug!(
        tabs = dashboard.tabs.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dashboard built"
    );
    Ok(dashboard)
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Html<String>> {
    let metrics = query.resolve(&state.config.data.metrics)?;
    let dashboard = load_dashboard(&state, metrics).await?;
    let parts = components(&dashboard)?;
    info!(tabs = dashboard.tabs.len(), "serving dashboard page");
    Ok(Html(page::render_page(&parts)))
}

pub async fn dashboard_json(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<Dashboard>> {
    let metrics = query.resolve(&state.config.data.metrics)?;
    load_dashboard(&state, metrics).await.map(Json)
}
