use reachboard_core::{CsvDirectory, DashboardOptions, ReachboardConfig, TableSource};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ReachboardConfig>,
    pub source: Arc<dyn TableSource + Send + Sync>,
}

impl AppState {
    /// Reads tables from the configured data directory.
    pub fn new(config: Arc<ReachboardConfig>) -> Self {
        let source = Arc::new(CsvDirectory::new(config.data.data_dir.clone()));
        Self::with_source(config, source)
    }

    pub fn with_source(
        config: Arc<ReachboardConfig>,
        source: Arc<dyn TableSource + Send + Sync>,
    ) -> Self {
        Self { config, source }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions::from(&self.config.data)
    }
}
