use reachboard_api::Server;
use reachboard_core::{ConfigManager, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "reachboard_api={level},reachboard_core={level},tower_http={level}",
            level = logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let manager = ConfigManager::load()?;
    init_tracing(&manager.config().logging);

    let config = Arc::new(manager.into_config());
    let server = Server::new(config)?;
    server.run().await?;
    Ok(())
}
