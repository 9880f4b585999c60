use crate::{create_router, AppState};
use reachboard_core::{ConfigError, ReachboardConfig, ReachboardError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub fn new(config: Arc<ReachboardConfig>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                ReachboardError::Config(ConfigError::ValidationError(format!(
                    "invalid bind address {}:{}: {e}",
                    config.server.host, config.server.port
                )))
            })?;
        let state = AppState::new(config);
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state);

        info!("Starting Reachboard server on {}", self.addr);

        let listener = {
            let socket = if self.addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }?;

            // Reuse addr to improve rebind under restarts
            let _ = socket.set_reuseaddr(true);

            socket.bind(self.addr)?;
            socket.listen(1024)?
        };

        info!("Server listening on http://{}", self.addr);
        info!("  GET / - Engagement dashboard");
        info!("  GET /api/dashboard - Dashboard description as JSON");
        info!("  GET /health - Liveness check");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
