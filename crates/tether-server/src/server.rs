use std::sync::Arc;

use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{info, warn};

use tether_sync::SyncEngine;

use crate::config::TetherConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Tether backend server.
///
/// Owns the process-wide [`SyncEngine`]; backend code embedding the server
/// reaches the registry through [`TetherServer::engine`].
pub struct TetherServer {
    config: TetherConfig,
    engine: Arc<SyncEngine>,
}

impl TetherServer {
    /// Build the engine and create every configured seed state.
    ///
    /// Seeded states hold JSON values, so any frontend shape decodes them.
    pub fn new(config: TetherConfig) -> ServerResult<Self> {
        let engine = Arc::new(SyncEngine::new(config.sync.clone()));
        for seed in &config.states {
            let created = engine
                .registry()
                .insert::<Value>(seed.name.as_str(), seed.initial.clone())?;
            if !created {
                warn!(name = %seed.name, "duplicate seed ignored");
            }
        }
        info!(seeded = engine.registry().len(), "states seeded");
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            engine: Arc::clone(&self.engine),
            keep_alive: self.config.server.keep_alive(),
        })
    }

    /// Serve until Ctrl-C, then tear the registry down.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.server.bind_addr).await?;
        info!("tether server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        self.engine.registry().teardown();
        info!("tether server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
