//! HTTP server

use std::net::SocketAddr;
use std::time::Duration;

use crate::core::{Config, Result, ServerError, ServerState};

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl+C or until the state's shutdown token is cancelled
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = crate::api::build_app(&state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        let shutdown = state.shutdown.clone();
        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received, shutting down..."),
                _ = shutdown.cancelled() => tracing::info!("Shutdown requested"),
            }
            // ends open event streams
            shutdown.cancel();
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        crate::api::health::mark_started();
        tracing::info!(%addr, environment = %self.config.environment, "Treasures server listening");

        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .map_err(ServerError::Io)?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
