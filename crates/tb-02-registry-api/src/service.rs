//! Registry API service - binds the HTTP listener and owns its lifecycle.

use crate::domain::{ApiConfig, ServiceError};
use crate::router::{build_router, AppState};
use axum::Router;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct RegistryApiService {
    config: ApiConfig,
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl RegistryApiService {
    /// Create the service. Configuration is validated here, not at `start`.
    pub fn new(config: ApiConfig, state: AppState) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self {
            config,
            state,
            shutdown_tx: None,
            server: None,
            local_addr: None,
        })
    }

    /// Router with all middleware applied, for in-process use.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Bind and start serving in the background.
    ///
    /// Returns the bound address, or `None` when HTTP is disabled.
    pub async fn start(&mut self) -> Result<Option<SocketAddr>, ServiceError> {
        if self.server.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }
        if !self.config.http.enabled {
            info!("HTTP server disabled");
            return Ok(None);
        }

        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = self.router();

        info!(addr = %local_addr, "Registry API listening");
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            match result {
                Ok(()) => info!("Registry API stopped"),
                Err(e) => error!(error = %e, "Registry API server error"),
            }
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.server = Some(server);
        self.local_addr = Some(local_addr);
        Ok(Some(local_addr))
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.server.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Trigger graceful shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            if let Err(e) = server.await {
                error!(error = %e, "Registry API task failed");
            }
        }
    }
}
