//! # Bridge Runtime
//!
//! Startup and shutdown orchestration.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Fold relation sources into the registry store (`Loading`)
//! 3. Freeze the store behind `Arc`, create the event queue
//! 4. Register satellite connections with the event router
//! 5. Spawn the drain scheduler
//! 6. Start the Registry API (`Running`)
//!
//! ## Shutdown Sequence
//!
//! 1. Signal the watch channel (`Stopping`)
//! 2. Stop the API and let in-flight requests finish
//! 3. Await the drain task, which writes a final journal
//! 4. `Stopped`

use crate::adapters::register_satellites;
use crate::container::{BridgeConfig, BridgeContext};
use shared_bus::{
    DrainScheduler, EventPublisher, EventRouter, FileReceiptSink, InMemoryEventQueue,
    QueueJournal, QUEUE_JOURNAL_FILE, RECEIPTS_DIR,
};
use shared_types::BridgeState;
use std::net::SocketAddr;
use std::sync::Arc;
use tb_01_relation_registry::RegistryStore;
use tb_02_registry_api::{AppState, ConfigError, RegistryApiService, ServiceError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Runtime lifecycle errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("registry api error: {0}")]
    Service(#[from] ServiceError),

    #[error("bridge runtime already started")]
    AlreadyStarted,
}

/// Live components, present only between `start` and `shutdown`.
struct Running {
    context: BridgeContext,
    router: Arc<EventRouter>,
    api: RegistryApiService,
    drain: JoinHandle<()>,
}

/// The bridge runtime orchestrating registry, router and API.
pub struct BridgeRuntime {
    config: BridgeConfig,
    state: BridgeState,
    running: Option<Running>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl BridgeRuntime {
    /// Create a runtime. Fails fast on invalid configuration.
    pub fn new(config: BridgeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            state: BridgeState::Stopped,
            running: None,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Start every component. Returns the API address, `None` when HTTP is
    /// disabled.
    pub async fn start(&mut self) -> Result<Option<SocketAddr>, RuntimeError> {
        if self.running.is_some() {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!("===========================================");
        info!("  Tesseract Bridge starting");
        info!("===========================================");

        self.state = BridgeState::Loading;
        self.shutdown_tx.send_replace(false);

        let paths = &self.config.paths;
        let context = BridgeContext::load(paths).await;

        let receipts = Arc::new(FileReceiptSink::new(paths.events_dir.join(RECEIPTS_DIR)));
        let mut router = EventRouter::new(Arc::clone(&context.queue), receipts)
            .with_dispatch_timeout(self.config.router.dispatch_timeout());
        register_satellites(&mut router);
        let router = Arc::new(router);

        let mut scheduler =
            DrainScheduler::new(Arc::clone(&router), self.config.router.drain_interval);
        if self.config.router.journal_queue {
            scheduler =
                scheduler.with_journal(QueueJournal::new(paths.events_dir.join(QUEUE_JOURNAL_FILE)));
        }
        let drain = scheduler.spawn(self.shutdown_rx.clone());

        let api_config = self.config.api_config();
        let state = AppState::new(
            context.store.clone(),
            context.queue.clone(),
            &api_config,
        );
        let api = RegistryApiService::new(api_config, state);
        let mut api = match api {
            Ok(api) => api,
            Err(e) => {
                self.abort_drain(drain).await;
                return Err(e.into());
            }
        };
        let addr = match api.start().await {
            Ok(addr) => addr,
            Err(e) => {
                self.abort_drain(drain).await;
                return Err(e.into());
            }
        };

        info!(
            satellites = router.registered_sources().len(),
            drain_interval_ms = self.config.router.drain_interval.as_millis(),
            "Bridge running"
        );

        self.running = Some(Running {
            context,
            router,
            api,
            drain,
        });
        self.state = BridgeState::Running;
        Ok(addr)
    }

    async fn abort_drain(&mut self, drain: JoinHandle<()>) {
        self.shutdown_tx.send_replace(true);
        if let Err(e) = drain.await {
            error!(error = %e, "Drain task failed");
        }
        self.state = BridgeState::Stopped;
    }

    /// Shutdown gracefully. A no-op when not running.
    pub async fn shutdown(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };

        info!("Initiating graceful shutdown...");
        self.state = BridgeState::Stopping;

        // Signal the drain task
        if self.shutdown_tx.send(true).is_err() {
            warn!("Drain task already gone");
        }

        running.api.shutdown().await;
        if let Err(e) = running.drain.await {
            error!(error = %e, "Drain task failed");
        }

        let stats = running.router.stats();
        info!(
            pending = running.context.queue.len(),
            stats = %stats.to_json(),
            "Shutdown complete"
        );
        self.state = BridgeState::Stopped;
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Bound API address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().and_then(|r| r.api.local_addr())
    }

    pub fn store(&self) -> Option<Arc<RegistryStore>> {
        self.running.as_ref().map(|r| Arc::clone(&r.context.store))
    }

    pub fn queue(&self) -> Option<Arc<InMemoryEventQueue>> {
        self.running.as_ref().map(|r| Arc::clone(&r.context.queue))
    }

    /// In-process producer handle for the running queue.
    pub fn publisher(&self) -> Option<Arc<dyn EventPublisher>> {
        self.queue().map(|q| q as Arc<dyn EventPublisher>)
    }

    pub fn router(&self) -> Option<Arc<EventRouter>> {
        self.running.as_ref().map(|r| Arc::clone(&r.router))
    }
}
