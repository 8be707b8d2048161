//! # Drain Scheduler
//!
//! Owns the ticker that drives `EventRouter::drain_one`. One task, one drain
//! per tick; a tick that fires while a drain is still running is skipped.

use crate::journal::QueueJournal;
use crate::router::EventRouter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodic drainer for an `EventRouter`.
pub struct DrainScheduler {
    router: Arc<EventRouter>,
    period: Duration,
    journal: Option<QueueJournal>,
    /// Queue revision last written to the journal.
    journaled_revision: Option<u64>,
}

/// Shortest accepted drain period; `tokio::time::interval` rejects zero.
pub const MIN_DRAIN_PERIOD: Duration = Duration::from_millis(1);

impl DrainScheduler {
    /// `period` below [`MIN_DRAIN_PERIOD`] is raised to it.
    pub fn new(router: Arc<EventRouter>, period: Duration) -> Self {
        if period < MIN_DRAIN_PERIOD {
            warn!(
                period_ms = period.as_millis(),
                "Drain period too short, using minimum"
            );
        }
        Self {
            router,
            period: period.max(MIN_DRAIN_PERIOD),
            journal: None,
            journaled_revision: None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Mirror the pending queue to `journal` after each tick that changed it.
    #[must_use]
    pub fn with_journal(mut self, journal: QueueJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Spawn the drain loop. It stops when `shutdown` flips to `true` or its
    /// sender is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Drain loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period_ms = self.period.as_millis(), "Event processor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Leave the journal matching what is still queued.
        self.sync_journal().await;
        info!(
            pending = self.router.queue().len(),
            "Event processor stopped"
        );
    }

    /// One drain step followed by a journal refresh.
    pub async fn tick(&mut self) {
        if let Some(receipt) = self.router.drain_one().await {
            debug!(event_id = %receipt.event.id, "Drain tick routed event");
        }
        self.sync_journal().await;
    }

    async fn sync_journal(&mut self) {
        let Some(journal) = &self.journal else {
            return;
        };
        let revision = self.router.queue().revision();
        if self.journaled_revision == Some(revision) {
            return;
        }

        let pending = self.router.queue().snapshot();
        match journal.persist(&pending).await {
            Ok(()) => self.journaled_revision = Some(revision),
            Err(e) => warn!(error = %e, "Failed to write queue journal"),
        }
    }
}
