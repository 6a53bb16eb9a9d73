//! Periodic eviction of expired resources.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::ResourceStore;

/// Result of one sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepStats {
    pub removed: usize,
    pub remaining: usize,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Background task calling [`ResourceStore::cleanup`] every `interval`.
#[derive(Debug)]
pub struct ResourceSweeper {
    store: Arc<ResourceStore>,
    interval: Duration,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl ResourceSweeper {
    pub fn new(store: Arc<ResourceStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            stop_tx: None,
        }
    }

    /// Spawn the sweep loop. The first sweep runs one interval after start.
    pub fn start(&mut self) -> JoinHandle<()> {
        let store = self.store.clone();
        let period = self.interval;
        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stats = Self::sweep(&store);
                        if stats.removed > 0 {
                            tracing::debug!(
                                removed = stats.removed,
                                remaining = stats.remaining,
                                "resource_sweep_completed"
                            );
                        }
                    }
                    _ = &mut stop_rx => {
                        tracing::info!("resource_sweeper_stopped");
                        break;
                    }
                }
            }
        })
    }

    /// Stop the sweep loop. No-op if it is not running.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Run a single sweep.
    pub fn sweep(store: &ResourceStore) -> SweepStats {
        let removed = store.cleanup();
        SweepStats {
            removed,
            remaining: store.count(),
            completed_at: Some(Utc::now()),
        }
    }
}

impl Drop for ResourceSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
