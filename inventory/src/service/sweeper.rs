//! Background sweeper that releases expired reservations.
//!
//! Owned by the server lifecycle: started after the engine is built,
//! cancelled and joined on shutdown. Runs in bounded batches with a pause
//! between them so a large backlog cannot monopolise the storage pool.
//! Releases are idempotent, so multiple replicas may sweep concurrently.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::InventoryService;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_BATCH_SIZE: i64 = 100;
const BATCH_PAUSE: Duration = Duration::from_millis(250);

pub struct ReservationSweeper {
    service: Arc<InventoryService>,
    interval: Duration,
    batch_size: i64,
}

impl ReservationSweeper {
    pub fn new(service: Arc<InventoryService>) -> Self {
        Self {
            service,
            interval: DEFAULT_SWEEP_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// The interval must stay at or below TTL/4 to keep reservation drift
    /// small; callers configuring short TTLs tighten this accordingly.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Spawn the sweep loop. The returned handle completes once the token
    /// is cancelled and the current pass has finished.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                batch_size = self.batch_size,
                "reservation sweeper started"
            );
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(self.interval) => {}
                }

                // Keep draining full batches, pausing between them to cap
                // load; stop early if shutdown arrives mid-backlog.
                loop {
                    match self.service.sweep_expired(self.batch_size).await {
                        Ok(swept) => {
                            if swept > 0 {
                                debug!(swept, "expired reservations released");
                            }
                            if (swept as i64) < self.batch_size {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("reservation sweep failed: {e}");
                            break;
                        }
                    }

                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = sleep(BATCH_PAUSE) => {}
                    }
                }
            }
            info!("reservation sweeper stopped");
        })
    }
}
