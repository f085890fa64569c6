//! Scheduled digest trigger for Feed Courier.
//!
//! A background task sleeps until the next configured wall-clock fire time
//! in the digest time zone, then kicks off the send pipeline. The pipeline
//! run is spawned and not awaited: the scheduler neither retries nor
//! couples to the outcome, and failures are surfaced through logging only.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::digest::DigestService;

/// Recurring digest trigger.
pub struct DigestScheduler {
    service: Arc<DigestService>,
}

impl DigestScheduler {
    /// Create a scheduler over the given service.
    pub fn new(service: Arc<DigestService>) -> Self {
        Self { service }
    }

    /// How long to sleep from `now` until the next fire instant.
    fn until_next(&self, now: DateTime<Utc>) -> Duration {
        let fire = self.service.resolver().next_fire(now);
        (fire - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Run the trigger loop indefinitely.
    pub async fn run(&self) {
        loop {
            let now = Utc::now();
            // The fire instant is captured here and passed through, so the
            // resolved bucket is the one closing at the boundary even when
            // the task wakes a moment late.
            let fire = self.service.resolver().next_fire(now);
            let wait = self.until_next(now);
            info!("Next digest fires in {}s (at {})", wait.as_secs(), fire);
            tokio::time::sleep(wait).await;

            // Fire and forget: a slow or failing dispatch must not delay
            // the next scheduling round or crash the process.
            let service = self.service.clone();
            tokio::spawn(async move {
                if let Err(e) = service.run_digest_at(fire).await {
                    error!("Scheduled digest failed: {e}");
                }
            });
        }
    }
}

/// Start the digest scheduler as a background task.
pub fn start_scheduler(service: Arc<DigestService>) -> JoinHandle<()> {
    let scheduler = DigestScheduler::new(service);
    tokio::spawn(async move {
        scheduler.run().await;
    })
}
