//! The digest send pipeline.
//!
//! Resolve the current bucket, read its entries, format, dispatch. The
//! scheduled trigger and the manual API trigger run this exact sequence;
//! nothing is shared between them beyond the entry store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::PeriodMode;
use crate::digest::{BucketResolver, BucketWindow, DigestFormatter, FeedEntry};
use crate::store::EntryStore;
use crate::webhook::WebhookDispatcher;
use crate::Result;

/// Completion acknowledgement returned by a digest send.
const DONE: &str = "Done!";

/// Owns the digest core: store, resolver, formatter and dispatcher.
pub struct DigestService {
    store: Arc<dyn EntryStore>,
    resolver: BucketResolver,
    formatter: DigestFormatter,
    dispatcher: WebhookDispatcher,
}

impl DigestService {
    /// Assemble the service from its parts.
    pub fn new(
        store: Arc<dyn EntryStore>,
        resolver: BucketResolver,
        formatter: DigestFormatter,
        dispatcher: WebhookDispatcher,
    ) -> Self {
        Self {
            store,
            resolver,
            formatter,
            dispatcher,
        }
    }

    /// The bucket resolver.
    pub fn resolver(&self) -> &BucketResolver {
        &self.resolver
    }

    /// Append a validated entry to the bucket it currently resolves to,
    /// returning that bucket.
    pub async fn submit(&self, entry: FeedEntry) -> Result<BucketWindow> {
        let bucket = self.resolver.current_bucket(Utc::now());
        self.store.append(&bucket.key, entry.clone()).await?;
        info!(
            "Saved feed entry '{}' with URL '{}' from feed '{}' for {}",
            entry.title, entry.link, entry.feed, bucket.key
        );
        Ok(bucket)
    }

    /// Read the current bucket's entries. A bucket key that was never
    /// touched is lazily initialized to empty and reported as `None`, so
    /// the caller can distinguish "fresh" from "existing but empty".
    pub async fn probe_current_bucket(&self) -> Result<(BucketWindow, Option<Vec<FeedEntry>>)> {
        let bucket = self.resolver.current_bucket(Utc::now());
        match self.store.read(&bucket.key).await? {
            Some(entries) => Ok((bucket, Some(entries))),
            None => {
                self.store.ensure(&bucket.key).await?;
                Ok((bucket, None))
            }
        }
    }

    /// Run one full digest send: resolve, read, format, dispatch.
    ///
    /// The bucket is not cleared afterwards; a second trigger re-sends
    /// whatever has accumulated.
    pub async fn run_digest(&self) -> Result<String> {
        self.run_digest_at(Utc::now()).await
    }

    /// Run a digest send resolved against an explicit instant.
    ///
    /// The scheduler passes its computed fire instant here so the resolved
    /// bucket is the one whose window closes at that instant, regardless
    /// of how late the task actually wakes.
    pub async fn run_digest_at(&self, now: DateTime<Utc>) -> Result<String> {
        info!("Sending digest");

        let bucket = self.resolver.current_bucket(now);
        let entries = match self.resolver.mode() {
            PeriodMode::Daily => self.store.read(&bucket.key).await?.unwrap_or_default(),
            PeriodMode::Weekly => self.store.query_range(bucket.start, bucket.end).await?,
        };

        let message = self.formatter.format(&entries, &bucket.label);
        self.dispatcher.send(&message).await?;

        info!("Done with sending digest for {}", bucket.key);
        Ok(DONE.to_string())
    }
}
