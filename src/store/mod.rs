//! Entry storage for Feed Courier.
//!
//! Buckets map a key to the ordered sequence of entries submitted for that
//! period. Two interchangeable backends implement the same capability
//! trait: an in-memory map and a SQLite store, selected at startup.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{StorageBackend, StorageConfig};
use crate::digest::FeedEntry;
use crate::Result;

/// Storage capability for bucketed feed entries.
///
/// Implementations must preserve arrival order within a bucket, and must
/// make an `append` atomic with respect to bucket creation: two
/// near-simultaneous first writes to the same new bucket may not lose an
/// entry. Entries are never removed.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Append an entry to the end of the bucket's sequence, creating the
    /// bucket if absent.
    async fn append(&self, bucket_key: &str, entry: FeedEntry) -> Result<()>;

    /// Read a bucket's entries in arrival order. Returns `None` for a
    /// bucket key that was never touched.
    async fn read(&self, bucket_key: &str) -> Result<Option<Vec<FeedEntry>>>;

    /// Return the bucket's entries, creating and recording an empty bucket
    /// if absent. A later `read` of the same key observes the
    /// existing-but-empty bucket rather than absence.
    async fn ensure(&self, bucket_key: &str) -> Result<Vec<FeedEntry>>;

    /// All entries whose submission instant lies in `[start, end)`, in
    /// arrival order.
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>>;
}

/// Open the configured storage backend.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn EntryStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&config.path).await?)),
    }
}
