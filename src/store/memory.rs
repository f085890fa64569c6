//! In-memory entry store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::digest::FeedEntry;
use crate::store::EntryStore;
use crate::Result;

struct StoredEntry {
    /// Global arrival sequence, used to keep range queries in arrival order.
    seq: u64,
    submitted_at: DateTime<Utc>,
    entry: FeedEntry,
}

/// Bucket map held in process memory. Entries are lost on restart.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    buckets: HashMap<String, Vec<StoredEntry>>,
    next_seq: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn append(&self, bucket_key: &str, entry: FeedEntry) -> Result<()> {
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .buckets
            .entry(bucket_key.to_string())
            .or_default()
            .push(StoredEntry {
                seq,
                submitted_at: Utc::now(),
                entry,
            });
        Ok(())
    }

    async fn read(&self, bucket_key: &str) -> Result<Option<Vec<FeedEntry>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .buckets
            .get(bucket_key)
            .map(|stored| stored.iter().map(|s| s.entry.clone()).collect()))
    }

    async fn ensure(&self, bucket_key: &str) -> Result<Vec<FeedEntry>> {
        let mut inner = self.inner.write().await;
        let stored = inner.buckets.entry(bucket_key.to_string()).or_default();
        Ok(stored.iter().map(|s| s.entry.clone()).collect())
    }

    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>> {
        let inner = self.inner.read().await;
        let mut matched: Vec<(u64, FeedEntry)> = inner
            .buckets
            .values()
            .flatten()
            .filter(|s| start <= s.submitted_at && s.submitted_at < end)
            .map(|s| (s.seq, s.entry.clone()))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, entry)| entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(n: u32) -> FeedEntry {
        FeedEntry {
            link: format!("https://example.com/{n}"),
            title: format!("Title {n}"),
            feed: "Feed".to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_untouched_bucket_is_absent() {
        let store = MemoryStore::new();
        assert!(store.read("Jan 05, 2026").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_then_read_preserves_order() {
        let store = MemoryStore::new();
        store.append("Jan 05, 2026", entry(1)).await.unwrap();
        store.append("Jan 05, 2026", entry(2)).await.unwrap();

        let entries = store.read("Jan 05, 2026").await.unwrap().unwrap();
        assert_eq!(entries, vec![entry(1), entry(2)]);
    }

    #[tokio::test]
    async fn test_ensure_records_empty_bucket() {
        let store = MemoryStore::new();

        let entries = store.ensure("Jan 05, 2026").await.unwrap();
        assert!(entries.is_empty());

        // The probed bucket now exists as empty rather than absent
        let read_back = store.read("Jan 05, 2026").await.unwrap();
        assert_eq!(read_back, Some(vec![]));
    }

    #[tokio::test]
    async fn test_ensure_returns_existing_entries() {
        let store = MemoryStore::new();
        store.append("Jan 05, 2026", entry(1)).await.unwrap();

        let entries = store.ensure("Jan 05, 2026").await.unwrap();
        assert_eq!(entries, vec![entry(1)]);
    }

    #[tokio::test]
    async fn test_buckets_are_independent() {
        let store = MemoryStore::new();
        store.append("Jan 05, 2026", entry(1)).await.unwrap();
        store.append("Jan 06, 2026", entry(2)).await.unwrap();

        assert_eq!(
            store.read("Jan 05, 2026").await.unwrap().unwrap(),
            vec![entry(1)]
        );
        assert_eq!(
            store.read("Jan 06, 2026").await.unwrap().unwrap(),
            vec![entry(2)]
        );
    }

    #[tokio::test]
    async fn test_query_range() {
        let store = MemoryStore::new();
        let before = Utc::now() - Duration::seconds(1);
        store.append("Jan 05, 2026", entry(1)).await.unwrap();
        store.append("Jan 06, 2026", entry(2)).await.unwrap();
        let after = Utc::now() + Duration::seconds(1);

        let entries = store.query_range(before, after).await.unwrap();
        assert_eq!(entries, vec![entry(1), entry(2)]);

        let none = store.query_range(after, after + Duration::seconds(1)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_first_writes_lose_nothing() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for n in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append("Jan 05, 2026", entry(n)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = store.read("Jan 05, 2026").await.unwrap().unwrap();
        assert_eq!(entries.len(), 20);
    }
}
