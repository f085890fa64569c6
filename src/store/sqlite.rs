//! SQLite-backed entry store.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::digest::FeedEntry;
use crate::store::EntryStore;
use crate::Result;

/// Schema applied on open.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS buckets (
    key        TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE TABLE IF NOT EXISTS entries (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    bucket_key   TEXT NOT NULL REFERENCES buckets(key),
    link         TEXT NOT NULL,
    title        TEXT NOT NULL,
    feed         TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_bucket ON entries(bucket_key);
CREATE INDEX IF NOT EXISTS idx_entries_submitted ON entries(submitted_at);
";

/// Entry store backed by a SQLite database.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (and create if missing) the database at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening entry database at {:?}", path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.setup_schema().await?;
        Ok(store)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(sqlx::Error::from)?;
        // A single long-lived connection, so the in-memory database
        // survives for the lifetime of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.setup_schema().await?;
        Ok(store)
    }

    async fn setup_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Uniform timestamp encoding, so lexicographic comparison of stored
    /// values matches chronological order.
    fn encode_instant(t: DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> std::result::Result<FeedEntry, sqlx::Error> {
        Ok(FeedEntry {
            link: row.try_get("link")?,
            title: row.try_get("title")?,
            feed: row.try_get("feed")?,
        })
    }
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn append(&self, bucket_key: &str, entry: FeedEntry) -> Result<()> {
        // Bucket creation and entry insert commit together, so two
        // near-simultaneous first writes to a new bucket both land.
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO buckets (key) VALUES (?) ON CONFLICT(key) DO NOTHING")
            .bind(bucket_key)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO entries (bucket_key, link, title, feed, submitted_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(bucket_key)
        .bind(&entry.link)
        .bind(&entry.title)
        .bind(&entry.feed)
        .bind(Self::encode_instant(Utc::now()))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn read(&self, bucket_key: &str) -> Result<Option<Vec<FeedEntry>>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM buckets WHERE key = ?)")
                .bind(bucket_key)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Ok(None);
        }

        let rows = sqlx::query(
            "SELECT link, title, feed FROM entries WHERE bucket_key = ? ORDER BY id",
        )
        .bind(bucket_key)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(entries))
    }

    async fn ensure(&self, bucket_key: &str) -> Result<Vec<FeedEntry>> {
        sqlx::query("INSERT INTO buckets (key) VALUES (?) ON CONFLICT(key) DO NOTHING")
            .bind(bucket_key)
            .execute(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT link, title, feed FROM entries WHERE bucket_key = ? ORDER BY id",
        )
        .bind(bucket_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>> {
        let rows = sqlx::query(
            "SELECT link, title, feed FROM entries
             WHERE submitted_at >= ? AND submitted_at < ?
             ORDER BY id",
        )
        .bind(Self::encode_instant(start))
        .bind(Self::encode_instant(end))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
