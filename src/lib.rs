//! Feed Courier
//!
//! Collects feed entries over an authenticated HTTP API and delivers a
//! single aggregated digest message to chat webhooks, on a daily or weekly
//! schedule or on demand.

pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod web;
pub mod webhook;

pub use config::{Config, PeriodMode, StorageBackend};
pub use digest::{
    BucketResolver, BucketWindow, DigestColor, DigestFormatter, DigestMessage, DigestService,
    FeedEntry,
};
pub use error::{CourierError, Result};
pub use scheduler::{start_scheduler, DigestScheduler};
pub use store::{open_store, EntryStore, MemoryStore, SqliteStore};
pub use web::WebServer;
pub use webhook::WebhookDispatcher;
