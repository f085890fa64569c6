//! Digest aggregation core for Feed Courier.
//!
//! Entries accumulate into time buckets (one per day or week) and are
//! flattened into a single outbound digest message when a bucket's send
//! fires, either on schedule or on a manual trigger.

pub mod bucket;
pub mod entry;
pub mod format;
pub mod pipeline;

pub use bucket::{BucketResolver, BucketWindow};
pub use entry::FeedEntry;
pub use format::{DigestColor, DigestFormatter, DigestMessage};
pub use pipeline::DigestService;
