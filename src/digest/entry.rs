//! Feed entry types for Feed Courier.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{CourierError, Result};

/// A single submitted feed entry.
///
/// Immutable once created; carries no identity beyond its field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Link to the article.
    pub link: String,
    /// Article title.
    pub title: String,
    /// Name of the feed the article came from.
    pub feed: String,
}

impl FeedEntry {
    /// Build a validated entry from raw submitted fields.
    ///
    /// All three fields must be non-empty and the link must parse as a URL.
    /// On failure nothing is stored anywhere; the caller gets a
    /// descriptive validation message.
    pub fn new(link: &str, title: &str, feed: &str) -> Result<Self> {
        if link.trim().is_empty() {
            return Err(CourierError::Validation("missing link field".to_string()));
        }
        if title.trim().is_empty() {
            return Err(CourierError::Validation("missing title field".to_string()));
        }
        if feed.trim().is_empty() {
            return Err(CourierError::Validation("missing feed field".to_string()));
        }
        Url::parse(link)
            .map_err(|e| CourierError::Validation(format!("link is not a valid URL: {e}")))?;

        Ok(Self {
            link: link.to_string(),
            title: title.to_string(),
            feed: feed.to_string(),
        })
    }
}
