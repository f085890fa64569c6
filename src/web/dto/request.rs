//! Request DTOs for the Web API.

use serde::Deserialize;
use validator::Validate;

/// Body of a feed entry submission.
#[derive(Debug, Deserialize, Validate)]
pub struct AddEntryRequest {
    /// Link to the article.
    #[validate(
        length(min = 1, message = "missing link field"),
        url(message = "link is not a valid URL")
    )]
    pub link: String,
    /// Article title.
    #[validate(length(min = 1, message = "missing title field"))]
    pub title: String,
    /// Name of the feed the article came from.
    #[validate(length(min = 1, message = "missing feed field"))]
    pub feed: String,
}
