//! Response DTOs for the Web API.

use serde::Serialize;

use crate::digest::FeedEntry;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Entries of the current bucket.
#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    /// The bucket key the entries belong to.
    pub bucket: String,
    /// Entries in arrival order.
    pub entries: Vec<FeedEntry>,
}
