//! API handlers for the Web API.

pub mod entries;

pub use entries::*;

use std::sync::Arc;

use crate::digest::DigestService;

/// Shared application state for handlers.
pub struct AppState {
    /// The digest core.
    pub service: Arc<DigestService>,
}

impl AppState {
    /// Create the state over a digest service.
    pub fn new(service: Arc<DigestService>) -> Self {
        Self { service }
    }
}
