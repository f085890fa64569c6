//! Web API module for Feed Courier.
//!
//! Thin HTTP surface over the digest core: submit entries, read the
//! current bucket, and trigger a send manually. All routes are guarded by
//! a shared-secret bearer token.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
