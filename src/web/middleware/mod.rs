//! Middleware for the Web API.

pub mod auth;

pub use auth::{require_api_key, ApiKeyState};
