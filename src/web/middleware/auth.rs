//! Shared-secret bearer authentication middleware.
//!
//! Every call must carry `Authorization: Bearer <key>` with the configured
//! API key. Rejection happens here, before any handler touches the store.

use std::sync::Arc;

use axum::{
    body::Body, extract::State, http::Request, middleware::Next, response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::web::error::ApiError;

/// Middleware state holding the configured API key.
#[derive(Clone)]
pub struct ApiKeyState {
    key: String,
}

impl ApiKeyState {
    /// Create the state from the configured key.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

/// Require a bearer token matching the configured API key.
pub async fn require_api_key(
    State(state): State<Arc<ApiKeyState>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match bearer {
        Some(TypedHeader(auth)) if auth.token() == state.key => Ok(next.run(request).await),
        Some(_) => Err(ApiError::unauthorized("Wrong API key")),
        None => Err(ApiError::unauthorized("Missing API key")),
    }
}
