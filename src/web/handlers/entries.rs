//! Entry and digest handlers for the Web API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::digest::FeedEntry;
use crate::web::dto::{AddEntryRequest, ApiResponse, EntriesResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// PUT /api/entries - Add a feed entry to the current bucket.
///
/// A submission failing validation stores nothing.
pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddEntryRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    body.validate().map_err(ApiError::from_validation_errors)?;
    let entry = FeedEntry::new(&body.link, &body.title, &body.feed)?;

    state.service.submit(entry).await?;

    Ok(Json(ApiResponse::new("Saved feed entry!".to_string())))
}

/// GET /api/entries - Read the current bucket's entries.
///
/// A bucket key that was never touched is lazily initialized and reported
/// as 404 with an empty sequence; once probed (or written), the same key
/// reads back as 200.
pub async fn get_entries(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let (bucket, entries) = state.service.probe_current_bucket().await?;

    match entries {
        Some(entries) => Ok(Json(ApiResponse::new(EntriesResponse {
            bucket: bucket.key,
            entries,
        }))
        .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::new(EntriesResponse {
                bucket: bucket.key,
                entries: Vec::new(),
            })),
        )
            .into_response()),
    }
}

/// POST /api/digest - Trigger a digest send now.
///
/// Runs the identical pipeline as the scheduled trigger, synchronously,
/// and returns its completion acknowledgement. Does not alter the next
/// scheduled fire.
pub async fn send_digest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let output = state.service.run_digest().await?;
    Ok(Json(ApiResponse::new(output)))
}
