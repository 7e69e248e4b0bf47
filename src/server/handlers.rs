//! HTTP request handlers for the post details API.
//!
//! # Endpoints
//!
//! - `GET /get_post_details?shortcode=...&media_id=...` - Post metadata
//! - `GET /health` - Health check endpoint

use std::any::Any;

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::instagram::PostSource;
use crate::lookup::{ErrorCode, LookupRequest, LookupResponse, LookupService, ResponseEnvelope};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the lookup service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: PostSource> {
    pub lookup_service: LookupService<S>,
}

impl<S: PostSource> AppState<S> {
    pub fn new(lookup_service: LookupService<S>) -> Self {
        Self { lookup_service }
    }
}

impl<S: PostSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            lookup_service: self.lookup_service.clone(),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

impl IntoResponse for LookupResponse {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.envelope) {
            Ok(body) => (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(err) => {
                error!("Failed to serialize response envelope: {}", err);
                internal_error_response()
            }
        }
    }
}

/// The 1006 envelope, used for failures outside the lookup itself.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ResponseEnvelope::error(ErrorCode::Internal)),
    )
        .into_response()
}

/// Convert a handler panic into the 1006 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);
    internal_error_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle post details requests.
///
/// # Endpoint
///
/// `GET /get_post_details`
///
/// # Query Parameters
///
/// - `shortcode`: Post shortcode (takes precedence)
/// - `media_id`: Numeric media id, used when `shortcode` is absent
///
/// A repeated parameter takes its first value.
///
/// # Response
///
/// Always a JSON envelope `{success, partial, error_code, message, data}`:
///
/// - `200 OK`: Post fetched (`partial` set if location or carousel failed)
/// - `206 Partial Content`: Post fetched but required fields missing (1005)
/// - `400 Bad Request`: No usable identifier (1000)
/// - `404 Not Found`: Post not found (1001)
/// - `429 Too Many Requests`: Rate limited (1002)
/// - `500 Internal Server Error`: Unexpected error (1004, 1006)
/// - `503 Service Unavailable`: Connection error (1003)
pub async fn post_details_handler<S: PostSource>(
    State(state): State<AppState<S>>,
    RawQuery(query): RawQuery,
) -> Response {
    let request = LookupRequest::from_query(query.as_deref());

    state.lookup_service.handle(&request).await.into_response()
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
