//! Lookup Service for fetching and shaping post details.
//!
//! The LookupService is the main entry point for post detail requests. It
//! orchestrates:
//! - Request validation
//! - Post resolution via the session client
//! - Projection into the JSON view
//! - Best-effort location and carousel enrichment
//! - The required-field completeness check
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        LookupService                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                      handle()                           │    │
//! │  │  1. Validate query    4. Enrich location / carousel     │    │
//! │  │  2. Resolve post      5. Check required fields          │    │
//! │  │  3. Project view      6. Build envelope                 │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │                               │                                 │
//! │                               ▼                                 │
//! │                       ┌──────────────┐                          │
//! │                       │  PostSource  │                          │
//! │                       └──────────────┘                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, error, info, warn};

use crate::error::FetchError;
use crate::instagram::{PostRecord, PostSource};

use super::envelope::{ErrorCode, LookupRequest, LookupResponse, PostIdentifier, ResponseEnvelope};
use super::view::{CarouselItem, PostView};

/// Map a resolution failure to its error code.
///
/// Not-found is checked first, then rate limiting, then other connection
/// failures; anything else is an unexpected fetch error.
pub fn classify_fetch_error(err: &FetchError) -> ErrorCode {
    match err {
        FetchError::NotFound(_) => ErrorCode::PostNotFound,
        FetchError::Connection(_) if err.is_rate_limited() => ErrorCode::RateLimited,
        FetchError::Connection(_) => ErrorCode::ConnectionError,
        FetchError::Other(_) => ErrorCode::FetchFailed,
    }
}

/// Service for looking up a single post.
///
/// Every outbound call goes through the [`PostSource`]; the service itself
/// performs no retries and keeps no state between requests.
///
/// # Example
///
/// ```ignore
/// use ig_post_server::lookup::{LookupRequest, LookupService};
///
/// let service = LookupService::new(client);
/// let response = service.handle(&LookupRequest::by_shortcode("CuaDDcSIXyz")).await;
///
/// println!("{} {:?}", response.status, response.envelope.error_code);
/// ```
pub struct LookupService<S: PostSource> {
    source: Arc<S>,
}

impl<S: PostSource> LookupService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Create a service over a source shared with other components.
    pub fn with_shared_source(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Look up a post and build the response envelope.
    ///
    /// Never fails: every outcome, including upstream errors, is mapped to an
    /// envelope and status.
    pub async fn handle(&self, request: &LookupRequest) -> LookupResponse {
        let Some(identifier) = request.identifier() else {
            debug!(?request, "Rejected lookup without usable identifier");
            return LookupResponse::error(ErrorCode::MissingIdentifier);
        };

        let post = match self.resolve(&identifier).await {
            Ok(post) => post,
            Err(err) => {
                let code = classify_fetch_error(&err);
                if code.status().is_server_error() {
                    error!(
                        ?identifier,
                        error_code = code.code(),
                        "Failed to fetch post: {}",
                        err
                    );
                } else {
                    warn!(
                        ?identifier,
                        error_code = code.code(),
                        "Failed to fetch post: {}",
                        err
                    );
                }
                return LookupResponse::error(code);
            }
        };

        let mut view = PostView::from_record(&post);

        let location_failed = self.enrich_location(&post, &mut view).await;
        let carousel_failed = self.enrich_carousel(&post, &mut view).await;
        let partial = location_failed || carousel_failed;

        let missing = view.missing_required_fields();
        if !missing.is_empty() {
            warn!(
                ?identifier,
                missing = %missing.join(","),
                "Fetched post is missing required fields"
            );
            return LookupResponse::new(
                StatusCode::PARTIAL_CONTENT,
                ResponseEnvelope::incomplete(view, &missing),
            );
        }

        info!(
            shortcode = %view.shortcode,
            post_type = %view.post_type,
            partial,
            "Post details fetched"
        );

        LookupResponse::new(StatusCode::OK, ResponseEnvelope::success(view, partial))
    }

    async fn resolve(&self, identifier: &PostIdentifier) -> Result<PostRecord, FetchError> {
        match identifier {
            PostIdentifier::Shortcode(shortcode) => self.source.post_by_shortcode(shortcode).await,
            PostIdentifier::MediaId(media_id) => self.source.post_by_media_id(*media_id).await,
        }
    }

    /// Fill in the location name. Returns `true` if the lookup failed.
    async fn enrich_location(&self, post: &PostRecord, view: &mut PostView) -> bool {
        match self.source.location(post).await {
            Ok(location) => {
                view.location = location.map(|loc| loc.name);
                false
            }
            Err(err) => {
                warn!(shortcode = %post.shortcode, "Location lookup failed: {}", err);
                view.location = None;
                true
            }
        }
    }

    /// Collect carousel items. Returns `true` if enumeration broke off.
    ///
    /// Items collected before a failure are kept.
    async fn enrich_carousel(&self, post: &PostRecord, view: &mut PostView) -> bool {
        if !post.post_type.is_sidecar() {
            return false;
        }

        for node in self.source.sidecar_nodes(post).await {
            match node {
                Ok(node) => view.carousel_media.push(CarouselItem::from(&node)),
                Err(err) => {
                    warn!(
                        shortcode = %post.shortcode,
                        collected = view.carousel_media.len(),
                        "Carousel enumeration failed: {}",
                        err
                    );
                    return true;
                }
            }
        }

        false
    }
}

impl<S: PostSource> Clone for LookupService<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}
