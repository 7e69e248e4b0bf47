//! Request and response types of the post details API.

use http::StatusCode;
use serde::Serialize;
use url::form_urlencoded;

use super::view::PostView;

// =============================================================================
// Error Codes
// =============================================================================

/// Application error codes returned in the `error_code` field.
///
/// Each code maps to a fixed HTTP status and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No usable `shortcode` or `media_id`
    MissingIdentifier,

    /// Post not found, deleted, or private
    PostNotFound,

    /// Instagram is rate limiting the session
    RateLimited,

    /// Network or upstream failure
    ConnectionError,

    /// Any other failure while fetching the post
    FetchFailed,

    /// The post was fetched but required fields are missing
    IncompletePost,

    /// Failure outside the fetch step
    Internal,
}

impl ErrorCode {
    /// Numeric code reported to clients.
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::MissingIdentifier => 1000,
            ErrorCode::PostNotFound => 1001,
            ErrorCode::RateLimited => 1002,
            ErrorCode::ConnectionError => 1003,
            ErrorCode::FetchFailed => 1004,
            ErrorCode::IncompletePost => 1005,
            ErrorCode::Internal => 1006,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::MissingIdentifier => StatusCode::BAD_REQUEST,
            ErrorCode::PostNotFound => StatusCode::NOT_FOUND,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::ConnectionError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::FetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::IncompletePost => StatusCode::PARTIAL_CONTENT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed client-facing message.
    ///
    /// [`ErrorCode::IncompletePost`] responses replace this with the list of
    /// missing fields.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::MissingIdentifier => "Missing shortcode or media_id parameter.",
            ErrorCode::PostNotFound => "Post not found. It may have been deleted or is private.",
            ErrorCode::RateLimited => "Rate limit hit. Please wait before retrying.",
            ErrorCode::ConnectionError => "Connection error. Please try again later.",
            ErrorCode::FetchFailed => "Unexpected error while fetching post.",
            ErrorCode::IncompletePost => "Incomplete post data.",
            ErrorCode::Internal => "Internal server error. Please contact support.",
        }
    }
}

/// Message of a successful lookup.
pub const SUCCESS_MESSAGE: &str = "Post details fetched successfully.";

// =============================================================================
// Request
// =============================================================================

/// Query parameters of `GET /get_post_details`.
#[derive(Debug, Clone, Default)]
pub struct LookupRequest {
    /// Post shortcode
    pub shortcode: Option<String>,

    /// Numeric media id, as a string
    pub media_id: Option<String>,
}

/// The identifier a lookup resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostIdentifier {
    Shortcode(String),
    MediaId(u64),
}

impl LookupRequest {
    pub fn by_shortcode(shortcode: impl Into<String>) -> Self {
        Self {
            shortcode: Some(shortcode.into()),
            media_id: None,
        }
    }

    /// Read the parameters from a raw query string.
    ///
    /// When a key is repeated the first value is used. Unknown keys are
    /// ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut request = Self::default();

        for (key, value) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            let slot = match key.as_ref() {
                "shortcode" => &mut request.shortcode,
                "media_id" => &mut request.media_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        request
    }

    pub fn by_media_id(media_id: impl Into<String>) -> Self {
        Self {
            shortcode: None,
            media_id: Some(media_id.into()),
        }
    }

    /// Resolve the identifier to look up.
    ///
    /// A non-empty `shortcode` wins. Otherwise `media_id` is used if it parses
    /// as an unsigned integer; an unparseable `media_id` counts as absent.
    /// Ids beyond `u64::MAX` cannot name a post and are treated as unparseable.
    pub fn identifier(&self) -> Option<PostIdentifier> {
        if let Some(shortcode) = self.shortcode.as_deref().filter(|s| !s.is_empty()) {
            return Some(PostIdentifier::Shortcode(shortcode.to_string()));
        }

        self.media_id
            .as_deref()
            .and_then(|id| id.trim().parse::<u64>().ok())
            .map(PostIdentifier::MediaId)
    }
}

// =============================================================================
// Response
// =============================================================================

/// JSON body returned for every lookup, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub success: bool,

    /// Set when optional enrichments failed or required fields are missing
    pub partial: bool,

    pub error_code: Option<u16>,

    pub message: Option<String>,

    pub data: Option<PostView>,
}

impl ResponseEnvelope {
    /// Envelope for a full or partially enriched success.
    pub fn success(data: PostView, partial: bool) -> Self {
        Self {
            success: true,
            partial,
            error_code: None,
            message: Some(SUCCESS_MESSAGE.to_string()),
            data: Some(data),
        }
    }

    /// Envelope for an error with its fixed message and no data.
    pub fn error(code: ErrorCode) -> Self {
        Self {
            success: false,
            partial: false,
            error_code: Some(code.code()),
            message: Some(code.message().to_string()),
            data: None,
        }
    }

    /// Envelope for a fetched post that lacks required fields.
    pub fn incomplete(data: PostView, missing: &[&str]) -> Self {
        Self {
            success: false,
            partial: true,
            error_code: Some(ErrorCode::IncompletePost.code()),
            message: Some(format!(
                "Incomplete post data. Missing fields: {}",
                missing.join(", ")
            )),
            data: Some(data),
        }
    }
}

/// Result of a lookup: the envelope and the HTTP status to send it with.
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub status: StatusCode,
    pub envelope: ResponseEnvelope,
}

impl LookupResponse {
    pub fn new(status: StatusCode, envelope: ResponseEnvelope) -> Self {
        Self { status, envelope }
    }

    /// Error response with the code's fixed status and message.
    pub fn error(code: ErrorCode) -> Self {
        Self::new(code.status(), ResponseEnvelope::error(code))
    }
}
