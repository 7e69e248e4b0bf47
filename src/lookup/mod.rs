//! Post lookup: validation, error mapping and response shaping.
//!
//! This module turns a [`LookupRequest`] into a [`LookupResponse`]: a fixed
//! JSON envelope plus the HTTP status to send it with.
//!
//! | error_code | status | meaning                                    |
//! |------------|--------|--------------------------------------------|
//! | 1000       | 400    | no usable `shortcode` / `media_id`         |
//! | 1001       | 404    | post not found, deleted or private         |
//! | 1002       | 429    | Instagram rate limit                       |
//! | 1003       | 503    | connection error                           |
//! | 1004       | 500    | other fetch error                          |
//! | 1005       | 206    | fetched post lacks required fields         |
//! | 1006       | 500    | internal error outside the fetch step      |

mod envelope;
mod service;
mod view;

pub use envelope::{
    ErrorCode, LookupRequest, LookupResponse, PostIdentifier, ResponseEnvelope, SUCCESS_MESSAGE,
};
pub use service::{classify_fetch_error, LookupService};
pub use view::{CarouselItem, OwnerInfo, PostView, REQUIRED_FIELDS};
