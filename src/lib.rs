//! # ig-post-server
//!
//! An HTTP service that exposes the metadata of a single Instagram post as
//! JSON, fetched through an authenticated Instagram web session.
//!
//! ## Features
//!
//! - **Lookup by shortcode or media id**: `GET /get_post_details`
//! - **Stable envelope**: every response is `{success, partial, error_code, message, data}`
//!   with a fixed table of application error codes
//! - **Best-effort enrichment**: location and carousel items degrade to a
//!   partial response instead of failing the request
//! - **Single session**: one login at startup, outbound requests serialized
//!
//! ## Architecture
//!
//! - [`instagram`] - Session client, post records, shortcode conversion
//! - [`lookup`] - Validation, error mapping and response shaping
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use ig_post_server::{create_router, ClientOptions, Credentials, InstagramClient, LookupService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("username", "password");
//!     let client = InstagramClient::login(&credentials, ClientOptions::default()).await?;
//!
//!     let router = create_router(LookupService::new(client), RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod instagram;
pub mod lookup;
pub mod server;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, SessionArgs};
pub use error::{FetchError, LoginError};
pub use instagram::{
    media_id_to_shortcode, shortcode_to_media_id, ClientOptions, Credentials, InstagramClient,
    Location, LocationRef, OwnerProfile, PostRecord, PostSource, PostType, ShortcodeError,
    SidecarNode, SidecarNodes,
};
pub use lookup::{
    classify_fetch_error, CarouselItem, ErrorCode, LookupRequest, LookupResponse, LookupService,
    OwnerInfo, PostIdentifier, PostView, ResponseEnvelope,
};
pub use server::{create_router, health_handler, post_details_handler, AppState, RouterConfig};
