//! Instagram session client.
//!
//! This module provides access to post metadata through an authenticated
//! Instagram web session.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             LookupService               │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           PostSource Trait              │
//! │  (shortcode / media id lookups,         │
//! │   location and carousel enrichment)     │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           InstagramClient               │
//! │  (logged-in reqwest session, one        │
//! │   outbound request at a time)           │
//! └─────────────────────────────────────────┘
//! ```

mod caption;
mod client;
mod parse;
mod post;
mod shortcode;

use async_trait::async_trait;

use crate::error::FetchError;

pub use caption::{extract_hashtags, extract_mentions};
pub use client::{
    ClientOptions, Credentials, InstagramClient, DEFAULT_API_BASE_URL, DEFAULT_BASE_URL,
    DEFAULT_GRAPHQL_DOC_ID,
};
pub use post::{Location, LocationRef, OwnerProfile, PostRecord, PostType, SidecarNode};
pub use shortcode::{media_id_to_shortcode, shortcode_to_media_id, ShortcodeError};

/// Lazily decoded carousel children.
///
/// Items are produced in carousel order. An `Err` item means enumeration
/// broke down at that point; consumers should stop there.
pub type SidecarNodes = Box<dyn Iterator<Item = Result<SidecarNode, FetchError>> + Send>;

// =============================================================================
// PostSource Trait
// =============================================================================

/// Trait for fetching posts from Instagram.
///
/// This abstraction lets the lookup service work against the real session
/// client or a test double.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch a post by its shortcode.
    async fn post_by_shortcode(&self, shortcode: &str) -> Result<PostRecord, FetchError>;

    /// Fetch a post by its numeric media id.
    async fn post_by_media_id(&self, media_id: u64) -> Result<PostRecord, FetchError>;

    /// Resolve the post's location, if it has one.
    async fn location(&self, post: &PostRecord) -> Result<Option<Location>, FetchError>;

    /// Enumerate the children of a carousel post.
    async fn sidecar_nodes(&self, post: &PostRecord) -> SidecarNodes;
}
