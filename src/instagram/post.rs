//! Post data as produced by the session client.
//!
//! These types are read-only to the lookup layer: it projects them into
//! [`PostView`](crate::lookup::PostView) but never mutates them.

use chrono::{DateTime, Utc};

use super::caption::{extract_hashtags, extract_mentions};

// =============================================================================
// Post Type
// =============================================================================

/// Discriminator for the kind of media a post contains.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PostType {
    /// A single image (`GraphImage`)
    #[default]
    Image,

    /// A single video (`GraphVideo`)
    Video,

    /// A multi-item carousel (`GraphSidecar`)
    Sidecar,

    /// Any typename we do not know about, kept verbatim
    Other(String),
}

impl PostType {
    /// Parse a GraphQL `__typename`.
    ///
    /// Newer API responses prefix typenames with `XDT`; that prefix is ignored.
    pub fn from_typename(typename: &str) -> Self {
        match typename.strip_prefix("XDT").unwrap_or(typename) {
            "GraphImage" => PostType::Image,
            "GraphVideo" => PostType::Video,
            "GraphSidecar" => PostType::Sidecar,
            _ => PostType::Other(typename.to_string()),
        }
    }

    /// The typename reported to API clients.
    pub fn as_str(&self) -> &str {
        match self {
            PostType::Image => "GraphImage",
            PostType::Video => "GraphVideo",
            PostType::Sidecar => "GraphSidecar",
            PostType::Other(name) => name,
        }
    }

    /// Whether this post is a multi-item carousel.
    pub fn is_sidecar(&self) -> bool {
        matches!(self, PostType::Sidecar)
    }
}

// =============================================================================
// Owner
// =============================================================================

/// Profile of the account that owns a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerProfile {
    pub id: u64,
    pub username: String,
    pub full_name: String,
    pub profile_pic_url: Option<String>,
    pub biography: String,
    pub external_url: Option<String>,
    pub is_private: bool,
    pub is_verified: bool,
    pub followers: u64,
    pub following: u64,
    pub media_count: u64,
}

// =============================================================================
// Location
// =============================================================================

/// Location attached to a post, as embedded in the post node.
///
/// The embedded form may be incomplete; [`PostSource::location`] resolves it
/// into a full [`Location`].
///
/// [`PostSource::location`]: super::PostSource::location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRef {
    pub id: u64,
    pub name: Option<String>,
}

/// A resolved post location.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: u64,
    pub name: String,
}

// =============================================================================
// Sidecar
// =============================================================================

/// One item of a carousel post.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarNode {
    pub is_video: bool,
    pub display_url: String,
    pub video_url: Option<String>,
}

impl SidecarNode {
    /// The URL clients should use: the playable URL for videos, the display
    /// URL otherwise.
    pub fn url(&self) -> &str {
        if self.is_video {
            self.video_url.as_deref().unwrap_or(&self.display_url)
        } else {
            &self.display_url
        }
    }
}

// =============================================================================
// Post Record
// =============================================================================

/// A single post as returned by the session client.
#[derive(Debug, Clone, Default)]
pub struct PostRecord {
    /// Public base62-style identifier; may be empty if the API omitted it
    pub shortcode: String,

    /// Internal numeric identifier
    pub media_id: Option<u64>,

    pub is_video: bool,

    /// Playable URL (videos only)
    pub video_url: Option<String>,

    /// Full-size display image URL
    pub display_url: Option<String>,

    pub thumbnail_url: Option<String>,

    pub caption: Option<String>,

    /// Upload time
    pub taken_at: Option<DateTime<Utc>>,

    pub likes: u64,

    pub comments: u64,

    pub post_type: PostType,

    pub owner: OwnerProfile,

    /// Location reference embedded in the post node
    pub location: Option<LocationRef>,

    /// Raw `edge_sidecar_to_children` nodes, decoded lazily by the source
    pub sidecar_edges: Vec<serde_json::Value>,
}

impl PostRecord {
    /// Lowercased hashtags from the caption, without the leading `#`.
    pub fn caption_hashtags(&self) -> Vec<String> {
        self.caption
            .as_deref()
            .map(extract_hashtags)
            .unwrap_or_default()
    }

    /// Lowercased account mentions from the caption, without the leading `@`.
    pub fn caption_mentions(&self) -> Vec<String> {
        self.caption
            .as_deref()
            .map(extract_mentions)
            .unwrap_or_default()
    }
}
