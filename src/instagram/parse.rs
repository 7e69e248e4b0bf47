//! Decoding of Instagram JSON payloads.
//!
//! Instagram's web API returns loosely-typed JSON whose shape drifts between
//! API generations, so nodes are navigated with JSON pointers rather than
//! strict serde structs. Absent optional fields decode to defaults; absent
//! structural fields are reported as [`FetchError::Other`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::FetchError;

use super::post::{Location, LocationRef, OwnerProfile, PostRecord, PostType, SidecarNode};
use super::shortcode::shortcode_to_media_id;

// =============================================================================
// Helpers
// =============================================================================

fn str_field(node: &Value, pointer: &str) -> Option<String> {
    node.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn bool_field(node: &Value, pointer: &str) -> bool {
    node.pointer(pointer).and_then(Value::as_bool).unwrap_or(false)
}

/// Read an integer that the API may encode either as a number or a string.
fn u64_field(node: &Value, pointer: &str) -> Option<u64> {
    match node.pointer(pointer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn count_field(node: &Value, pointers: &[&str]) -> u64 {
    pointers
        .iter()
        .find_map(|p| u64_field(node, p))
        .unwrap_or(0)
}

// =============================================================================
// Post
// =============================================================================

/// Locate the media node inside a GraphQL post query response.
///
/// Returns `None` when the post does not exist or is not visible.
pub fn media_node(body: &Value) -> Option<&Value> {
    body.pointer("/data/xdt_shortcode_media")
        .or_else(|| body.pointer("/data/shortcode_media"))
        .filter(|node| !node.is_null())
}

/// Decode a post node into a [`PostRecord`].
///
/// The owner is filled from the embedded `owner` object, which only carries a
/// subset of the profile; the client replaces it with the full profile.
/// Without an `id`, the media id is decoded from the shortcode.
pub fn parse_post(node: &Value) -> Result<PostRecord, FetchError> {
    if !node.is_object() {
        return Err(FetchError::Other("post node is not an object".to_string()));
    }

    let is_video = bool_field(node, "/is_video");
    let display_url = str_field(node, "/display_url");
    let thumbnail_url = str_field(node, "/thumbnail_src").or_else(|| display_url.clone());

    let taken_at = node
        .pointer("/taken_at_timestamp")
        .and_then(Value::as_i64)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

    let post_type = node
        .pointer("/__typename")
        .and_then(Value::as_str)
        .map(PostType::from_typename)
        .unwrap_or(if is_video {
            PostType::Video
        } else {
            PostType::Image
        });

    let location = node
        .pointer("/location")
        .filter(|loc| loc.is_object())
        .and_then(|loc| {
            Some(LocationRef {
                id: u64_field(loc, "/id")?,
                name: str_field(loc, "/name"),
            })
        });

    let sidecar_edges = node
        .pointer("/edge_sidecar_to_children/edges")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let shortcode = str_field(node, "/shortcode").unwrap_or_default();
    let media_id = u64_field(node, "/id").or_else(|| shortcode_to_media_id(&shortcode).ok());

    Ok(PostRecord {
        shortcode,
        media_id,
        is_video,
        video_url: str_field(node, "/video_url"),
        display_url,
        thumbnail_url,
        caption: node
            .pointer("/edge_media_to_caption/edges/0/node/text")
            .and_then(Value::as_str)
            .map(String::from),
        taken_at,
        likes: count_field(
            node,
            &["/edge_media_preview_like/count", "/edge_liked_by/count"],
        ),
        comments: count_field(
            node,
            &[
                "/edge_media_to_comment/count",
                "/edge_media_to_parent_comment/count",
                "/edge_media_preview_comment/count",
            ],
        ),
        post_type,
        owner: node
            .get("owner")
            .map(parse_profile)
            .unwrap_or_default(),
        location,
        sidecar_edges,
    })
}

// =============================================================================
// Profile
// =============================================================================

/// Decode a user object (either a post's `owner` or a profile lookup's
/// `data.user`) into an [`OwnerProfile`].
pub fn parse_profile(user: &Value) -> OwnerProfile {
    OwnerProfile {
        id: u64_field(user, "/id").or_else(|| u64_field(user, "/pk")).unwrap_or(0),
        username: str_field(user, "/username").unwrap_or_default(),
        full_name: str_field(user, "/full_name").unwrap_or_default(),
        profile_pic_url: str_field(user, "/profile_pic_url_hd")
            .or_else(|| str_field(user, "/profile_pic_url")),
        biography: str_field(user, "/biography").unwrap_or_default(),
        external_url: str_field(user, "/external_url"),
        is_private: bool_field(user, "/is_private"),
        is_verified: bool_field(user, "/is_verified"),
        followers: count_field(user, &["/edge_followed_by/count", "/follower_count"]),
        following: count_field(user, &["/edge_follow/count", "/following_count"]),
        media_count: count_field(
            user,
            &["/edge_owner_to_timeline_media/count", "/media_count"],
        ),
    }
}

// =============================================================================
// Location
// =============================================================================

/// Decode the `location_info` object of a location page.
pub fn parse_location(id: u64, info: &Value) -> Result<Location, FetchError> {
    let name = str_field(info, "/name")
        .ok_or_else(|| FetchError::Other(format!("location {} has no name", id)))?;

    Ok(Location { id, name })
}

// =============================================================================
// Sidecar
// =============================================================================

/// Decode one `edge_sidecar_to_children` edge.
pub fn parse_sidecar_edge(index: usize, edge: &Value) -> Result<SidecarNode, FetchError> {
    let node = edge
        .get("node")
        .ok_or_else(|| FetchError::Other(format!("sidecar edge {} has no node", index)))?;

    let is_video = node
        .get("is_video")
        .and_then(Value::as_bool)
        .ok_or_else(|| FetchError::Other(format!("sidecar node {} has no is_video", index)))?;

    let display_url = str_field(node, "/display_url")
        .ok_or_else(|| FetchError::Other(format!("sidecar node {} has no display_url", index)))?;

    let video_url = if is_video {
        Some(str_field(node, "/video_url").ok_or_else(|| {
            FetchError::Other(format!("sidecar node {} has no video_url", index))
        })?)
    } else {
        None
    };

    Ok(SidecarNode {
        is_video,
        display_url,
        video_url,
    })
}
