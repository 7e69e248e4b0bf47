//! JSON projection of a fetched post.

use serde::Serialize;

use crate::instagram::{OwnerProfile, PostRecord, SidecarNode};

/// Fields that must be non-empty for a lookup to count as successful.
pub const REQUIRED_FIELDS: [&str; 3] = ["shortcode", "media_id", "thumbnail_url"];

/// Post metadata as returned in the `data` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub shortcode: String,
    pub media_id: Option<u64>,
    pub is_video: bool,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    /// ISO-8601 UTC, e.g. `2024-05-01T12:00:00Z`
    pub timestamp: Option<String>,
    pub likes: u64,
    pub comments: u64,
    pub post_type: String,
    pub carousel_media: Vec<CarouselItem>,
    pub location: Option<String>,
    pub owner_info: OwnerInfo,
}

/// One carousel item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselItem {
    pub is_video: bool,
    pub url: String,
}

impl From<&SidecarNode> for CarouselItem {
    fn from(node: &SidecarNode) -> Self {
        Self {
            is_video: node.is_video,
            url: node.url().to_string(),
        }
    }
}

/// Owner profile as returned in `data.owner_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerInfo {
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

impl From<&OwnerProfile> for OwnerInfo {
    fn from(owner: &OwnerProfile) -> Self {
        Self {
            id: owner.id,
            username: owner.username.clone(),
            full_name: owner.full_name.clone(),
            profile_pic_url: owner.profile_pic_url.clone(),
            biography: owner.biography.clone(),
            external_url: owner.external_url.clone(),
            is_private: owner.is_private,
            is_verified: owner.is_verified,
            followers: owner.followers,
            following: owner.following,
            media_count: owner.media_count,
        }
    }
}

impl PostView {
    /// Project a post record.
    ///
    /// `location` and `carousel_media` start out empty; they are filled in by
    /// the enrichment steps.
    pub fn from_record(post: &PostRecord) -> Self {
        let (video_url, image_url) = if post.is_video {
            (post.video_url.clone(), None)
        } else {
            (None, post.display_url.clone())
        };

        Self {
            shortcode: post.shortcode.clone(),
            media_id: post.media_id,
            is_video: post.is_video,
            video_url,
            image_url,
            thumbnail_url: post.thumbnail_url.clone(),
            caption: post.caption.clone(),
            hashtags: post.caption_hashtags(),
            mentions: post.caption_mentions(),
            timestamp: post
                .taken_at
                .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            likes: post.likes,
            comments: post.comments,
            post_type: post.post_type.as_str().to_string(),
            carousel_media: Vec::new(),
            location: None,
            owner_info: OwnerInfo::from(&post.owner),
        }
    }

    /// Names of required fields that are empty, in [`REQUIRED_FIELDS`] order.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let present = [
            !self.shortcode.is_empty(),
            self.media_id.is_some_and(|id| id != 0),
            self.thumbnail_url.as_deref().is_some_and(|u| !u.is_empty()),
        ];

        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect()
    }
}
