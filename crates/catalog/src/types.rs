//! Core domain types for the subscription feed.
//!
//! A run moves every video through three shapes:
//! - [`CandidateVideo`]: thin record read from a channel's uploads playlist
//! - [`VideoDetails`]: the metadata fetched per video
//! - [`EnrichedVideo`]: the two combined, which is what filters and routing see

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Platform identifier of a channel (`UC...`)
pub type ChannelId = String;

/// Platform identifier of a video
pub type VideoId = String;

/// Platform identifier of a playlist
pub type PlaylistId = String;

// =============================================================================
// Subscriptions and Channels
// =============================================================================

/// A channel the user is subscribed to. Fetched fresh every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub channel_id: ChannelId,
    pub title: String,
}

/// A channel together with the playlist holding all of its uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub title: String,
    pub uploads_playlist_id: PlaylistId,
}

/// One page of a paginated listing.
///
/// `next_page_token` is `None` once the platform reports no further pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation cursor
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// A playlist owned by the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub title: String,
}

// =============================================================================
// Videos
// =============================================================================

/// Reference used when inserting a video into a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: String,
    pub video_id: VideoId,
}

impl ResourceRef {
    pub fn video(video_id: impl Into<VideoId>) -> Self {
        Self {
            kind: "youtube#video".to_string(),
            video_id: video_id.into(),
        }
    }
}

/// A video discovered through a channel's uploads playlist.
///
/// Not yet known to be public, non-live, or wanted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateVideo {
    pub video_id: VideoId,
    /// Title of the channel that owns the video; keys the channel rule table
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub title: String,
    pub resource: ResourceRef,
}

impl CandidateVideo {
    /// Attach fetched metadata, producing the shape filters operate on
    pub fn enrich(self, details: VideoDetails) -> EnrichedVideo {
        EnrichedVideo {
            video: self,
            details,
        }
    }
}

/// Visibility of a video on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Unlisted,
    Private,
    /// Any value the platform adds later; never treated as public
    #[serde(other)]
    Unknown,
}

/// Live state of a video's broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveBroadcastContent {
    /// Regular upload, or a finished stream
    #[default]
    None,
    Live,
    Upcoming,
    #[serde(other)]
    Unknown,
}

impl LiveBroadcastContent {
    /// True for anything other than a plain upload
    pub fn is_live_or_scheduled(self) -> bool {
        !matches!(self, LiveBroadcastContent::None)
    }
}

/// Streaming block the platform attaches to anything that was ever a stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiveStreamingDetails {
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
}

/// Metadata fetched from the canonical video resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    /// Length in fractional minutes
    pub duration_minutes: f64,
    /// Creator-supplied tags; empty when the platform omits them
    #[serde(default)]
    pub tags: Vec<String>,
    pub privacy_status: PrivacyStatus,
    pub live_broadcast_content: LiveBroadcastContent,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

/// A candidate with its metadata attached.
///
/// Every video reaching the visibility, channel rule, and routing stages has
/// this shape, so duration, tags, privacy and live state are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVideo {
    pub video: CandidateVideo,
    pub details: VideoDetails,
}

impl EnrichedVideo {
    pub fn video_id(&self) -> &str {
        &self.video.video_id
    }

    pub fn channel_title(&self) -> &str {
        &self.video.channel_title
    }

    pub fn title(&self) -> &str {
        &self.video.title
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.video.published_at
    }

    pub fn duration_minutes(&self) -> f64 {
        self.details.duration_minutes
    }

    pub fn tags(&self) -> &[String] {
        &self.details.tags
    }

    /// Case-sensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        self.details.tags.iter().any(|t| t == tag)
    }

    /// True when the video is public and neither live nor scheduled
    pub fn is_publicly_watchable(&self) -> bool {
        self.details.privacy_status == PrivacyStatus::Public
            && !self.details.live_broadcast_content.is_live_or_scheduled()
    }

    /// True when the platform attached a live-streaming block
    pub fn was_streamed(&self) -> bool {
        self.details.live_streaming_details.is_some()
    }
}
