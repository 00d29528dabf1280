//! Wire shapes of the platform's JSON resources.
//!
//! Only the fields the curator reads are declared; everything else in the
//! payload is ignored by serde. Conversions into `catalog` types live here so
//! the client methods stay small.

use catalog::{
    CandidateVideo, Channel, LiveBroadcastContent, LiveStreamingDetails, PlaylistSummary,
    PrivacyStatus, ResourceRef, Subscription, VideoDetails,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope shared by every `*.list` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

// =============================================================================
// subscriptions.list
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionResource {
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionSnippet {
    pub title: String,
    pub resource_id: ChannelResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelResourceId {
    pub channel_id: String,
}

impl From<SubscriptionResource> for Subscription {
    fn from(resource: SubscriptionResource) -> Self {
        Subscription {
            channel_id: resource.snippet.resource_id.channel_id,
            title: resource.snippet.title,
        }
    }
}

// =============================================================================
// channels.list
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelResource {
    pub id: String,
    pub snippet: TitleSnippet,
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TitleSnippet {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelatedPlaylists {
    pub uploads: String,
}

impl From<ChannelResource> for Channel {
    fn from(resource: ChannelResource) -> Self {
        Channel {
            id: resource.id,
            title: resource.snippet.title,
            uploads_playlist_id: resource.content_details.related_playlists.uploads,
        }
    }
}

// =============================================================================
// playlistItems.list / playlistItems.insert
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemResource {
    pub snippet: PlaylistItemSnippet,
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemSnippet {
    pub title: String,
    pub channel_title: String,
    pub resource_id: VideoResourceId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoResourceId {
    pub kind: String,
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemContentDetails {
    pub video_id: String,
    /// Absent for private or deleted entries
    pub video_published_at: Option<DateTime<Utc>>,
}

impl PlaylistItemResource {
    /// `None` when the entry has no publish time and so can never be in a window
    pub fn into_candidate(self) -> Option<CandidateVideo> {
        let published_at = self.content_details.video_published_at?;
        Some(CandidateVideo {
            video_id: self.content_details.video_id,
            channel_title: self.snippet.channel_title,
            published_at,
            title: self.snippet.title,
            resource: ResourceRef {
                kind: self.snippet.resource_id.kind,
                video_id: self.snippet.resource_id.video_id,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaylistItemInsert {
    pub snippet: PlaylistItemInsertSnippet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemInsertSnippet {
    pub playlist_id: String,
    pub resource_id: VideoResourceId,
}

impl PlaylistItemInsert {
    pub fn new(playlist_id: &str, resource: &ResourceRef) -> Self {
        Self {
            snippet: PlaylistItemInsertSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: VideoResourceId {
                    kind: resource.kind.clone(),
                    video_id: resource.video_id.clone(),
                },
            },
        }
    }
}

// =============================================================================
// videos.list
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoResource {
    pub snippet: VideoSnippet,
    pub content_details: VideoContentDetails,
    pub status: VideoStatus,
    pub live_streaming_details: Option<LiveStreamingDetailsResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub live_broadcast_content: LiveBroadcastContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoContentDetails {
    pub duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoStatus {
    pub privacy_status: PrivacyStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LiveStreamingDetailsResource {
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
}

impl TryFrom<VideoResource> for VideoDetails {
    type Error = catalog::CatalogError;

    fn try_from(resource: VideoResource) -> Result<Self, Self::Error> {
        Ok(VideoDetails {
            duration_minutes: catalog::parse_duration_minutes(&resource.content_details.duration)?,
            tags: resource.snippet.tags,
            privacy_status: resource.status.privacy_status,
            live_broadcast_content: resource.snippet.live_broadcast_content,
            live_streaming_details: resource.live_streaming_details.map(|details| {
                LiveStreamingDetails {
                    actual_start_time: details.actual_start_time,
                    actual_end_time: details.actual_end_time,
                    scheduled_start_time: details.scheduled_start_time,
                }
            }),
        })
    }
}

// =============================================================================
// playlists.list
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistResource {
    pub id: String,
    pub snippet: TitleSnippet,
}

impl From<PlaylistResource> for PlaylistSummary {
    fn from(resource: PlaylistResource) -> Self {
        PlaylistSummary {
            id: resource.id,
            title: resource.snippet.title,
        }
    }
}
