//! Platform client
//!
//! Everything the curator needs from the video platform sits behind the
//! [`VideoPlatform`] trait:
//! - subscriptions of the authenticated user, one page at a time
//! - a channel's uploads playlist
//! - the most recent entries of a playlist
//! - per-video metadata (duration, tags, privacy, live state)
//! - the user's own playlists, and inserting into them
//!
//! [`YouTubeClient`] implements it over HTTPS; [`Authenticator`] obtains the
//! bearer token it needs. With the `testing` feature an in-memory
//! implementation is available for the other crates' tests.

pub mod auth;
pub mod client;
pub mod error;
mod responses;

#[cfg(feature = "testing")]
pub mod memory;

use async_trait::async_trait;
use catalog::{
    CandidateVideo, Channel, Page, PlaylistSummary, ResourceRef, Subscription, VideoDetails,
};

pub use auth::{Authenticator, ClientSecret, StoredToken, YOUTUBE_SCOPE};
pub use client::{YouTubeClient, DEFAULT_API_BASE_URL};
pub use error::{PlatformError, Result};

/// Largest page size any list endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 50;

/// Operations the curator performs against the video platform.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// One page of the user's subscriptions, up to [`MAX_PAGE_SIZE`] entries.
    async fn list_subscriptions(&self, page_token: Option<&str>) -> Result<Page<Subscription>>;

    /// Channel metadata including its uploads playlist.
    ///
    /// Fails with [`PlatformError::NotFound`] when the channel does not exist.
    async fn channel(&self, channel_id: &str) -> Result<Channel>;

    /// The newest `max_results` entries of a playlist.
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<Vec<CandidateVideo>>;

    async fn video_details(&self, video_id: &str) -> Result<VideoDetails>;

    /// The first `max_results` playlists owned by the user.
    async fn list_my_playlists(&self, max_results: u32) -> Result<Vec<PlaylistSummary>>;

    async fn insert_playlist_item(&self, playlist_id: &str, resource: &ResourceRef) -> Result<()>;
}
