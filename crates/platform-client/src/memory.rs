//! In-memory [`VideoPlatform`] used by tests across the workspace.
//!
//! Every call is recorded so tests can assert on call counts and ordering,
//! and failures can be injected per subscriptions page, channel or video.

use async_trait::async_trait;
use catalog::{
    CandidateVideo, Channel, Page, PlaylistSummary, ResourceRef, Subscription, VideoDetails,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{PlatformError, Result};
use crate::{VideoPlatform, MAX_PAGE_SIZE};

/// A call observed by [`InMemoryPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    ListSubscriptions { page_token: Option<String> },
    Channel { channel_id: String },
    ListPlaylistItems { playlist_id: String, max_results: u32 },
    VideoDetails { video_id: String },
    ListMyPlaylists { max_results: u32 },
    InsertPlaylistItem { playlist_id: String, video_id: String },
}

/// Fake platform backed by plain collections
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    subscriptions: Vec<Subscription>,
    page_size: Option<usize>,
    channels: HashMap<String, Channel>,
    uploads: HashMap<String, Vec<CandidateVideo>>,
    details: HashMap<String, VideoDetails>,
    playlists: Vec<PlaylistSummary>,
    failing_subscription_pages: HashSet<usize>,
    subscription_cursors: HashMap<Option<String>, String>,
    failing_channels: HashSet<String>,
    failing_inserts: HashSet<String>,
    calls: Mutex<Vec<PlatformCall>>,
    inserted: Mutex<Vec<(String, String)>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve subscriptions in pages of `size` instead of [`MAX_PAGE_SIZE`].
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Fail the request for subscriptions page `page` (1-based).
    pub fn with_failing_subscriptions_page(mut self, page: usize) -> Self {
        self.failing_subscription_pages.insert(page);
        self
    }

    /// Answer the subscriptions request for `page_token` with `next_page_token`
    /// as the continuation, whatever the real next offset is.
    pub fn with_subscriptions_cursor(
        mut self,
        page_token: Option<&str>,
        next_page_token: &str,
    ) -> Self {
        self.subscription_cursors
            .insert(page_token.map(str::to_string), next_page_token.to_string());
        self
    }

    /// Subscribe to a channel whose uploads live in `uploads_playlist_id`.
    pub fn with_channel(
        mut self,
        channel_id: &str,
        title: &str,
        uploads_playlist_id: &str,
    ) -> Self {
        self.subscriptions.push(Subscription {
            channel_id: channel_id.to_string(),
            title: title.to_string(),
        });
        self.channels.insert(
            channel_id.to_string(),
            Channel {
                id: channel_id.to_string(),
                title: title.to_string(),
                uploads_playlist_id: uploads_playlist_id.to_string(),
            },
        );
        self.uploads.entry(uploads_playlist_id.to_string()).or_default();
        self
    }

    /// Subscribe to a channel the platform no longer knows about.
    pub fn with_missing_channel(mut self, channel_id: &str, title: &str) -> Self {
        self.subscriptions.push(Subscription {
            channel_id: channel_id.to_string(),
            title: title.to_string(),
        });
        self
    }

    /// Make every lookup of `channel_id` fail with an API error.
    pub fn with_failing_channel(mut self, channel_id: &str) -> Self {
        self.failing_channels.insert(channel_id.to_string());
        self
    }

    /// Make inserting `video_id` fail with an API error.
    pub fn with_failing_insert(mut self, video_id: &str) -> Self {
        self.failing_inserts.insert(video_id.to_string());
        self
    }

    /// Append an upload to a playlist; entries are served newest-first in
    /// insertion order, so add them newest first.
    pub fn with_upload(mut self, playlist_id: &str, video: CandidateVideo) -> Self {
        self.uploads
            .entry(playlist_id.to_string())
            .or_default()
            .push(video);
        self
    }

    pub fn with_details(mut self, video_id: &str, details: VideoDetails) -> Self {
        self.details.insert(video_id.to_string(), details);
        self
    }

    pub fn with_playlist(mut self, id: &str, title: &str) -> Self {
        self.playlists.push(PlaylistSummary {
            id: id.to_string(),
            title: title.to_string(),
        });
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        lock(&self.calls).clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&PlatformCall) -> bool) -> usize {
        lock(&self.calls).iter().filter(|call| predicate(call)).count()
    }

    /// `(playlist_id, video_id)` pairs inserted so far, in order.
    pub fn inserted(&self) -> Vec<(String, String)> {
        lock(&self.inserted).clone()
    }

    fn record(&self, call: PlatformCall) {
        lock(&self.calls).push(call);
    }

    fn page_size(&self) -> usize {
        self.page_size.unwrap_or(MAX_PAGE_SIZE as usize)
    }
}

/// A panicking test thread must not hide the calls recorded before it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn injected_failure(operation: &str) -> PlatformError {
    PlatformError::Api {
        operation: operation.to_string(),
        status: 500,
        body: "injected failure".to_string(),
    }
}

#[async_trait]
impl VideoPlatform for InMemoryPlatform {
    async fn list_subscriptions(&self, page_token: Option<&str>) -> Result<Page<Subscription>> {
        self.record(PlatformCall::ListSubscriptions {
            page_token: page_token.map(str::to_string),
        });

        let start = match page_token {
            Some(token) => token.parse::<usize>().map_err(|_| PlatformError::Api {
                operation: "subscriptions".to_string(),
                status: 400,
                body: format!("invalid page token {token}"),
            })?,
            None => 0,
        };
        if self.failing_subscription_pages.contains(&(start / self.page_size() + 1)) {
            return Err(injected_failure("subscriptions"));
        }
        let end = (start + self.page_size()).min(self.subscriptions.len());
        let items = self.subscriptions.get(start..end).unwrap_or_default().to_vec();
        let cursor = self.subscription_cursors.get(&page_token.map(str::to_string));
        let next_page_token = match cursor {
            Some(next) => Some(next.clone()),
            None => (end < self.subscriptions.len()).then(|| end.to_string()),
        };

        Ok(Page {
            items,
            next_page_token,
        })
    }

    async fn channel(&self, channel_id: &str) -> Result<Channel> {
        self.record(PlatformCall::Channel {
            channel_id: channel_id.to_string(),
        });
        if self.failing_channels.contains(channel_id) {
            return Err(injected_failure("channels"));
        }
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("channel", channel_id))
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<Vec<CandidateVideo>> {
        self.record(PlatformCall::ListPlaylistItems {
            playlist_id: playlist_id.to_string(),
            max_results,
        });
        let limit = max_results.min(MAX_PAGE_SIZE) as usize;
        self.uploads
            .get(playlist_id)
            .map(|items| items.iter().take(limit).cloned().collect())
            .ok_or_else(|| PlatformError::not_found("playlist", playlist_id))
    }

    async fn video_details(&self, video_id: &str) -> Result<VideoDetails> {
        self.record(PlatformCall::VideoDetails {
            video_id: video_id.to_string(),
        });
        self.details
            .get(video_id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("video", video_id))
    }

    async fn list_my_playlists(&self, max_results: u32) -> Result<Vec<PlaylistSummary>> {
        self.record(PlatformCall::ListMyPlaylists { max_results });
        Ok(self
            .playlists
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn insert_playlist_item(&self, playlist_id: &str, resource: &ResourceRef) -> Result<()> {
        self.record(PlatformCall::InsertPlaylistItem {
            playlist_id: playlist_id.to_string(),
            video_id: resource.video_id.clone(),
        });
        if self.failing_inserts.contains(&resource.video_id) {
            return Err(injected_failure("playlistItems.insert"));
        }
        lock(&self.inserted).push((playlist_id.to_string(), resource.video_id.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriptions_are_paged() {
        let platform = InMemoryPlatform::new()
            .with_page_size(2)
            .with_channel("c1", "One", "u1")
            .with_channel("c2", "Two", "u2")
            .with_channel("c3", "Three", "u3");

        let first = platform.list_subscriptions(None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_page_token.as_deref(), Some("2"));

        let second = platform.list_subscriptions(Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.next_page_token, None);
        assert_eq!(platform.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_subscriptions_page_is_recorded_then_fails() {
        let platform = InMemoryPlatform::new()
            .with_page_size(1)
            .with_channel("c1", "One", "u1")
            .with_channel("c2", "Two", "u2")
            .with_failing_subscriptions_page(2);

        assert!(platform.list_subscriptions(None).await.is_ok());
        let err = platform.list_subscriptions(Some("1")).await.unwrap_err();
        assert!(matches!(err, PlatformError::Api { status: 500, .. }));
        assert_eq!(platform.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_subscriptions_cursor_override() {
        let platform = InMemoryPlatform::new()
            .with_channel("c1", "One", "u1")
            .with_subscriptions_cursor(Some("0"), "0");

        let page = platform.list_subscriptions(Some("0")).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_missing_channel_is_not_found() {
        let platform = InMemoryPlatform::new().with_missing_channel("gone", "Gone");
        let err = platform.channel("gone").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }
}
