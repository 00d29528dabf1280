//! REST client for the video platform's Data API.
//!
//! Each method maps to one endpoint call. Authentication is a bearer token
//! obtained by [`crate::auth::Authenticator`]; the client never refreshes it,
//! since a single run is far shorter than a token's lifetime.

use async_trait::async_trait;
use catalog::{
    CandidateVideo, Channel, Page, PlaylistSummary, ResourceRef, Subscription, VideoDetails,
};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::error::{PlatformError, Result};
use crate::responses::{
    ChannelResource, ListResponse, PlaylistItemInsert, PlaylistItemResource, PlaylistResource,
    SubscriptionResource, VideoResource,
};
use crate::{VideoPlatform, MAX_PAGE_SIZE};

/// Base URL of the public API
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the platform's REST API.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl YouTubeClient {
    /// Create a client that authenticates every call with `access_token`.
    pub fn new(http: reqwest::Client, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at a different API root (used for tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// GET a list endpoint and decode its envelope.
    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<ListResponse<T>> {
        let response = self
            .http
            .request(Method::GET, self.url(resource))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;
        let response = ensure_success(resource, response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| PlatformError::InvalidResponse(format!("{resource}: {e}")))
    }
}

/// Turn a non-2xx response into [`PlatformError::Api`], logging the body.
async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    error!(operation, status = status.as_u16(), %body, "platform request failed");
    Err(PlatformError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    #[instrument(skip(self))]
    async fn list_subscriptions(&self, page_token: Option<&str>) -> Result<Page<Subscription>> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("mine", "true".to_string()),
            ("maxResults", MAX_PAGE_SIZE.to_string()),
            ("order", "alphabetical".to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response: ListResponse<SubscriptionResource> =
            self.list("subscriptions", &query).await?;
        debug!(
            "Fetched {} subscriptions (more pages: {})",
            response.items.len(),
            response.next_page_token.is_some()
        );
        Ok(Page {
            items: response.items.into_iter().map(Subscription::from).collect(),
            next_page_token: response.next_page_token,
        })
    }

    #[instrument(skip(self))]
    async fn channel(&self, channel_id: &str) -> Result<Channel> {
        let query = [
            ("part", "contentDetails,snippet".to_string()),
            ("id", channel_id.to_string()),
            ("maxResults", "1".to_string()),
        ];
        let response: ListResponse<ChannelResource> = self.list("channels", &query).await?;
        response
            .items
            .into_iter()
            .next()
            .map(Channel::from)
            .ok_or_else(|| PlatformError::not_found("channel", channel_id))
    }

    #[instrument(skip(self))]
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<Vec<CandidateVideo>> {
        let query = [
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", max_results.min(MAX_PAGE_SIZE).to_string()),
        ];
        let response: ListResponse<PlaylistItemResource> =
            self.list("playlistItems", &query).await?;

        let total = response.items.len();
        let candidates: Vec<CandidateVideo> = response
            .items
            .into_iter()
            .filter_map(PlaylistItemResource::into_candidate)
            .collect();
        if candidates.len() != total {
            debug!(
                "Skipped {} entries without a publish time in {}",
                total - candidates.len(),
                playlist_id
            );
        }
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn video_details(&self, video_id: &str) -> Result<VideoDetails> {
        let query = [
            (
                "part",
                "contentDetails,snippet,status,liveStreamingDetails".to_string(),
            ),
            ("id", video_id.to_string()),
            ("maxResults", "1".to_string()),
        ];
        let response: ListResponse<VideoResource> = self.list("videos", &query).await?;
        let resource = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::not_found("video", video_id))?;
        Ok(VideoDetails::try_from(resource)?)
    }

    #[instrument(skip(self))]
    async fn list_my_playlists(&self, max_results: u32) -> Result<Vec<PlaylistSummary>> {
        let query = [
            ("part", "id,snippet".to_string()),
            ("mine", "true".to_string()),
            ("maxResults", max_results.min(MAX_PAGE_SIZE).to_string()),
        ];
        let response: ListResponse<PlaylistResource> = self.list("playlists", &query).await?;
        Ok(response.items.into_iter().map(PlaylistSummary::from).collect())
    }

    #[instrument(skip(self, resource), fields(video_id = %resource.video_id))]
    async fn insert_playlist_item(&self, playlist_id: &str, resource: &ResourceRef) -> Result<()> {
        let response = self
            .http
            .post(self.url("playlistItems"))
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet")])
            .json(&PlaylistItemInsert::new(playlist_id, resource))
            .send()
            .await?;
        ensure_success("playlistItems.insert", response).await?;
        debug!("Inserted {} into {}", resource.video_id, playlist_id);
        Ok(())
    }
}
