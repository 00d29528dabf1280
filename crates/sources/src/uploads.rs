//! Upload Resolver - channel to uploads playlist to recent uploads.
//!
//! Channels are resolved concurrently; results are concatenated in
//! subscription order. By default one failing channel fails the whole
//! resolution. With failure isolation enabled the channel is logged and
//! skipped instead.

use anyhow::{Context, Result};
use catalog::{CandidateVideo, ChannelId, Subscription};
use futures::future::{join_all, try_join_all};
use platform_client::{VideoPlatform, MAX_PAGE_SIZE};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Number of most recent uploads read per channel
pub const UPLOADS_PER_CHANNEL: u32 = 50;

/// Candidates gathered from every channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedUploads {
    pub candidates: Vec<CandidateVideo>,
    /// Channels skipped because their resolution failed
    pub skipped_channels: Vec<ChannelId>,
}

pub struct UploadResolver {
    platform: Arc<dyn VideoPlatform>,
    uploads_per_channel: u32,
    isolate_failures: bool,
}

impl UploadResolver {
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self {
            platform,
            uploads_per_channel: UPLOADS_PER_CHANNEL,
            isolate_failures: false,
        }
    }

    /// Configure how many recent uploads to read per channel (max 50)
    pub fn with_uploads_per_channel(mut self, count: u32) -> Self {
        self.uploads_per_channel = count.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Skip channels whose resolution fails instead of aborting
    pub fn with_failure_isolation(mut self, isolate: bool) -> Self {
        self.isolate_failures = isolate;
        self
    }

    pub async fn resolve(&self, subscriptions: &[Subscription]) -> Result<ResolvedUploads> {
        let lookups = subscriptions.iter().map(|s| self.resolve_channel(s));

        let resolved = if self.isolate_failures {
            let mut resolved = ResolvedUploads::default();
            for (subscription, outcome) in subscriptions.iter().zip(join_all(lookups).await) {
                match outcome {
                    Ok(videos) => resolved.candidates.extend(videos),
                    Err(e) => {
                        warn!("Skipping channel {}: {:#}", subscription.title, e);
                        resolved.skipped_channels.push(subscription.channel_id.clone());
                    }
                }
            }
            resolved
        } else {
            ResolvedUploads {
                candidates: try_join_all(lookups).await?.into_iter().flatten().collect(),
                skipped_channels: Vec::new(),
            }
        };

        info!(
            "Resolved {} recent uploads from {} channels ({} skipped)",
            resolved.candidates.len(),
            subscriptions.len() - resolved.skipped_channels.len(),
            resolved.skipped_channels.len()
        );
        Ok(resolved)
    }

    #[instrument(skip(self, subscription), fields(channel_id = %subscription.channel_id))]
    async fn resolve_channel(&self, subscription: &Subscription) -> Result<Vec<CandidateVideo>> {
        let channel = self
            .platform
            .channel(&subscription.channel_id)
            .await
            .with_context(|| format!("Failed to look up channel '{}'", subscription.title))?;
        let videos = self
            .platform
            .list_playlist_items(&channel.uploads_playlist_id, self.uploads_per_channel)
            .await
            .with_context(|| format!("Failed to list uploads of '{}'", subscription.title))?;
        debug!("{}: {} recent uploads", channel.title, videos.len());
        Ok(videos)
    }
}
