//! Metadata Enricher - attaches duration, tags, privacy and live state.
//!
//! Enrichment is total: every candidate either comes back enriched or the
//! stage fails. Filters downstream never see a half-populated video.

use anyhow::{Context, Result};
use catalog::{CandidateVideo, EnrichedVideo};
use futures::future::try_join_all;
use platform_client::VideoPlatform;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct MetadataEnricher {
    platform: Arc<dyn VideoPlatform>,
}

impl MetadataEnricher {
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self { platform }
    }

    /// Fetch metadata for all candidates concurrently, preserving input order.
    pub async fn enrich(&self, candidates: Vec<CandidateVideo>) -> Result<Vec<EnrichedVideo>> {
        let count = candidates.len();
        let enriched = try_join_all(candidates.into_iter().map(|c| self.enrich_one(c))).await?;
        info!("Enriched {} videos", count);
        Ok(enriched)
    }

    #[instrument(skip(self, candidate), fields(video_id = %candidate.video_id))]
    async fn enrich_one(&self, candidate: CandidateVideo) -> Result<EnrichedVideo> {
        let details = self
            .platform
            .video_details(&candidate.video_id)
            .await
            .with_context(|| format!("Failed to fetch details of video {}", candidate.video_id))?;
        Ok(candidate.enrich(details))
    }
}
