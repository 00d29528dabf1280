//! # Curation Orchestrator
//!
//! This module coordinates the entire curation run:
//! 1. Load the watermark and fix the run's time window
//! 2. Enumerate subscriptions
//! 3. Resolve each channel's recent uploads (channels in parallel)
//! 4. Keep candidates inside the time window
//! 5. Enrich them with metadata (videos in parallel)
//! 6. Drop non-public or live videos, then apply the channel rules
//! 7. Sort and route by duration
//! 8. Resolve destination playlists and insert one video at a time
//! 9. Advance the watermark
//!
//! Any failure aborts the run before the watermark is written, so the next
//! run covers the same window again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use catalog::{CandidateVideo, EnrichedVideo, PlaylistId};
use pipeline::filters::ChannelRuleTable;
use pipeline::{Destination, FilterPipeline, RoutePlan, candidate_pipeline, enriched_pipeline};
use platform_client::{PlatformError, VideoPlatform};
use sources::{MetadataEnricher, RunContext, SubscriptionEnumerator, UploadResolver};

use crate::report::RunReport;
use crate::watermark::WatermarkStore;

/// How many of the user's own playlists are searched for the destinations
pub const OWN_PLAYLIST_LOOKUP: u32 = 20;

/// Switches for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Go through routing, log the plan, insert nothing, leave the watermark
    pub dry_run: bool,
    /// Skip channels whose uploads cannot be resolved instead of aborting
    pub isolate_channel_failures: bool,
}

/// Main orchestrator that runs the curation pipeline end to end
pub struct CurationOrchestrator {
    platform: Arc<dyn VideoPlatform>,
    enumerator: SubscriptionEnumerator,
    resolver: UploadResolver,
    enricher: MetadataEnricher,
    candidate_filters: FilterPipeline<CandidateVideo>,
    enriched_filters: FilterPipeline<EnrichedVideo>,
    watermark: WatermarkStore,
    options: RunOptions,
}

impl CurationOrchestrator {
    /// Create an orchestrator using the standard channel rules
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        watermark: WatermarkStore,
        options: RunOptions,
    ) -> Self {
        Self::with_rules(platform, watermark, options, ChannelRuleTable::standard())
    }

    pub fn with_rules(
        platform: Arc<dyn VideoPlatform>,
        watermark: WatermarkStore,
        options: RunOptions,
        rules: ChannelRuleTable,
    ) -> Self {
        Self {
            enumerator: SubscriptionEnumerator::new(platform.clone()),
            resolver: UploadResolver::new(platform.clone())
                .with_failure_isolation(options.isolate_channel_failures),
            enricher: MetadataEnricher::new(platform.clone()),
            candidate_filters: candidate_pipeline(),
            enriched_filters: enriched_pipeline(rules),
            platform,
            watermark,
            options,
        }
    }

    /// Run the pipeline once with `now` as the window's upper bound.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let start_time = Instant::now();

        let previous_watermark = self.watermark.load();
        let context = RunContext::new(now, previous_watermark);
        info!(
            "Curating uploads published after {} and before {}{}",
            context.window_start,
            context.now,
            if context.from_watermark { "" } else { " (default window)" }
        );
        let mut report = RunReport::new(context.now, context.window_start, self.options.dry_run);

        let subscriptions = self
            .enumerator
            .collect_all()
            .await
            .context("Failed to enumerate subscriptions")?;
        report.subscriptions = subscriptions.len();

        let uploads = self
            .resolver
            .resolve(&subscriptions)
            .await
            .context("Failed to resolve channel uploads")?;
        report.candidates = uploads.candidates.len();
        report.skipped_channels = uploads.skipped_channels;

        let in_window = self
            .candidate_filters
            .apply(uploads.candidates, &context)
            .context("Failed to apply time window")?;
        report.in_window = in_window.len();
        info!("{} uploads inside the window", in_window.len());

        let enriched = self
            .enricher
            .enrich(in_window)
            .await
            .context("Failed to enrich videos")?;
        report.public = enriched.iter().filter(|v| v.is_publicly_watchable()).count();

        let kept = self
            .enriched_filters
            .apply(enriched, &context)
            .context("Failed to apply filters")?;
        report.kept = kept.len();
        info!(
            "Filtering complete: {} public, {} kept",
            report.public, report.kept
        );

        let plan = RoutePlan::build(kept);
        report.routed_to_subscriptions = plan.videos_for(Destination::Subscriptions).len();
        report.routed_to_car = plan.videos_for(Destination::Car).len();

        if plan.is_empty() {
            info!("No new videos; watermark left unchanged");
            return Ok(report);
        }

        if self.options.dry_run {
            log_plan(&plan);
            info!("Dry run: nothing inserted, watermark left unchanged");
            return Ok(report);
        }

        let playlists = self.resolve_destinations(&plan).await?;
        report.inserted = self.insert_all(&plan, &playlists).await?;

        if let Some(latest) = plan.latest_published_at() {
            report.new_watermark = self
                .watermark
                .advance(previous_watermark, latest)
                .context("Failed to store watermark")?;
        }

        info!(
            "Run complete in {:.2?}: {} inserted",
            start_time.elapsed(),
            report.inserted
        );
        Ok(report)
    }

    /// Look up the playlist id of every destination the plan uses.
    ///
    /// A destination nobody routes to may be missing; one that is needed
    /// fails the run before anything is inserted.
    async fn resolve_destinations(
        &self,
        plan: &RoutePlan,
    ) -> Result<HashMap<Destination, PlaylistId>> {
        let own = self
            .platform
            .list_my_playlists(OWN_PLAYLIST_LOOKUP)
            .await
            .context("Failed to list own playlists")?;

        let mut resolved = HashMap::new();
        for destination in plan.used_destinations() {
            let title = destination.playlist_title();
            let playlist = own
                .iter()
                .find(|p| p.title == title)
                .ok_or_else(|| PlatformError::not_found("playlist", title))?;
            debug!("Destination {} is playlist {}", destination, playlist.id);
            resolved.insert(destination, playlist.id.clone());
        }
        Ok(resolved)
    }

    /// Insert every routed video, strictly one call at a time, oldest first
    /// within each destination.
    async fn insert_all(
        &self,
        plan: &RoutePlan,
        playlists: &HashMap<Destination, PlaylistId>,
    ) -> Result<usize> {
        let mut inserted = 0;
        for (destination, playlist_id) in Destination::ALL
            .into_iter()
            .filter_map(|d| playlists.get(&d).map(|id| (d, id)))
        {
            for video in plan.videos_for(destination) {
                self.platform
                    .insert_playlist_item(playlist_id, &video.video.resource)
                    .await
                    .with_context(|| {
                        format!("Failed to add '{}' to {}", video.title(), destination)
                    })?;
                inserted += 1;
                info!(
                    "Added to {}: {} - {} ({:.1} min)",
                    destination,
                    video.channel_title(),
                    video.title(),
                    video.duration_minutes()
                );
            }
        }
        Ok(inserted)
    }
}

fn log_plan(plan: &RoutePlan) {
    for destination in Destination::ALL {
        for video in plan.videos_for(destination) {
            info!(
                "Would add to {}: {} - {} ({:.1} min, published {})",
                destination,
                video.channel_title(),
                video.title(),
                video.duration_minutes(),
                video.published_at()
            );
        }
    }
}
