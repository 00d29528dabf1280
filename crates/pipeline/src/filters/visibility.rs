//! Drops anything that is not a finished, public upload.
//!
//! Must run before the channel rules: some rules treat the absence of
//! live-streaming details as "not a stream", which only holds for videos
//! that are no longer live.

use crate::traits::Filter;
use anyhow::Result;
use catalog::EnrichedVideo;
use sources::RunContext;
use tracing::debug;

pub struct VisibilityFilter;

impl Filter<EnrichedVideo> for VisibilityFilter {
    fn name(&self) -> &str {
        "VisibilityFilter"
    }

    fn apply(
        &self,
        videos: Vec<EnrichedVideo>,
        _context: &RunContext,
    ) -> Result<Vec<EnrichedVideo>> {
        Ok(videos
            .into_iter()
            .filter(|video| {
                let keep = video.is_publicly_watchable();
                if !keep {
                    debug!(
                        video_id = video.video_id(),
                        privacy = ?video.details.privacy_status,
                        live = ?video.details.live_broadcast_content,
                        "dropping non-public or live video"
                    );
                }
                keep
            })
            .collect())
    }
}
