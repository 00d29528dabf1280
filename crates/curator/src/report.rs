//! Summary of a single curation run.

use catalog::ChannelId;
use chrono::{DateTime, Utc};

/// Counts per stage plus the outcome for the watermark
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub now: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub subscriptions: usize,
    pub skipped_channels: Vec<ChannelId>,
    /// Recent uploads across all channels, before the time window
    pub candidates: usize,
    pub in_window: usize,
    /// Public, non-live videos among those in the window
    pub public: usize,
    /// Survivors of the channel rules
    pub kept: usize,
    pub routed_to_subscriptions: usize,
    pub routed_to_car: usize,
    pub inserted: usize,
    pub dry_run: bool,
    /// Value written to the watermark store, if it moved
    pub new_watermark: Option<DateTime<Utc>>,
}

impl RunReport {
    pub(crate) fn new(now: DateTime<Utc>, window_start: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            now,
            window_start,
            dry_run,
            ..Self::default()
        }
    }
}
