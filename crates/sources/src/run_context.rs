//! Per-run context shared by every stage.

use chrono::{DateTime, Duration, Utc};

/// How far back the first run looks when no watermark has been stored yet
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// The time window a single run operates on.
///
/// `now` is captured once when the run starts and never re-read, so a video
/// published while the run is in progress lands in exactly one run's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Exclusive upper bound of the window
    pub now: DateTime<Utc>,
    /// Exclusive lower bound of the window
    pub window_start: DateTime<Utc>,
    /// Whether `window_start` came from a stored watermark
    pub from_watermark: bool,
}

impl RunContext {
    /// Build the context for a run starting at `now`.
    ///
    /// Without a watermark the window starts [`DEFAULT_LOOKBACK_HOURS`] before `now`.
    pub fn new(now: DateTime<Utc>, watermark: Option<DateTime<Utc>>) -> Self {
        match watermark {
            Some(watermark) => Self {
                now,
                window_start: watermark,
                from_watermark: true,
            },
            None => Self {
                now,
                window_start: default_window_start(now),
                from_watermark: false,
            },
        }
    }

    /// Strictly after the window start and strictly before `now`.
    pub fn contains(&self, published_at: DateTime<Utc>) -> bool {
        published_at > self.window_start && published_at < self.now
    }
}

pub fn default_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(DEFAULT_LOOKBACK_HOURS)
}
