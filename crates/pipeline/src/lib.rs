//! Filtering and routing of the videos found in a curation run.
//!
//! This crate provides:
//! - A generic Filter trait and FilterPipeline for composing filters
//! - The time-window, visibility and channel-rule filters
//! - Routing of survivors to the Subscriptions or Car playlist
//!
//! ## Architecture
//! The stages run in a fixed order:
//! 1. `TimeWindowFilter` on thin candidates, before any metadata is fetched
//! 2. `VisibilityFilter` then `ChannelRuleFilter` on enriched videos
//! 3. `RoutePlan` sorts the survivors and splits them by duration
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, RoutePlan};
//! use pipeline::filters::*;
//!
//! let in_window = FilterPipeline::new()
//!     .add_filter(TimeWindowFilter)
//!     .apply(candidates, &context)?;
//!
//! // ... enrichment ...
//!
//! let kept = FilterPipeline::new()
//!     .add_filter(VisibilityFilter)
//!     .add_filter(ChannelRuleFilter::standard())
//!     .apply(enriched, &context)?;
//!
//! let plan = RoutePlan::build(kept);
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod routing;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use routing::{CAR_THRESHOLD_MINUTES, Destination, RoutePlan, sort_chronologically};
pub use traits::Filter;

use catalog::{CandidateVideo, EnrichedVideo};
use filters::{ChannelRuleFilter, ChannelRuleTable, TimeWindowFilter, VisibilityFilter};

/// Filters applied to candidates before enrichment
pub fn candidate_pipeline() -> FilterPipeline<CandidateVideo> {
    FilterPipeline::new().add_filter(TimeWindowFilter)
}

/// Filters applied to enriched videos, visibility first
pub fn enriched_pipeline(rules: ChannelRuleTable) -> FilterPipeline<EnrichedVideo> {
    FilterPipeline::new()
        .add_filter(VisibilityFilter)
        .add_filter(ChannelRuleFilter::new(rules))
}
