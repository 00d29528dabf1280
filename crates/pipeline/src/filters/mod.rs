//! Filter implementations for the curation pipeline.
//!
//! This module contains all the concrete filters, in the order a run
//! applies them.

pub mod channel_rules;
pub mod time_window;
pub mod visibility;

// Re-export for convenience
pub use channel_rules::{ChannelRule, ChannelRuleFilter, ChannelRuleTable};
pub use time_window::TimeWindowFilter;
pub use visibility::VisibilityFilter;
