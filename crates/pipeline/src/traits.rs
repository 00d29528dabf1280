//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to the videos of a run.

use anyhow::Result;
use sources::RunContext;

/// Core trait for filtering items of type `T`.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across tasks
/// - Filters take ownership of the Vec and return the kept items, in their
///   original relative order
pub trait Filter<T>: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of items.
    ///
    /// # Arguments
    /// * `items` - The items to filter (takes ownership)
    /// * `context` - Time window of the current run
    fn apply(&self, items: Vec<T>, context: &RunContext) -> Result<Vec<T>>;
}
