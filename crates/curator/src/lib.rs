//! Curator crate for the subscription curation run.
//!
//! This crate contains the orchestrator that sequences every stage of a
//! run, the watermark store that carries state between runs, and the
//! report a run produces.

pub mod orchestrator;
pub mod report;
pub mod watermark;

pub use orchestrator::{CurationOrchestrator, OWN_PLAYLIST_LOOKUP, RunOptions};
pub use report::RunReport;
pub use watermark::{DEFAULT_WATERMARK_FILE, WatermarkStore};
