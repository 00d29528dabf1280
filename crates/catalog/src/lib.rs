//! # Catalog Crate
//!
//! Domain types shared by every stage of the subscription curator, plus the
//! parsers for the platform's duration and timestamp encodings.
//!
//! ## Main Components
//!
//! - **types**: Subscription, Channel, CandidateVideo, VideoDetails, EnrichedVideo
//! - **parser**: ISO-8601 durations to minutes, RFC 3339 timestamps
//! - **error**: Error types for value parsing

pub mod error;
pub mod types;
pub mod parser;

pub use error::{CatalogError, Result};
pub use parser::{format_timestamp, parse_duration_minutes, parse_timestamp};
pub use types::{
    // Type aliases
    ChannelId,
    VideoId,
    PlaylistId,
    // Core types
    Subscription,
    Channel,
    Page,
    PlaylistSummary,
    ResourceRef,
    CandidateVideo,
    VideoDetails,
    EnrichedVideo,
    LiveStreamingDetails,
    // Enums
    PrivacyStatus,
    LiveBroadcastContent,
};
