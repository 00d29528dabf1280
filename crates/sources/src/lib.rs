//! # Sources Crate
//!
//! The network-bound stages of a curation run. Each stage talks to the
//! platform through a shared `Arc<dyn VideoPlatform>`.
//!
//! ## Components
//!
//! ### Subscription Enumerator
//! Follows the subscriptions cursor until the platform reports no further
//! pages.
//!
//! ### Upload Resolver
//! For every subscribed channel: channel lookup, then the newest 50 entries
//! of its uploads playlist. Channels are resolved concurrently.
//!
//! ### Metadata Enricher
//! Fetches duration, tags, privacy and live state for each in-window
//! candidate. Videos are enriched concurrently.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{MetadataEnricher, RunContext, SubscriptionEnumerator, UploadResolver};
//!
//! let context = RunContext::new(Utc::now(), watermark);
//! let subscriptions = SubscriptionEnumerator::new(platform.clone()).collect_all().await?;
//! let uploads = UploadResolver::new(platform.clone()).resolve(&subscriptions).await?;
//! // ... time-window filter ...
//! let enriched = MetadataEnricher::new(platform.clone()).enrich(in_window).await?;
//! ```

pub mod enrichment;
pub mod run_context;
pub mod subscriptions;
pub mod uploads;

pub use enrichment::MetadataEnricher;
pub use run_context::{default_window_start, RunContext, DEFAULT_LOOKBACK_HOURS};
pub use subscriptions::SubscriptionEnumerator;
pub use uploads::{ResolvedUploads, UploadResolver, UPLOADS_PER_CHANNEL};
