//! Per-channel editorial rules.
//!
//! One static table maps a channel title to a keep predicate. Channels
//! without an entry always pass. A predicate sees the fully enriched video
//! and nothing else, so the decision is a pure function of channel title,
//! title text, tags, duration and streaming details.
//!
//! Title checks are case-insensitive substring tests. Tag checks are
//! case-sensitive membership tests; where both spellings matter, both are
//! listed.

use crate::traits::Filter;
use anyhow::Result;
use catalog::EnrichedVideo;
use rayon::prelude::*;
use regex::Regex;
use sources::RunContext;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Keep predicate for one channel
pub type ChannelRule = fn(&EnrichedVideo) -> bool;

/// A four-digit year in the 2000s anywhere in a title
static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20\d\d").expect("year pattern is valid"));

const RAP_TAGS: &[&str] = &["rap", "hip hop"];

const SHORT_CIRCUIT_HARDWARE_TAGS: &[&str] = &[
    "keyboard",
    "mouse",
    "headphones",
    "monitor",
    "laptop",
    "phone",
    "smartphone",
    "tablet",
    "speaker",
    "webcam",
    "microphone",
];

const OTHER_FIGHTING_GAMES: &[&str] = &[
    "street fighter",
    "tekken",
    "mortal kombat",
    "guilty gear",
    "dragon ball fighterz",
    "granblue",
    "marvel vs capcom",
    "soulcalibur",
    "king of fighters",
    "blazblue",
    "dead or alive",
    "under night",
    "skullgirls",
];

const PAKMAN_MAX_MINUTES: f64 = 11.0;

const PAKMAN_EXCLUDED_TERMS: &[&str] = &[
    "trump",
    "biden",
    "election",
    "republican",
    "democrat",
    "gop",
    "senate",
    "congress",
    "impeachment",
];

const LTT_EXCLUDED_TITLE_TERMS: &[&str] = &["tech upgrade", "tech makeover"];

const LTT_EXCLUDED_TAGS: &[&str] = &[
    "tech upgrade",
    "Tech Upgrade",
    "tech makeover",
    "Tech Makeover",
];

// =============================================================================
// Predicate helpers
// =============================================================================

fn lower_title(video: &EnrichedVideo) -> String {
    video.title().to_lowercase()
}

fn title_contains(video: &EnrichedVideo, needle: &str) -> bool {
    lower_title(video).contains(needle)
}

fn title_contains_any(video: &EnrichedVideo, needles: &[&str]) -> bool {
    let title = lower_title(video);
    needles.iter().any(|needle| title.contains(needle))
}

fn title_starts_with_any(video: &EnrichedVideo, prefixes: &[&str]) -> bool {
    let title = lower_title(video);
    prefixes.iter().any(|prefix| title.starts_with(prefix))
}

/// False for a video without tags
fn has_any_tag(video: &EnrichedVideo, tags: &[&str]) -> bool {
    tags.iter().any(|tag| video.has_tag(tag))
}

// =============================================================================
// Rules
// =============================================================================

fn theneedledrop(video: &EnrichedVideo) -> bool {
    title_contains(video, "review") && has_any_tag(video, RAP_TAGS)
}

fn fantano(video: &EnrichedVideo) -> bool {
    (title_contains(video, "memes") || has_any_tag(video, RAP_TAGS))
        && !YEAR_TOKEN.is_match(video.title())
}

fn nfl(video: &EnrichedVideo) -> bool {
    title_contains(video, "mic'd up")
}

fn arlo(video: &EnrichedVideo) -> bool {
    !title_contains_any(video, &["news roundup", "predict", "wishlist", "splatoon"])
}

fn linus_tech_tips(video: &EnrichedVideo) -> bool {
    !title_contains_any(video, LTT_EXCLUDED_TITLE_TERMS) && !has_any_tag(video, LTT_EXCLUDED_TAGS)
}

fn short_circuit(video: &EnrichedVideo) -> bool {
    !has_any_tag(video, SHORT_CIRCUIT_HARDWARE_TAGS)
}

fn first_we_feast(video: &EnrichedVideo) -> bool {
    title_contains(video, "hot ones")
}

fn maximilian_dood(video: &EnrichedVideo) -> bool {
    !title_contains_any(video, OTHER_FIGHTING_GAMES)
        && !has_any_tag(video, OTHER_FIGHTING_GAMES)
        && !title_contains(video, "matches")
        && !video.has_tag("matches")
}

fn simply(video: &EnrichedVideo) -> bool {
    title_contains_any(video, &["sm64", "mario 64"])
}

fn styles_x2(video: &EnrichedVideo) -> bool {
    title_contains(video, "ultimate salt is real")
}

fn dota_cinema(video: &EnrichedVideo) -> bool {
    title_contains(video, "fails of the week")
}

fn pittsburgh_steelers(video: &EnrichedVideo) -> bool {
    title_contains(video, "conference")
}

fn dota_shaman(video: &EnrichedVideo) -> bool {
    title_starts_with_any(video, &["arteezy", "mason"])
}

fn david_pakman_show(video: &EnrichedVideo) -> bool {
    video.duration_minutes() < PAKMAN_MAX_MINUTES
        && !title_contains_any(video, PAKMAN_EXCLUDED_TERMS)
        && !has_any_tag(video, PAKMAN_EXCLUDED_TERMS)
}

fn werster(video: &EnrichedVideo) -> bool {
    !title_contains(video, "sonic")
}

fn brett_kollman(video: &EnrichedVideo) -> bool {
    !title_contains(video, "nfl draft")
}

fn kurzgesagt(video: &EnrichedVideo) -> bool {
    !title_contains_any(video, &["virus", "body", "space"])
}

fn dorkly(video: &EnrichedVideo) -> bool {
    !title_contains(video, "compilation")
}

fn geo_wizard(video: &EnrichedVideo) -> bool {
    video.has_tag("geoguessr") && !title_contains(video, "play along")
}

fn pro_jared(video: &EnrichedVideo) -> bool {
    !title_contains(video, "now in the 90s")
}

/// Streamers whose VODs are skipped; only regular uploads are kept
fn not_a_stream(video: &EnrichedVideo) -> bool {
    !video.was_streamed()
}

fn always(_video: &EnrichedVideo) -> bool {
    true
}

fn lythero(video: &EnrichedVideo) -> bool {
    !title_contains_any(
        video,
        &["half-life", "half life", "shadow the hedgehog", "l4d2"],
    )
}

// =============================================================================
// Table
// =============================================================================

/// Channel title to keep predicate. At most one rule per title.
#[derive(Clone, Default)]
pub struct ChannelRuleTable {
    rules: HashMap<&'static str, ChannelRule>,
}

impl ChannelRuleTable {
    /// A table with no rules; every video passes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The curated rule set.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule("theneedledrop", theneedledrop)
            .with_rule("fantano", fantano)
            .with_rule("NFL", nfl)
            .with_rule("Arlo", arlo)
            .with_rule("Linus Tech Tips", linus_tech_tips)
            .with_rule("ShortCircuit", short_circuit)
            .with_rule("First We Feast", first_we_feast)
            .with_rule("Maximilian Dood", maximilian_dood)
            .with_rule("Simply", simply)
            .with_rule("StylesX2", styles_x2)
            .with_rule("DotaCinema", dota_cinema)
            .with_rule("Pittsburgh Steelers", pittsburgh_steelers)
            .with_rule("Dota Shaman", dota_shaman)
            .with_rule("David Pakman Show", david_pakman_show)
            .with_rule("Werster", werster)
            .with_rule("Brett Kollman", brett_kollman)
            .with_rule("Kurzgesagt \u{2013} In a Nutshell", kurzgesagt)
            .with_rule("Dorkly", dorkly)
            .with_rule("GeoWizard", geo_wizard)
            .with_rule("ProJared", pro_jared)
            .with_rule("Ludwig", not_a_stream)
            .with_rule("Destiny", not_a_stream)
            .with_rule("Atrioc", always)
            .with_rule("Lythero", lythero)
    }

    /// Add or replace the rule for `channel_title` (builder pattern).
    pub fn with_rule(mut self, channel_title: &'static str, rule: ChannelRule) -> Self {
        self.rules.insert(channel_title, rule);
        self
    }

    /// Exact, case-sensitive lookup on the channel title.
    pub fn rule_for(&self, channel_title: &str) -> Option<ChannelRule> {
        self.rules.get(channel_title).copied()
    }

    /// Apply the channel's rule, or keep the video when none exists.
    pub fn keeps(&self, video: &EnrichedVideo) -> bool {
        self.rule_for(video.channel_title())
            .is_none_or(|rule| rule(video))
    }

    /// Channel titles that have a rule, sorted.
    pub fn channels(&self) -> Vec<&'static str> {
        let mut channels: Vec<&'static str> = self.rules.keys().copied().collect();
        channels.sort_unstable();
        channels
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Applies a [`ChannelRuleTable`] to every video.
pub struct ChannelRuleFilter {
    table: ChannelRuleTable,
}

impl ChannelRuleFilter {
    pub fn new(table: ChannelRuleTable) -> Self {
        Self { table }
    }

    /// Filter backed by [`ChannelRuleTable::standard`]
    pub fn standard() -> Self {
        Self::new(ChannelRuleTable::standard())
    }

    pub fn table(&self) -> &ChannelRuleTable {
        &self.table
    }
}

impl Filter<EnrichedVideo> for ChannelRuleFilter {
    fn name(&self) -> &str {
        "ChannelRuleFilter"
    }

    /// Rules are pure, so evaluating them in parallel keeps the result (and
    /// its order) identical to a sequential pass.
    fn apply(
        &self,
        videos: Vec<EnrichedVideo>,
        _context: &RunContext,
    ) -> Result<Vec<EnrichedVideo>> {
        Ok(videos
            .into_par_iter()
            .filter(|video| {
                let keep = self.table.keeps(video);
                if !keep {
                    debug!(
                        channel = video.channel_title(),
                        title = video.title(),
                        "dropped by channel rule"
                    );
                }
                keep
            })
            .collect())
    }
}
