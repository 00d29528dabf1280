//! Playlist routing: chronological order plus a duration split.
//!
//! The pure half of the Playlist Router. Building a [`RoutePlan`] does no
//! I/O; the orchestrator performs the inserts.

use catalog::EnrichedVideo;
use chrono::{DateTime, Utc};
use std::fmt;

/// Videos longer than this go to the Car playlist
pub const CAR_THRESHOLD_MINUTES: f64 = 30.0;

/// A destination playlist, identified by its title among the user's own playlists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Up to and including the threshold
    Subscriptions,
    /// Strictly longer than the threshold
    Car,
}

impl Destination {
    pub const ALL: [Destination; 2] = [Destination::Subscriptions, Destination::Car];

    pub fn for_duration(minutes: f64) -> Self {
        if minutes > CAR_THRESHOLD_MINUTES {
            Destination::Car
        } else {
            Destination::Subscriptions
        }
    }

    /// Title of the playlist this destination resolves to
    pub fn playlist_title(self) -> &'static str {
        match self {
            Destination::Subscriptions => "Subscriptions",
            Destination::Car => "Car",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.playlist_title())
    }
}

/// Survivors of a run, sorted and split per destination
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
    subscriptions: Vec<EnrichedVideo>,
    car: Vec<EnrichedVideo>,
}

impl RoutePlan {
    /// Sort `videos` oldest first (ties keep their input order), then split
    /// them by duration.
    pub fn build(mut videos: Vec<EnrichedVideo>) -> Self {
        sort_chronologically(&mut videos);
        let (car, subscriptions): (Vec<_>, Vec<_>) = videos.into_iter().partition(|video| {
            Destination::for_duration(video.duration_minutes()) == Destination::Car
        });
        Self { subscriptions, car }
    }

    /// Videos routed to `destination`, oldest first
    pub fn videos_for(&self, destination: Destination) -> &[EnrichedVideo] {
        match destination {
            Destination::Subscriptions => &self.subscriptions,
            Destination::Car => &self.car,
        }
    }

    /// Destinations that receive at least one video
    pub fn used_destinations(&self) -> impl Iterator<Item = Destination> + '_ {
        Destination::ALL
            .into_iter()
            .filter(|destination| !self.videos_for(*destination).is_empty())
    }

    /// Publish time of the newest routed video; the next watermark
    pub fn latest_published_at(&self) -> Option<DateTime<Utc>> {
        self.subscriptions
            .iter()
            .chain(&self.car)
            .map(EnrichedVideo::published_at)
            .max()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len() + self.car.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stable sort by publish time, oldest first.
pub fn sort_chronologically(videos: &mut [EnrichedVideo]) {
    videos.sort_by_key(EnrichedVideo::published_at);
}
