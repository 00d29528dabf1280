//! Benchmarks for the channel rule filter
//!
//! Run with: cargo bench --package pipeline

use catalog::{CandidateVideo, EnrichedVideo, LiveBroadcastContent, PrivacyStatus, ResourceRef, VideoDetails};
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline::filters::{ChannelRuleFilter, ChannelRuleTable};
use pipeline::Filter;
use sources::RunContext;

const CHANNELS: &[&str] = &[
    "NFL",
    "Arlo",
    "Linus Tech Tips",
    "Maximilian Dood",
    "David Pakman Show",
    "fantano",
    "Unruled Channel",
    "Destiny",
];

/// A realistic day: a few hundred uploads spread over ruled and unruled channels
fn sample_videos(count: usize) -> Vec<EnrichedVideo> {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let channel = CHANNELS[i % CHANNELS.len()];
            CandidateVideo {
                video_id: format!("video-{i}"),
                channel_title: channel.to_string(),
                published_at: base + Duration::minutes(i as i64),
                title: format!("Episode {i}: Mic'd Up with a Street Fighter review of 2024"),
                resource: ResourceRef::video(format!("video-{i}")),
            }
            .enrich(VideoDetails {
                duration_minutes: (i % 60) as f64,
                tags: vec!["rap".to_string(), "gaming".to_string()],
                privacy_status: PrivacyStatus::Public,
                live_broadcast_content: LiveBroadcastContent::None,
                live_streaming_details: None,
            })
        })
        .collect()
}

fn bench_rule_lookup(c: &mut Criterion) {
    let table = ChannelRuleTable::standard();
    let videos = sample_videos(400);

    c.bench_function("channel_rule_table_keeps", |b| {
        b.iter(|| videos.iter().filter(|v| table.keeps(black_box(v))).count())
    });
}

fn bench_rule_filter(c: &mut Criterion) {
    let filter = ChannelRuleFilter::standard();
    let videos = sample_videos(400);
    let context = RunContext::new(Utc::now(), None);

    c.bench_function("channel_rule_filter_apply", |b| {
        b.iter(|| {
            let kept = filter.apply(black_box(videos.clone()), &context).unwrap();
            black_box(kept)
        })
    });
}

criterion_group!(benches, bench_rule_lookup, bench_rule_filter);
criterion_main!(benches);
