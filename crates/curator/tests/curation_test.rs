//! End-to-end runs of the orchestrator against the in-memory platform.

use std::sync::Arc;

use catalog::{
    CandidateVideo, LiveBroadcastContent, PrivacyStatus, ResourceRef, VideoDetails,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use curator::{CurationOrchestrator, RunOptions, WatermarkStore};
use pipeline::filters::ChannelRuleTable;
use platform_client::PlatformError;
use platform_client::memory::{InMemoryPlatform, PlatformCall};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn upload(id: &str, channel: &str, title: &str, published_at: DateTime<Utc>) -> CandidateVideo {
    CandidateVideo {
        video_id: id.to_string(),
        channel_title: channel.to_string(),
        published_at,
        title: title.to_string(),
        resource: ResourceRef::video(id),
    }
}

fn public(minutes: f64) -> VideoDetails {
    VideoDetails {
        duration_minutes: minutes,
        tags: Vec::new(),
        privacy_status: PrivacyStatus::Public,
        live_broadcast_content: LiveBroadcastContent::None,
        live_streaming_details: None,
    }
}

fn with_destinations(platform: InMemoryPlatform) -> InMemoryPlatform {
    platform
        .with_playlist("PLwatch", "Watch Later Someday")
        .with_playlist("PLsubs", "Subscriptions")
        .with_playlist("PLcar", "Car")
}

/// A watermark store in a fresh temp dir, seeded with `watermark` when given
fn store(watermark: Option<DateTime<Utc>>) -> (TempDir, WatermarkStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = WatermarkStore::new(dir.path().join("latestVideoTimestamp.txt"));
    if let Some(watermark) = watermark {
        store.save(watermark).unwrap();
    }
    (dir, store)
}

fn inserted(platform: &InMemoryPlatform) -> Vec<(String, String)> {
    platform.inserted()
}

fn pair(playlist: &str, video: &str) -> (String, String) {
    (playlist.to_string(), video.to_string())
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_untracked_channel_and_nfl_rule_end_to_end() {
    let yesterday = now() - Duration::days(1);
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_channel("UCa", "Channel A", "UUa")
            .with_channel("UCnfl", "NFL", "UUnfl")
            .with_upload("UUa", upload("a1", "Channel A", "Weekly Update", now() - Duration::hours(2)))
            .with_upload("UUnfl", upload("n2", "NFL", "Full Game Highlights", now() - Duration::hours(3)))
            .with_upload("UUnfl", upload("n1", "NFL", "Mic'd Up: Best Moments", now() - Duration::hours(5)))
            .with_upload("UUnfl", upload("n0", "NFL", "Mic'd Up: Old", now() - Duration::days(3)))
            .with_details("a1", public(10.0))
            .with_details("n1", public(8.0))
            .with_details("n2", public(40.0)),
    ));
    let (_dir, watermark) = store(Some(yesterday));

    let orchestrator =
        CurationOrchestrator::new(platform.clone(), watermark.clone(), RunOptions::default());
    let report = orchestrator.run(now()).await.unwrap();

    assert_eq!(
        inserted(&platform),
        vec![pair("PLsubs", "n1"), pair("PLsubs", "a1")]
    );
    assert_eq!(report.subscriptions, 2);
    assert_eq!(report.candidates, 4);
    assert_eq!(report.in_window, 3);
    assert_eq!(report.public, 3);
    assert_eq!(report.kept, 2);
    assert_eq!(report.routed_to_subscriptions, 2);
    assert_eq!(report.routed_to_car, 0);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.window_start, yesterday);

    let latest = now() - Duration::hours(2);
    assert_eq!(report.new_watermark, Some(latest));
    assert_eq!(watermark.load(), Some(latest));

    // Only in-window videos are enriched
    assert_eq!(
        platform.count_calls(|call| matches!(call, PlatformCall::VideoDetails { .. })),
        3
    );
}

#[tokio::test]
async fn test_empty_subscriptions_make_one_call_and_keep_watermark() {
    let platform = Arc::new(with_destinations(InMemoryPlatform::new()));
    let previous = now() - Duration::hours(7);
    let (_dir, watermark) = store(Some(previous));

    let report = CurationOrchestrator::new(platform.clone(), watermark.clone(), RunOptions::default())
        .run(now())
        .await
        .unwrap();

    assert_eq!(
        platform.calls(),
        vec![PlatformCall::ListSubscriptions { page_token: None }]
    );
    assert!(inserted(&platform).is_empty());
    assert_eq!(report.new_watermark, None);
    assert_eq!(watermark.load(), Some(previous));
}

#[tokio::test]
async fn test_first_run_without_watermark_uses_one_day_window() {
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_channel("UCw", "Werster", "UUw")
            .with_upload("UUw", upload("w2", "Werster", "Mario any%", now() - Duration::hours(20)))
            .with_upload("UUw", upload("w1", "Werster", "Zelda 100%", now() - Duration::hours(30)))
            .with_details("w2", public(45.0)),
    ));
    let (_dir, watermark) = store(None);

    let report = CurationOrchestrator::new(platform.clone(), watermark.clone(), RunOptions::default())
        .run(now())
        .await
        .unwrap();

    assert_eq!(report.window_start, now() - Duration::days(1));
    assert_eq!(inserted(&platform), vec![pair("PLcar", "w2")]);
    assert_eq!(watermark.load(), Some(now() - Duration::hours(20)));
}

#[tokio::test]
async fn test_private_video_never_reaches_rules_or_playlists() {
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_channel("UCnfl", "NFL", "UUnfl")
            .with_upload("UUnfl", upload("p1", "NFL", "Mic'd Up: Private", now() - Duration::hours(1)))
            .with_details(
                "p1",
                VideoDetails {
                    privacy_status: PrivacyStatus::Private,
                    ..public(5.0)
                },
            ),
    ));
    let (_dir, watermark) = store(None);
    let rules = ChannelRuleTable::empty().with_rule("NFL", |video| {
        assert_ne!(video.video_id(), "p1", "private video reached channel rules");
        true
    });

    let report =
        CurationOrchestrator::with_rules(platform.clone(), watermark.clone(), RunOptions::default(), rules)
            .run(now())
            .await
            .unwrap();

    assert_eq!(report.in_window, 1);
    assert_eq!(report.public, 0);
    assert!(inserted(&platform).is_empty());
    assert_eq!(
        platform.count_calls(|call| matches!(call, PlatformCall::ListMyPlaylists { .. })),
        0
    );
    assert_eq!(watermark.load(), None);
}

#[tokio::test]
async fn test_thirty_minutes_is_subscriptions_and_just_over_is_car() {
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_channel("UCa", "Arlo", "UUa")
            .with_upload("UUa", upload("over", "Arlo", "Metroid history", now() - Duration::hours(1)))
            .with_upload("UUa", upload("exact", "Arlo", "Zelda deep dive", now() - Duration::hours(2)))
            .with_details("exact", public(30.0))
            .with_details("over", public(30.1)),
    ));
    let (_dir, watermark) = store(None);

    CurationOrchestrator::new(platform.clone(), watermark, RunOptions::default())
        .run(now())
        .await
        .unwrap();

    assert_eq!(
        inserted(&platform),
        vec![pair("PLsubs", "exact"), pair("PLcar", "over")]
    );
}

#[tokio::test]
async fn test_dry_run_inserts_nothing_and_keeps_watermark() {
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_channel("UCa", "Atrioc", "UUa")
            .with_upload("UUa", upload("a1", "Atrioc", "Marketing monday", now() - Duration::hours(1)))
            .with_details("a1", public(12.0)),
    ));
    let (_dir, watermark) = store(None);
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let report = CurationOrchestrator::new(platform.clone(), watermark.clone(), options)
        .run(now())
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.routed_to_subscriptions, 1);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.new_watermark, None);
    assert!(inserted(&platform).is_empty());
    assert_eq!(watermark.load(), None);
}

#[tokio::test]
async fn test_missing_needed_destination_fails_before_any_insert() {
    let platform = Arc::new(
        InMemoryPlatform::new()
            .with_playlist("PLsubs", "Subscriptions")
            .with_channel("UCa", "Arlo", "UUa")
            .with_upload("UUa", upload("long", "Arlo", "Longplay", now() - Duration::hours(1)))
            .with_upload("UUa", upload("short", "Arlo", "Short", now() - Duration::hours(2)))
            .with_details("short", public(5.0))
            .with_details("long", public(90.0)),
    );
    let (_dir, watermark) = store(None);

    let err = CurationOrchestrator::new(platform.clone(), watermark.clone(), RunOptions::default())
        .run(now())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PlatformError>(),
        Some(PlatformError::NotFound { .. })
    ));
    assert!(inserted(&platform).is_empty());
    assert_eq!(watermark.load(), None);
}

#[tokio::test]
async fn test_unused_destination_may_be_missing() {
    let platform = Arc::new(
        InMemoryPlatform::new()
            .with_playlist("PLsubs", "Subscriptions")
            .with_channel("UCa", "Arlo", "UUa")
            .with_upload("UUa", upload("short", "Arlo", "Short", now() - Duration::hours(2)))
            .with_details("short", public(5.0)),
    );
    let (_dir, watermark) = store(None);

    let report = CurationOrchestrator::new(platform.clone(), watermark, RunOptions::default())
        .run(now())
        .await
        .unwrap();

    assert_eq!(report.inserted, 1);
}

#[tokio::test]
async fn test_failed_insert_aborts_without_advancing_watermark() {
    let previous = now() - Duration::hours(10);
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_channel("UCa", "Arlo", "UUa")
            .with_upload("UUa", upload("second", "Arlo", "Second", now() - Duration::hours(1)))
            .with_upload("UUa", upload("first", "Arlo", "First", now() - Duration::hours(2)))
            .with_details("first", public(5.0))
            .with_details("second", public(6.0))
            .with_failing_insert("second"),
    ));
    let (_dir, watermark) = store(Some(previous));

    let result = CurationOrchestrator::new(platform.clone(), watermark.clone(), RunOptions::default())
        .run(now())
        .await;

    assert!(result.is_err());
    assert_eq!(inserted(&platform), vec![pair("PLsubs", "first")]);
    assert_eq!(watermark.load(), Some(previous));
}

#[tokio::test]
async fn test_channel_failure_aborts_unless_isolated() {
    let build = || {
        Arc::new(with_destinations(
            InMemoryPlatform::new()
                .with_channel("UCa", "Arlo", "UUa")
                .with_channel("UCb", "Broken", "UUb")
                .with_failing_channel("UCb")
                .with_upload("UUa", upload("a1", "Arlo", "Zelda", now() - Duration::hours(1)))
                .with_details("a1", public(5.0)),
        ))
    };

    let (_dir, watermark) = store(None);
    let strict = build();
    let result = CurationOrchestrator::new(strict.clone(), watermark.clone(), RunOptions::default())
        .run(now())
        .await;
    assert!(result.is_err());
    assert!(inserted(&strict).is_empty());

    let lenient = build();
    let options = RunOptions {
        isolate_channel_failures: true,
        ..RunOptions::default()
    };
    let report = CurationOrchestrator::new(lenient.clone(), watermark.clone(), options)
        .run(now())
        .await
        .unwrap();
    assert_eq!(report.skipped_channels, vec!["UCb".to_string()]);
    assert_eq!(inserted(&lenient), vec![pair("PLsubs", "a1")]);
}

#[tokio::test]
async fn test_subscriptions_page_failure_aborts_before_any_channel_work() {
    let platform = Arc::new(with_destinations(
        InMemoryPlatform::new()
            .with_page_size(1)
            .with_channel("UCa", "Arlo", "UUa")
            .with_channel("UCb", "Atrioc", "UUb")
            .with_upload("UUa", upload("a1", "Arlo", "Zelda", now() - Duration::hours(1)))
            .with_details("a1", public(5.0))
            .with_failing_subscriptions_page(2),
    ));
    let previous = now() - Duration::hours(7);
    let (_dir, watermark) = store(Some(previous));

    let err = CurationOrchestrator::new(platform.clone(), watermark.clone(), RunOptions::default())
        .run(now())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("subscriptions page 2"));
    assert!(
        platform
            .calls()
            .iter()
            .all(|call| matches!(call, PlatformCall::ListSubscriptions { .. }))
    );
    assert!(inserted(&platform).is_empty());
    assert_eq!(watermark.load(), Some(previous));
}
