//! Keeps candidates published inside the run's window.

use crate::traits::Filter;
use anyhow::Result;
use catalog::CandidateVideo;
use sources::RunContext;

/// Keeps videos published strictly after the window start and strictly
/// before the run's `now`.
pub struct TimeWindowFilter;

impl Filter<CandidateVideo> for TimeWindowFilter {
    fn name(&self) -> &str {
        "TimeWindowFilter"
    }

    fn apply(
        &self,
        candidates: Vec<CandidateVideo>,
        context: &RunContext,
    ) -> Result<Vec<CandidateVideo>> {
        Ok(candidates
            .into_iter()
            .filter(|video| context.contains(video.published_at))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::ResourceRef;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn video(id: &str, published_at: DateTime<Utc>) -> CandidateVideo {
        CandidateVideo {
            video_id: id.to_string(),
            channel_title: "Arlo".to_string(),
            published_at,
            title: id.to_string(),
            resource: ResourceRef::video(id),
        }
    }

    #[test]
    fn test_window_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let watermark = now - Duration::hours(6);
        let context = RunContext::new(now, Some(watermark));

        let candidates = vec![
            video("at-watermark", watermark),
            video("inside", watermark + Duration::minutes(1)),
            video("just-before-now", now - Duration::milliseconds(1)),
            video("at-now", now),
            video("future", now + Duration::minutes(5)),
            video("old", watermark - Duration::days(3)),
        ];

        let kept = TimeWindowFilter.apply(candidates, &context).unwrap();
        let ids: Vec<&str> = kept.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["inside", "just-before-now"]);
    }

    #[test]
    fn test_default_window_without_watermark() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let context = RunContext::new(now, None);

        let candidates = vec![
            video("yesterday-morning", now - Duration::hours(30)),
            video("this-morning", now - Duration::hours(4)),
        ];

        let kept = TimeWindowFilter.apply(candidates, &context).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].video_id, "this-morning");
    }
}
