//! Subscription Enumerator - follows the subscriptions cursor to the end.

use anyhow::{bail, Context, Result};
use catalog::Subscription;
use platform_client::VideoPlatform;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Collects every subscription of the authenticated user.
pub struct SubscriptionEnumerator {
    platform: Arc<dyn VideoPlatform>,
}

impl SubscriptionEnumerator {
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self { platform }
    }

    /// Fetch pages until the platform stops returning a continuation token.
    ///
    /// At least one page is always requested, so an empty subscription list
    /// costs exactly one call. Any page failure aborts the enumeration, as
    /// does a continuation token that was already followed.
    #[instrument(skip(self))]
    pub async fn collect_all(&self) -> Result<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self
                .platform
                .list_subscriptions(page_token.as_deref())
                .await
                .with_context(|| format!("Failed to fetch subscriptions page {}", pages + 1))?;
            pages += 1;
            debug!("Subscriptions page {}: {} entries", pages, page.items.len());
            subscriptions.extend(page.items);

            match page.next_page_token {
                Some(next) if !seen_tokens.insert(next.clone()) => {
                    bail!("Subscriptions cursor returned token {next} again after page {pages}");
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        info!(
            "Enumerated {} subscriptions over {} pages",
            subscriptions.len(),
            pages
        );
        Ok(subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_client::memory::{InMemoryPlatform, PlatformCall};

    #[tokio::test]
    async fn test_collects_every_page_in_order() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_page_size(2)
                .with_channel("c1", "Arlo", "u1")
                .with_channel("c2", "NFL", "u2")
                .with_channel("c3", "Werster", "u3")
                .with_channel("c4", "Dorkly", "u4")
                .with_channel("c5", "Atrioc", "u5"),
        );
        let enumerator = SubscriptionEnumerator::new(platform.clone());

        let subscriptions = enumerator.collect_all().await.unwrap();

        let titles: Vec<&str> = subscriptions.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Arlo", "NFL", "Werster", "Dorkly", "Atrioc"]);
        assert_eq!(
            platform.count_calls(|call| matches!(call, PlatformCall::ListSubscriptions { .. })),
            3
        );
    }

    #[tokio::test]
    async fn test_failed_page_aborts_enumeration() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_page_size(2)
                .with_channel("c1", "Arlo", "u1")
                .with_channel("c2", "NFL", "u2")
                .with_channel("c3", "Werster", "u3")
                .with_channel("c4", "Dorkly", "u4")
                .with_channel("c5", "Atrioc", "u5")
                .with_failing_subscriptions_page(2),
        );
        let enumerator = SubscriptionEnumerator::new(platform.clone());

        let err = enumerator.collect_all().await.unwrap_err();

        assert!(format!("{err:#}").contains("Failed to fetch subscriptions page 2"));
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::ListSubscriptions { page_token: None },
                PlatformCall::ListSubscriptions {
                    page_token: Some("2".to_string())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_cursor_that_does_not_advance_is_an_error() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_page_size(2)
                .with_channel("c1", "Arlo", "u1")
                .with_channel("c2", "NFL", "u2")
                .with_channel("c3", "Werster", "u3")
                .with_subscriptions_cursor(Some("2"), "2"),
        );
        let enumerator = SubscriptionEnumerator::new(platform.clone());

        let err = enumerator.collect_all().await.unwrap_err();

        assert!(err.to_string().contains("returned token 2 again after page 2"));
        assert_eq!(
            platform.count_calls(|call| matches!(call, PlatformCall::ListSubscriptions { .. })),
            2
        );
    }

    #[tokio::test]
    async fn test_cursor_cycle_is_an_error() {
        let platform = Arc::new(
            InMemoryPlatform::new()
                .with_page_size(2)
                .with_channel("c1", "Arlo", "u1")
                .with_channel("c2", "NFL", "u2")
                .with_channel("c3", "Werster", "u3")
                .with_channel("c4", "Dorkly", "u4")
                .with_channel("c5", "Atrioc", "u5")
                .with_channel("c6", "Jerma", "u6")
                .with_subscriptions_cursor(Some("4"), "2"),
        );
        let enumerator = SubscriptionEnumerator::new(platform.clone());

        let err = enumerator.collect_all().await.unwrap_err();

        assert!(err.to_string().contains("returned token 2 again after page 3"));
        assert_eq!(
            platform.count_calls(|call| matches!(call, PlatformCall::ListSubscriptions { .. })),
            3
        );
    }

    #[tokio::test]
    async fn test_empty_subscription_list_is_one_call() {
        let platform = Arc::new(InMemoryPlatform::new());
        let enumerator = SubscriptionEnumerator::new(platform.clone());

        let subscriptions = enumerator.collect_all().await.unwrap();

        assert!(subscriptions.is_empty());
        assert_eq!(
            platform.calls(),
            vec![PlatformCall::ListSubscriptions { page_token: None }]
        );
    }
}
