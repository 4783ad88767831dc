use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parley_embed::RateLimits;
use parley_persist::StoreClient;

pub const HOURLY_LIMIT_REASON: &str = "Hourly rate limit exceeded";
pub const DAILY_LIMIT_REASON: &str = "Daily rate limit exceeded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub reason: Option<&'static str>,
    pub hourly_count: u64,
    pub daily_count: u64,
}

impl RateLimitResult {
    fn open() -> Self {
        Self {
            allowed: true,
            reason: None,
            hourly_count: 0,
            daily_count: 0,
        }
    }
}

/// Per-embed request quotas over trailing 1h and 24h windows
///
/// Counts stored user messages for the embed key. A failed count lets the
/// request through.
pub struct RateLimiter {
    store: Arc<dyn StoreClient>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    pub async fn check_limit(&self, embed_key: &str, limits: RateLimits) -> RateLimitResult {
        self.check_limit_at(embed_key, limits, Utc::now()).await
    }

    pub async fn check_limit_at(
        &self,
        embed_key: &str,
        limits: RateLimits,
        now: DateTime<Utc>,
    ) -> RateLimitResult {
        let hourly = self
            .store
            .count_user_messages_since(embed_key, now - Duration::hours(1))
            .await;
        let daily = self
            .store
            .count_user_messages_since(embed_key, now - Duration::hours(24))
            .await;

        let (hourly_count, daily_count) = match (hourly, daily) {
            (Ok(hourly), Ok(daily)) => (hourly, daily),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(
                    step = "rate_check",
                    embed_key = %embed_key,
                    error = %e,
                    "Rate limit count failed, allowing request"
                );
                return RateLimitResult::open();
            }
        };

        let reason = if hourly_count >= u64::from(limits.per_hour) {
            Some(HOURLY_LIMIT_REASON)
        } else if daily_count >= u64::from(limits.per_day) {
            Some(DAILY_LIMIT_REASON)
        } else {
            None
        };

        RateLimitResult {
            allowed: reason.is_none(),
            reason,
            hourly_count,
            daily_count,
        }
    }
}
