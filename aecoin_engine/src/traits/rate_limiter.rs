use chrono::Duration;

use crate::traits::StorefrontError;

/// A shared counter store with TTL semantics, used for the per-email checkout rate limit.
///
/// `increment` bumps the counter for `key` and returns the new count. A counter whose window has lapsed is reset to
/// one and its window restarted. The counter is an abuse deterrent, not a security boundary: increment-then-compare
/// does not need to be perfectly atomic across concurrent callers.
#[allow(async_fn_in_trait)]
pub trait RateLimiterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, StorefrontError>;
}
