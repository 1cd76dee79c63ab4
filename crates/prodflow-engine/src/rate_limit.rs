//! Sliding-window rate limiter with an owned background cleanup task.
//!
//! Per-key attempt timestamps live in one mutex-guarded map. A check
//! prunes the key's window and records the attempt under a single lock
//! acquisition, so concurrent callers over the same key serialize and
//! the limit holds exactly. The cleanup task drops idle keys so the
//! map does not grow without bound; it stops on [`RateLimiter::shutdown`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Outcome of a single rate check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Attempts left in the current window after this one.
    pub remaining: u32,
    /// When rejected, how long until the oldest attempt ages out.
    pub retry_after: Option<Duration>,
}

/// Sliding-window limiter keyed by caller identity.
pub struct RateLimiter {
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
    limit: usize,
    window: Duration,
    cancel: CancellationToken,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            limit,
            window,
            cancel: CancellationToken::new(),
        }
    }

    /// Strict profile for login-style endpoints: 5 attempts per minute.
    pub fn for_auth() -> Self {
        Self::new(5, Duration::from_secs(60))
    }

    /// General profile: 100 requests per minute.
    pub fn for_api() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Record an attempt for `key` and decide whether it is allowed.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let timestamps = attempts.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.limit {
            // A zero-limit limiter has no oldest stamp to age out;
            // the full window is the honest retry hint.
            let retry_after = timestamps
                .first()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            return RateDecision {
                allowed: false,
                remaining: 0,
                retry_after: Some(retry_after),
            };
        }

        timestamps.push(now);
        RateDecision {
            allowed: true,
            remaining: (self.limit - timestamps.len()) as u32,
            retry_after: None,
        }
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Spawn the periodic purge of fully aged-out keys. The task runs
    /// until [`shutdown`](Self::shutdown) cancels it.
    pub fn spawn_cleanup(self: &std::sync::Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = limiter.cancel.cancelled() => {
                        tracing::debug!("rate limiter cleanup stopping");
                        break;
                    }
                    _ = ticker.tick() => limiter.purge_stale(),
                }
            }
        })
    }

    /// Signal the cleanup task to stop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn purge_stale(&self) {
        let now = Instant::now();
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = attempts.len();
        attempts.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < self.window);
            !timestamps.is_empty()
        });
        let purged = before - attempts.len();
        if purged > 0 {
            tracing::trace!(purged, "dropped idle rate limit keys");
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("10.0.0.1");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
            assert!(decision.retry_after.is_none());
        }

        let decision = limiter.check("10.0.0.1");
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        let retry_after = decision.retry_after.unwrap();
        assert!(retry_after > Duration::ZERO);
        assert!(retry_after <= Duration::from_secs(60));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a").allowed);
        assert!(!limiter.check("a").allowed);
        assert!(limiter.check("b").allowed);
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_millis(30));
        assert!(limiter.check("a").allowed);
        assert!(!limiter.check("a").allowed);
        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check("a").allowed);
    }

    #[test]
    fn test_zero_limit_rejects_with_full_window() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        let decision = limiter.check("a");
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.retry_after, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_auth_profile_limits_five_per_minute() {
        let limiter = RateLimiter::for_auth();
        for _ in 0..5 {
            assert!(limiter.check("client").allowed);
        }
        assert!(!limiter.check("client").allowed);
    }

    #[test]
    fn test_cleanup_purges_idle_keys_and_shutdown_stops_task() {
        tokio_test::block_on(async {
            let limiter = Arc::new(RateLimiter::new(5, Duration::from_millis(20)));
            limiter.check("ephemeral");
            assert_eq!(limiter.tracked_keys(), 1);

            let handle = limiter.spawn_cleanup(Duration::from_millis(10));
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert_eq!(limiter.tracked_keys(), 0);

            limiter.shutdown();
            handle.await.unwrap();
        });
    }
}
