use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::metrics::RATE_LIMIT_KEYS;

// Rate limit record - tracks requests per IP/key within the current window
struct RateLimitRecord {
    count: u32,
    reset_at: Instant,
}

/// In-memory per-key rate limiter with fixed-window counters.
///
/// Cheap to clone (shared map). A key can burst up to `2 * max_requests`
/// across a window boundary; that approximation is accepted.
#[derive(Clone)]
pub struct RateLimiter {
    records: Arc<DashMap<String, RateLimitRecord>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    ///
    /// `max_requests == 0` always denies. A zero `window` makes every record
    /// expire immediately, so every request starts a fresh window.
    pub fn check(&self, key: &str, max_requests: u32, window: Duration) -> bool {
        self.check_at(key, max_requests, window, Instant::now())
    }

    fn check_at(&self, key: &str, max_requests: u32, window: Duration, now: Instant) -> bool {
        // The entry guard holds the shard lock across check-then-mutate, so
        // two concurrent requests cannot both slip under the limit
        let mut entry = self
            .records
            .entry(key.to_string())
            .or_insert(RateLimitRecord {
                count: 0,
                reset_at: now + window,
            });

        // Window expired? Start a fresh one
        if now > entry.reset_at {
            entry.count = 1;
            entry.reset_at = now + window;
            return max_requests > 0;
        }

        // Over limit? Deny without touching the count
        if entry.count >= max_requests {
            return false;
        }

        entry.count += 1;
        true
    }

    /// Requests left in the key's current window. Read-only; a key with no
    /// active window has the full quota.
    pub fn remaining(&self, key: &str, max_requests: u32) -> u32 {
        self.remaining_at(key, max_requests, Instant::now())
    }

    fn remaining_at(&self, key: &str, max_requests: u32, now: Instant) -> u32 {
        match self.records.get(key) {
            Some(record) if now <= record.reset_at => max_requests.saturating_sub(record.count),
            _ => max_requests,
        }
    }

    /// Time until the key's current window expires, zero if none is active.
    pub fn reset_time(&self, key: &str) -> Duration {
        self.reset_time_at(key, Instant::now())
    }

    fn reset_time_at(&self, key: &str, now: Instant) -> Duration {
        match self.records.get(key) {
            Some(record) => record.reset_at.saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Drops records whose window has passed. Only bounds memory; `check`
    /// handles expiry logically either way.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| now <= record.reset_at);
        before - self.records.len()
    }

    /// Spawns the periodic sweep. The caller owns the handle and aborts it
    /// on shutdown.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(
                        removed,
                        remaining = limiter.len(),
                        "swept expired rate limit records"
                    );
                }
                RATE_LIMIT_KEYS.set(limiter.len() as f64);
            }
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(60_000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn allows_up_to_limit_then_denies() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_at("ip", 5, WINDOW, now));
        }
        assert!(!limiter.check_at("ip", 5, WINDOW, now));
        // Still denied later within the same window
        assert!(!limiter.check_at("ip", 5, WINDOW, now + ms(10)));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(limiter.check_at("1.2.3.4", 3, WINDOW, now));
        assert!(limiter.check_at("1.2.3.4", 3, WINDOW, now + ms(1)));
        assert!(limiter.check_at("1.2.3.4", 3, WINDOW, now + ms(2)));
        assert!(!limiter.check_at("1.2.3.4", 3, WINDOW, now + ms(3)));

        // Strictly past reset_at: fresh window, count back to 1
        assert!(limiter.check_at("1.2.3.4", 3, WINDOW, now + ms(60_001)));
        assert_eq!(limiter.remaining_at("1.2.3.4", 3, now + ms(60_001)), 2);
    }

    #[test]
    fn denial_does_not_consume_the_next_window() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(limiter.check_at("ip", 1, WINDOW, now));
        for i in 1..10 {
            assert!(!limiter.check_at("ip", 1, WINDOW, now + ms(i)));
        }
        // Denials neither extended the window nor inflated the count
        assert!(limiter.check_at("ip", 1, WINDOW, now + WINDOW + ms(1)));
    }

    #[test]
    fn remaining_counts_down_and_floors_at_zero() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert_eq!(limiter.remaining_at("ip", 4, now), 4);
        limiter.check_at("ip", 4, WINDOW, now);
        assert_eq!(limiter.remaining_at("ip", 4, now), 3);
        limiter.check_at("ip", 4, WINDOW, now);
        limiter.check_at("ip", 4, WINDOW, now);
        limiter.check_at("ip", 4, WINDOW, now);
        assert_eq!(limiter.remaining_at("ip", 4, now), 0);
        limiter.check_at("ip", 4, WINDOW, now);
        assert_eq!(limiter.remaining_at("ip", 4, now), 0);
        // Expired window reads as full quota even before a sweep
        assert_eq!(limiter.remaining_at("ip", 4, now + WINDOW + ms(1)), 4);
    }

    #[test]
    fn reset_time_decreases_until_expiry() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert_eq!(limiter.reset_time_at("ip", now), Duration::ZERO);

        limiter.check_at("ip", 5, WINDOW, now);
        assert_eq!(limiter.reset_time_at("ip", now), WINDOW);
        assert_eq!(limiter.reset_time_at("ip", now + ms(20_000)), ms(40_000));
        assert_eq!(limiter.reset_time_at("ip", now + WINDOW), Duration::ZERO);
        assert_eq!(
            limiter.reset_time_at("ip", now + WINDOW + ms(500)),
            Duration::ZERO
        );
    }

    #[test]
    fn keys_are_tracked_independently() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(limiter.check_at("a", 1, WINDOW, now));
        assert!(!limiter.check_at("a", 1, WINDOW, now));
        assert!(limiter.check_at("b", 1, WINDOW, now));
        assert_eq!(limiter.remaining_at("b", 1, now), 0);
    }

    #[test]
    fn zero_limit_always_denies() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(!limiter.check_at("ip", 0, WINDOW, now));
        assert!(!limiter.check_at("ip", 0, WINDOW, now + WINDOW + ms(1)));
    }

    #[test]
    fn zero_window_treats_every_record_as_expired() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(limiter.check_at("ip", 1, Duration::ZERO, now));
        // Any later instant is past reset_at, so the window restarts
        assert!(limiter.check_at("ip", 1, Duration::ZERO, now + ms(1)));
        assert!(limiter.check_at("ip", 1, Duration::ZERO, now + ms(2)));
    }

    #[test]
    fn sweep_removes_expired_records_without_changing_outcomes() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        limiter.check_at("old", 3, WINDOW, now);
        limiter.check_at("fresh", 3, WINDOW, now + ms(50_000));
        assert_eq!(limiter.len(), 2);

        let later = now + WINDOW + ms(1);
        assert_eq!(limiter.sweep_at(later), 1);
        assert_eq!(limiter.len(), 1);

        // Same decision whether or not the sweep ran first
        assert!(limiter.check_at("old", 3, WINDOW, later));
        assert_eq!(limiter.remaining_at("old", 3, later), 2);
    }

    #[tokio::test]
    async fn sweeper_task_reclaims_expired_keys() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("ip", 3, ms(10)));
        let handle = limiter.spawn_sweeper(ms(20));

        tokio::time::sleep(ms(80)).await;
        assert_eq!(limiter.len(), 0);
        handle.abort();
    }
}
