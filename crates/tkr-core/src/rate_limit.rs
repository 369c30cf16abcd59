use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::domain::UserId;

// ============== Policy ==============

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Admissions allowed inside one trailing `window`.
    pub max_requests: usize,
    /// Sliding admission window.
    pub window: Duration,
    /// How long admitted timestamps are kept at all.
    pub retention: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
            retention: Duration::from_secs(60 * 60),
        }
    }
}

// ============== Rate Limiter (Sliding Window Log) ==============

/// Per-user sliding-window limiter.
///
/// Every user gets an ordered log of admitted instants. A request is admitted
/// when fewer than `max_requests` logged instants are younger than `window`.
/// Denied attempts leave the log untouched.
///
/// The map sits behind one mutex and every operation runs to completion while
/// holding it, so concurrent `admit` calls for the same user cannot both slip
/// under the limit.
#[derive(Debug, Default)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    logs: Mutex<HashMap<UserId, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Check-then-record. Returns `false` without recording anything when the
    /// user already has `max_requests` admissions inside the window.
    pub fn admit(&self, user_id: UserId, now: Instant) -> bool {
        let mut logs = self.lock();

        let recent = logs
            .get(&user_id)
            .map(|log| {
                log.iter()
                    .filter(|&&t| now.saturating_duration_since(t) < self.policy.window)
                    .count()
            })
            .unwrap_or(0);

        if recent >= self.policy.max_requests {
            return false;
        }

        let log = logs.entry(user_id).or_default();
        log.push(now);
        log.retain(|&t| now.saturating_duration_since(t) < self.policy.retention);
        true
    }

    /// Drop users with nothing left inside the retention window.
    ///
    /// Returns how many users were evicted. Users that still have a live entry
    /// are pruned but kept.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let retention = self.policy.retention;
        let mut logs = self.lock();
        let before = logs.len();

        logs.retain(|_, log| {
            log.retain(|&t| now.saturating_duration_since(t) < retention);
            !log.is_empty()
        });

        before - logs.len()
    }

    /// Number of users currently holding a log.
    pub fn tracked_users(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    fn log_len(&self, user_id: UserId) -> usize {
        self.lock().get(&user_id).map(Vec::len).unwrap_or(0)
    }

    // A panic while holding the lock cannot leave a log half-updated (push and
    // retain are each complete), so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Vec<Instant>>> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn five_per_minute_then_denied() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        for t in [0, 10, 20, 30, 40] {
            assert!(rl.admit(a, start + secs(t)), "t={t} should be admitted");
        }
        assert!(!rl.admit(a, start + secs(50)));
    }

    #[test]
    fn oldest_entry_leaves_window() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        for t in [0, 10, 20, 30, 40] {
            assert!(rl.admit(a, start + secs(t)));
        }
        assert!(!rl.admit(a, start + secs(50)));
        // t=0 is now 65s old; only t=10..40 count.
        assert!(rl.admit(a, start + secs(65)));
    }

    #[test]
    fn window_boundary_is_strict() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        for _ in 0..5 {
            assert!(rl.admit(a, start));
        }
        assert!(!rl.admit(a, start + secs(59)));
        // Exactly 60s old no longer counts.
        assert!(rl.admit(a, start + secs(60)));
    }

    #[test]
    fn denied_attempts_do_not_grow_the_log() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        for _ in 0..5 {
            assert!(rl.admit(a, start));
        }
        let before = rl.log_len(a);
        for _ in 0..100 {
            assert!(!rl.admit(a, start));
        }
        assert_eq!(rl.log_len(a), before);
    }

    #[test]
    fn denied_attempts_are_free() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        for _ in 0..5 {
            assert!(rl.admit(a, start));
        }
        for t in 1..60 {
            assert!(!rl.admit(a, start + secs(t)));
        }
        // Spamming while denied does not push the unlock time back.
        assert!(rl.admit(a, start + secs(60)));
    }

    #[test]
    fn prunes_past_retention_on_admit() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        for t in [0, 1, 2] {
            assert!(rl.admit(a, start + secs(t)));
        }
        assert_eq!(rl.log_len(a), 3);

        assert!(rl.admit(a, start + secs(3601)));
        // t=0 and t=1 are >= 1h old; t=2 is 3599s old.
        assert_eq!(rl.log_len(a), 2);

        assert!(rl.admit(a, start + secs(2 * 3600)));
        assert_eq!(rl.log_len(a), 2);
    }

    #[test]
    fn recheck_without_time_passing_keeps_admissions() {
        let start = Instant::now();
        let rl = RateLimiter::default();
        let a = UserId(1);

        assert!(rl.admit(a, start));
        assert_eq!(rl.log_len(a), 1);
        assert!(rl.admit(a, start));
        assert_eq!(rl.log_len(a), 2);
    }

    #[test]
    fn users_are_independent() {
        let start = Instant::now();
        let rl = RateLimiter::default();

        for _ in 0..5 {
            assert!(rl.admit(UserId(1), start));
        }
        assert!(!rl.admit(UserId(1), start));
        assert!(rl.admit(UserId(2), start));
        assert_eq!(rl.tracked_users(), 2);
    }

    #[test]
    fn custom_policy_is_respected() {
        let start = Instant::now();
        let rl = RateLimiter::new(RateLimitPolicy {
            max_requests: 2,
            window: secs(10),
            retention: secs(30),
        });
        let a = UserId(7);

        assert!(rl.admit(a, start));
        assert!(rl.admit(a, start + secs(1)));
        assert!(!rl.admit(a, start + secs(9)));
        assert!(rl.admit(a, start + secs(10)));
    }

    #[test]
    fn out_of_order_instants_count_as_fresh() {
        let start = Instant::now() + secs(100);
        let rl = RateLimiter::default();
        let a = UserId(1);

        for _ in 0..5 {
            assert!(rl.admit(a, start));
        }
        // An earlier `now` sees the logged instants as zero seconds old.
        assert!(!rl.admit(a, start - secs(30)));
    }

    #[test]
    fn evict_idle_drops_only_stale_users() {
        let start = Instant::now();
        let rl = RateLimiter::default();

        assert!(rl.admit(UserId(1), start));
        assert!(rl.admit(UserId(2), start + secs(1800)));

        assert_eq!(rl.evict_idle(start + secs(3600)), 1);
        assert_eq!(rl.tracked_users(), 1);
        assert_eq!(rl.log_len(UserId(2)), 1);

        // An evicted user starts over with a fresh budget.
        for _ in 0..5 {
            assert!(rl.admit(UserId(1), start + secs(3600)));
        }
        assert!(!rl.admit(UserId(1), start + secs(3600)));
    }

    #[test]
    fn concurrent_admits_never_exceed_limit() {
        let now = Instant::now();
        let rl = Arc::new(RateLimiter::default());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let rl = rl.clone();
                std::thread::spawn(move || rl.admit(UserId(42), now))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 5);
        assert_eq!(rl.log_len(UserId(42)), 5);
    }
}
