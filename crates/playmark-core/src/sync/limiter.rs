use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};

/// Spacing between remote writes that keeps usage at `(1 - margin)` of an
/// hourly quota. 1800/h with a 0.2 margin gives 2.5s.
pub fn window_for_quota(writes_per_hour: u32, safety_margin: f64) -> Duration {
    let budget = f64::from(writes_per_hour.max(1)) * (1.0 - safety_margin.clamp(0.0, 0.99));
    let millis = (3_600_000.0 / budget).round();
    Duration::from_millis(millis as u64)
}

/// Process-wide cooldown for remote writes.
///
/// One timestamp for all keys: after a permitted write, every other
/// rate-limited write is refused until `window` has elapsed.
#[derive(Debug)]
pub struct SyncLimiter {
    window: Duration,
    clock: Arc<dyn Clock>,
    last_sync: Mutex<Option<Instant>>,
}

impl SyncLimiter {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            last_sync: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Claim the next remote write slot. Returns true (and starts a new
    /// window) when the previous write is more than `window` old or there
    /// has been none yet.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut last = self.last_sync.lock().unwrap_or_else(|e| e.into_inner());
        let permitted = match *last {
            None => true,
            Some(prev) => now.saturating_duration_since(prev) > self.window,
        };
        if permitted {
            *last = Some(now);
        }
        permitted
    }

    /// Record a remote write made outside the limiter (bulk operations) so
    /// the next throttled write still leaves room in the quota.
    pub fn mark_synced(&self) {
        let now = self.clock.now();
        *self.last_sync.lock().unwrap_or_else(|e| e.into_inner()) = Some(now);
    }

    /// Time since the last remote write, or None if there has been none.
    pub fn since_last_sync(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.last_sync
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|prev| now.saturating_duration_since(prev))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ManualClock;

    fn limiter(window_secs: u64) -> (Arc<ManualClock>, SyncLimiter) {
        let clock = Arc::new(ManualClock::new());
        let limiter = SyncLimiter::with_clock(Duration::from_secs(window_secs), clock.clone());
        (clock, limiter)
    }

    #[test]
    fn quota_window_applies_safety_margin() {
        assert_eq!(window_for_quota(1800, 0.2), Duration::from_millis(2500));
        assert_eq!(window_for_quota(3600, 0.0), Duration::from_secs(1));
        assert_eq!(window_for_quota(60, 0.0), Duration::from_secs(60));
    }

    #[test]
    fn first_write_is_permitted() {
        let (_clock, limiter) = limiter(10);
        assert!(limiter.since_last_sync().is_none());
        assert!(limiter.try_acquire());
        assert_eq!(limiter.since_last_sync(), Some(Duration::ZERO));
    }

    #[test]
    fn writes_within_window_are_refused() {
        let (clock, limiter) = limiter(10);
        assert!(limiter.try_acquire());
        for _ in 0..9 {
            clock.advance(Duration::from_secs(1));
            assert!(!limiter.try_acquire());
        }
        // Exactly at the window edge is still inside it.
        clock.advance(Duration::from_secs(1));
        assert!(!limiter.try_acquire());
        clock.advance(Duration::from_millis(1));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn refused_attempts_do_not_extend_the_window() {
        let (clock, limiter) = limiter(5);
        assert!(limiter.try_acquire());
        clock.advance(Duration::from_secs(3));
        assert!(!limiter.try_acquire());
        clock.advance(Duration::from_secs(3));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn mark_synced_restarts_the_window() {
        let (clock, limiter) = limiter(5);
        clock.advance(Duration::from_secs(100));
        limiter.mark_synced();
        assert!(!limiter.try_acquire());
        clock.advance(Duration::from_secs(6));
        assert!(limiter.try_acquire());
    }
}
