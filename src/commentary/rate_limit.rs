//! Fixed-window rate limiter
//!
//! Each key gets `max_requests` calls per window, counted from the first call
//! in that window. Expired windows are only dropped by `sweep`, which the
//! host runs on whatever schedule suits it.

use std::collections::HashMap;
use std::rc::Rc;

use crate::platform::Clock;

/// Default window length
pub const RATE_LIMIT_WINDOW_MS: f64 = 60_000.0;
/// Default calls allowed per window
pub const MAX_REQUESTS_PER_WINDOW: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_ms: f64,
    count: u32,
}

pub struct RateLimiter {
    clock: Rc<dyn Clock>,
    window_ms: f64,
    max_requests: u32,
    windows: HashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(clock: Rc<dyn Clock>, window_ms: f64, max_requests: u32) -> Self {
        Self {
            clock,
            window_ms,
            max_requests,
            windows: HashMap::new(),
        }
    }

    pub fn with_defaults(clock: Rc<dyn Clock>) -> Self {
        Self::new(clock, RATE_LIMIT_WINDOW_MS, MAX_REQUESTS_PER_WINDOW)
    }

    /// Count a call against `key`; false if the key is over its cap
    pub fn check(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        match self.windows.get_mut(key) {
            Some(window) if now - window.started_ms <= self.window_ms => {
                if window.count >= self.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                self.windows.insert(
                    key.to_string(),
                    Window {
                        started_ms: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }

    /// Drop expired windows; returns how many were removed
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.windows.len();
        let window_ms = self.window_ms;
        self.windows.retain(|_, w| now - w.started_ms <= window_ms);
        before - self.windows.len()
    }

    /// Keys currently tracked
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window_ms", &self.window_ms)
            .field("max_requests", &self.max_requests)
            .field("tracked", &self.windows.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;

    /// Hand-driven clock
    #[derive(Default)]
    pub(crate) struct ManualClock(pub Cell<f64>);

    impl ManualClock {
        pub(crate) fn advance(&self, ms: f64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }

    #[test]
    fn test_cap_per_window() {
        let clock = Rc::new(ManualClock::default());
        let mut limiter = RateLimiter::with_defaults(clock.clone());

        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            assert!(limiter.check("roast-1"));
        }
        assert!(!limiter.check("roast-1"));

        // Other keys are independent
        assert!(limiter.check("roast-2"));
    }

    #[test]
    fn test_window_resets() {
        let clock = Rc::new(ManualClock::default());
        let mut limiter = RateLimiter::new(clock.clone(), 1000.0, 2);

        assert!(limiter.check("k"));
        assert!(limiter.check("k"));
        assert!(!limiter.check("k"));

        clock.advance(1000.0);
        assert!(!limiter.check("k"));
        clock.advance(1.0);
        assert!(limiter.check("k"));
    }

    #[test]
    fn test_sweep_drops_expired() {
        let clock = Rc::new(ManualClock::default());
        let mut limiter = RateLimiter::new(clock.clone(), 1000.0, 2);

        limiter.check("old");
        clock.advance(600.0);
        limiter.check("new");
        assert_eq!(limiter.sweep(), 0);

        clock.advance(500.0);
        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.tracked(), 1);
    }
}
