#![forbid(unsafe_code)]

//! Trailing-edge debouncing for bursty completion signals.
//!
//! Several areas finishing a `flex-basis` transition in the same frame each
//! produce a completion signal. [`Debouncer`] folds such a burst into a single
//! firing once no new signal has arrived for the configured quiet window.
//!
//! The debouncer owns no timer. The caller passes the current [`Instant`] to
//! [`push`](Debouncer::push) and [`poll`](Debouncer::poll), which keeps it
//! deterministic under test and usable from any event loop.
//!
//! ```
//! use std::time::Duration;
//! use asplit_core::debounce::Debouncer;
//! use web_time::Instant;
//!
//! let t0 = Instant::now();
//! let mut d = Debouncer::new(Duration::from_millis(20));
//! d.push(t0);
//! d.push(t0 + Duration::from_millis(5));
//! assert_eq!(d.poll(t0 + Duration::from_millis(10)), None);
//! assert_eq!(d.poll(t0 + Duration::from_millis(25)), Some(2));
//! assert_eq!(d.poll(t0 + Duration::from_millis(60)), None);
//! ```

use std::time::Duration;
use web_time::Instant;

/// Coalesces signals that arrive within a quiet window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
    pending: u32,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            pending: 0,
        }
    }

    /// Configured quiet window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Change the quiet window. A pending burst keeps its current deadline.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Record one signal at `now`, pushing the deadline out.
    pub fn push(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
        self.pending = self.pending.saturating_add(1);
    }

    /// Fire if the quiet window has elapsed.
    ///
    /// Returns the number of signals folded into this firing, or `None` when
    /// nothing is pending or the window is still open.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        Some(std::mem::take(&mut self.pending))
    }

    /// Deadline of the pending burst, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a burst is waiting to fire.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop any pending burst without firing.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_poll_is_none() {
        let mut d = Debouncer::new(ms(20));
        assert!(!d.is_pending());
        assert_eq!(d.poll(Instant::now()), None);
    }

    #[test]
    fn burst_fires_once() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(20));
        for i in 0..5 {
            d.push(t0 + ms(i * 3));
        }
        // Last push at 12ms, deadline 32ms.
        assert_eq!(d.poll(t0 + ms(31)), None);
        assert_eq!(d.poll(t0 + ms(32)), Some(5));
        assert_eq!(d.poll(t0 + ms(100)), None);
    }

    #[test]
    fn separated_signals_fire_separately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(20));
        d.push(t0);
        assert_eq!(d.poll(t0 + ms(20)), Some(1));
        d.push(t0 + ms(50));
        assert_eq!(d.poll(t0 + ms(70)), Some(1));
    }

    #[test]
    fn reset_discards_burst() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(20));
        d.push(t0);
        d.reset();
        assert_eq!(d.poll(t0 + ms(40)), None);
    }

    #[test]
    fn zero_window_fires_immediately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.push(t0);
        assert_eq!(d.deadline(), Some(t0));
        assert_eq!(d.poll(t0), Some(1));
    }
}
