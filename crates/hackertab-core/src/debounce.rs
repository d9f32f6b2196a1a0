//! Trailing-edge debouncing for bursty signals such as viewport resizes.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default settle time for viewport resize bursts.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;

/// Holds the latest value of a bursty signal until it has been quiet for
/// `delay`.
///
/// The caller supplies timestamps so the same type drives both a browser
/// timer callback and deterministic tests.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given settle delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Settle delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value, replacing any pending one and restarting the wait.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Whether a value is waiting to settle.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will settle, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending value if it has been quiet for at least `delay`.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop any pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_RESIZE_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_pending() {
        let mut d: Debouncer<u32> = Debouncer::default();
        assert!(!d.is_pending());
        assert_eq!(d.take_ready(Instant::now()), None);
    }

    #[test]
    fn test_waits_for_quiet_period() {
        let mut d = Debouncer::new(Duration::from_millis(250));
        let t0 = Instant::now();
        d.push(1, t0);
        assert_eq!(d.take_ready(t0 + Duration::from_millis(100)), None);
        assert_eq!(d.take_ready(t0 + Duration::from_millis(250)), Some(1));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_latest_value_wins_and_restarts_wait() {
        let mut d = Debouncer::new(Duration::from_millis(250));
        let t0 = Instant::now();
        d.push(1, t0);
        d.push(2, t0 + Duration::from_millis(200));
        d.push(3, t0 + Duration::from_millis(400));

        // 250ms after the first push is no longer enough
        assert_eq!(d.take_ready(t0 + Duration::from_millis(500)), None);
        assert_eq!(d.take_ready(t0 + Duration::from_millis(650)), Some(3));
        assert_eq!(d.take_ready(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_cancel() {
        let mut d = Debouncer::new(Duration::from_millis(10));
        let t0 = Instant::now();
        d.push("x", t0);
        d.cancel();
        assert_eq!(d.take_ready(t0 + Duration::from_secs(1)), None);
    }
}
