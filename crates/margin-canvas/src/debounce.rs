//! Trailing-edge debouncer.
//!
//! Each push replaces the payload and restarts the quiet period; the payload
//! is released once the period elapses with no further push. Time is passed
//! in so hosts drive it from their own timer and tests from fixed instants.

use std::time::Duration;

use web_time::Instant;

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending payload becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// Replace the payload and restart the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Release the payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if *at <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Release the payload regardless of the deadline.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    /// Drop the payload. Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn coalesces_to_latest() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1000));
        for i in 0..5u64 {
            d.push(i, t0 + ms(i * 100));
        }
        // Deadline follows the last push.
        assert_eq!(d.deadline(), Some(t0 + ms(1400)));
        assert_eq!(d.poll(t0 + ms(1399)), None);
        assert_eq!(d.poll(t0 + ms(1400)), Some(4));
        assert_eq!(d.poll(t0 + ms(5000)), None);
    }

    #[test]
    fn isolated_change_fires_once() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1000));
        d.push("a", t0);
        assert_eq!(d.poll(t0 + ms(1000)), Some("a"));
        d.push("b", t0 + ms(3000));
        assert_eq!(d.poll(t0 + ms(4000)), Some("b"));
    }

    #[test]
    fn take_and_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(1000));
        d.push(1, t0);
        assert_eq!(d.take(), Some(1));
        assert!(!d.cancel());
        d.push(2, t0);
        assert!(d.cancel());
        assert!(!d.is_pending());
    }
}
