/// Cancellable quiet-period scheduling, polled by the host event loop.
use std::time::{Duration, Instant};

/// Holds at most one pending payload until `delay` has passed since it was
/// last scheduled.
///
/// Scheduling a new payload replaces the pending one and restarts the
/// quiet period. There is no background timer: the owner calls
/// `fire_due` from its loop, and dropping the debouncer drops the payload.
#[derive(Debug)]
pub struct Debouncer<P> {
    delay: Duration,
    pending: Option<(P, Instant)>,
}

impl<P> Debouncer<P> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Changes the quiet period. A pending payload keeps its schedule time,
    /// so its deadline moves with the new delay.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedules `payload`, cancelling whatever was pending.
    ///
    /// Returns the payload that was replaced, if any.
    pub fn schedule(&mut self, payload: P, now: Instant) -> Option<P> {
        self.pending
            .replace((payload, now))
            .map(|(replaced, _)| replaced)
    }

    /// Instant at which the pending payload becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|(_, scheduled_at)| *scheduled_at + self.delay)
    }

    /// Takes the pending payload if its deadline is at or before `now`.
    pub fn fire_due(&mut self, now: Instant) -> Option<P> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Takes the pending payload regardless of its deadline.
    pub fn take(&mut self) -> Option<P> {
        self.pending.take().map(|(payload, _)| payload)
    }

    /// Drops the pending payload. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_not_due_before_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(200));
        d.schedule("a", t0);

        assert!(d.fire_due(t0 + ms(199)).is_none());
        assert!(d.is_pending());
        assert_eq!(d.fire_due(t0 + ms(200)), Some("a"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_reschedule_restarts_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(200));
        assert_eq!(d.schedule(1, t0), None);
        assert_eq!(d.schedule(2, t0 + ms(150)), Some(1));

        assert!(d.fire_due(t0 + ms(300)).is_none());
        assert_eq!(d.deadline(), Some(t0 + ms(350)));
        assert_eq!(d.fire_due(t0 + ms(350)), Some(2));
    }

    #[test]
    fn test_zero_delay_is_immediately_due() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.schedule('x', t0);
        assert_eq!(d.fire_due(t0), Some('x'));
    }

    #[test]
    fn test_cancel_and_take() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(50));
        assert!(!d.cancel());

        d.schedule(10, t0);
        assert!(d.cancel());
        assert!(d.fire_due(t0 + ms(100)).is_none());

        d.schedule(11, t0);
        assert_eq!(d.take(), Some(11));
        assert_eq!(d.take(), None);
    }

    #[test]
    fn test_set_delay_moves_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        d.schedule((), t0);
        d.set_delay(ms(100));
        assert_eq!(d.delay(), ms(100));
        assert_eq!(d.deadline(), Some(t0 + ms(100)));
    }
}
