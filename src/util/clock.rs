//! Monotonic elapsed-time source sampled once per frame.

use web_time::Instant;

/// Owns the start instant of the run and reports elapsed seconds.
///
/// Readings never decrease, even if the platform timer is coarse or jumps
/// backwards; the clock is never reset while the program runs.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
    last: f64,
}

impl Clock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start a clock at an explicit instant.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self { start, last: 0.0 }
    }

    /// The instant the clock was started.
    #[must_use]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Elapsed seconds since start, sampled now.
    pub fn elapsed_secs(&mut self) -> f64 {
        self.sample_at(Instant::now())
    }

    /// Elapsed seconds since start as of `now`.
    ///
    /// An instant earlier than a previous sample returns the previous value.
    pub fn sample_at(&mut self, now: Instant) -> f64 {
        let secs = now
            .checked_duration_since(self.start)
            .map_or(0.0, |d| d.as_secs_f64());
        self.last = self.last.max(secs);
        self.last
    }

    /// The most recent reading, without sampling.
    #[must_use]
    pub fn last_secs(&self) -> f64 {
        self.last
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;

    #[test]
    fn starts_at_zero() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(t0);
        assert_eq!(clock.sample_at(t0), 0.0);
    }

    #[test]
    fn reports_elapsed_seconds() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(t0);
        let secs = clock.sample_at(t0 + Duration::from_millis(1500));
        assert!((secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn never_decreases() {
        let t0 = Instant::now();
        let mut clock = Clock::starting_at(t0 + Duration::from_secs(1));
        let later = clock.sample_at(t0 + Duration::from_secs(3));
        let earlier = clock.sample_at(t0 + Duration::from_secs(2));
        let before_start = clock.sample_at(t0);
        assert!((later - 2.0).abs() < 1e-9);
        assert_eq!(earlier, later);
        assert_eq!(before_start, later);
    }

    #[test]
    fn live_readings_are_monotonic() {
        let mut clock = Clock::new();
        let mut prev = clock.elapsed_secs();
        for _ in 0..100 {
            let now = clock.elapsed_secs();
            assert!(now >= prev);
            prev = now;
        }
        assert_eq!(clock.last_secs(), prev);
    }
}
