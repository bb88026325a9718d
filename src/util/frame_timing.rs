use web_time::{Duration, Instant};

/// Smoothed frame-rate tracking with periodic reporting.
pub struct FrameTiming {
    /// Timestamp of the previous frame, if any
    last_frame: Option<Instant>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    /// When the FPS was last reported
    last_report: Option<Instant>,
    /// Minimum time between reports
    report_interval: Duration,
}

impl FrameTiming {
    /// Create a frame timer that reports at most once per `report_interval`.
    #[must_use]
    pub fn new(report_interval: Duration) -> Self {
        Self {
            last_frame: None,
            smoothed_fps: 60.0,
            smoothing: 0.05,
            last_report: None,
            report_interval,
        }
    }

    /// Record a frame boundary at `now`. Returns the time since the previous
    /// frame in seconds (zero for the first frame).
    pub fn tick(&mut self, now: Instant) -> f32 {
        let Some(prev) = self.last_frame.replace(now) else {
            return 0.0;
        };
        let frame_time = now.saturating_duration_since(prev).as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        frame_time
    }

    /// Whether the report interval has elapsed since the last report. Marks
    /// a report as made when it returns `true`.
    pub fn should_report(&mut self, now: Instant) -> bool {
        let due = self.last_report.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.report_interval
        });
        if due {
            self.last_report = Some(now);
        }
        due
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_delta() {
        let mut timing = FrameTiming::default();
        assert_eq!(timing.tick(Instant::now()), 0.0);
        assert_eq!(timing.fps(), 60.0);
    }

    #[test]
    fn fps_moves_toward_frame_rate() {
        let mut timing = FrameTiming::default();
        let t0 = Instant::now();
        let _ = timing.tick(t0);
        for i in 1..=400 {
            let _ = timing.tick(t0 + Duration::from_millis(i * 20));
        }
        assert!((timing.fps() - 50.0).abs() < 0.5);
    }

    #[test]
    fn reports_once_per_interval() {
        let mut timing = FrameTiming::new(Duration::from_secs(5));
        let t0 = Instant::now();
        assert!(timing.should_report(t0));
        assert!(!timing.should_report(t0 + Duration::from_secs(4)));
        assert!(timing.should_report(t0 + Duration::from_secs(5)));
    }
}
