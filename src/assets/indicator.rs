use web_time::{Duration, Instant};

/// Visibility of the loading indicator.
///
/// Stays visible until the barrier fires, then lingers for the settle delay
/// so it does not flash off on the same frame the last asset lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingIndicator {
    /// Assets are still loading.
    #[default]
    Visible,
    /// Everything loaded; hide at `until`.
    Settling {
        /// When the indicator hides.
        until: Instant,
    },
    /// Gone for the rest of the run.
    Hidden,
}

impl LoadingIndicator {
    /// Start the settle delay. Only the first call has an effect.
    pub fn begin_settle(&mut self, now: Instant, delay: Duration) {
        if *self == Self::Visible {
            *self = Self::Settling { until: now + delay };
        }
    }

    /// Advance to `Hidden` once the settle delay has elapsed. Returns
    /// `true` on the transition.
    pub fn update(&mut self, now: Instant) -> bool {
        match *self {
            Self::Settling { until } if now >= until => {
                *self = Self::Hidden;
                true
            }
            _ => false,
        }
    }

    /// Whether the indicator should be drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}
