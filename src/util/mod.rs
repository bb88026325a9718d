//! Shared utilities: the run clock and frame-rate tracking.

pub mod clock;
/// Smoothed FPS tracking with a periodic report interval.
pub mod frame_timing;
