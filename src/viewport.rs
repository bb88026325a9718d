//! Window geometry and the render resolution derived from it.

/// Render target size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Viewport dimensions in logical (device-independent) pixels plus the
/// device pixel ratio, clamped to `max_pixel_ratio` for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    device_pixel_ratio: f64,
    max_pixel_ratio: f64,
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

impl Viewport {
    /// Create a viewport. Non-positive dimensions are raised to one pixel
    /// so the aspect ratio stays defined.
    #[must_use]
    pub fn new(width: f32, height: f32, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width: if positive(width) { width } else { 1.0 },
            height: if positive(height) { height } else { 1.0 },
            device_pixel_ratio: sanitize_ratio(device_pixel_ratio),
            max_pixel_ratio: sanitize_ratio(max_pixel_ratio),
        }
    }

    /// Apply a resize event. Returns the new render resolution, or `None`
    /// (leaving the viewport untouched) when either dimension is zero,
    /// negative, or not finite.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f64) -> Option<Resolution> {
        if !positive(width) || !positive(height) {
            log::debug!("ignoring resize to {width}x{height}");
            return None;
        }
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = sanitize_ratio(device_pixel_ratio);
        let resolution = self.resolution();
        log::debug!(
            "viewport {}x{} @ {:.2} -> {}x{}",
            self.width,
            self.height,
            self.pixel_ratio(),
            resolution.width,
            resolution.height
        );
        Some(resolution)
    }

    /// Change the pixel-ratio cap. Returns the resulting resolution.
    pub fn set_max_pixel_ratio(&mut self, max_pixel_ratio: f64) -> Resolution {
        self.max_pixel_ratio = sanitize_ratio(max_pixel_ratio);
        self.resolution()
    }

    /// Width in logical pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height in logical pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Device pixel ratio used for rendering: `min(dpr, max_pixel_ratio)`.
    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Render target size: logical size scaled by [`pixel_ratio`](Self::pixel_ratio).
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        let ratio = self.pixel_ratio();
        let scale = |v: f32| (f64::from(v) * ratio).round().max(1.0) as u32;
        Resolution {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_clamps_pixel_ratio() {
        let mut vp = Viewport::new(100.0, 100.0, 1.0, 2.0);
        let res = vp.resize(1920.0, 1080.0, 3.0).unwrap();
        assert_eq!((res.width, res.height), (3840, 2160));
        let res = vp.resize(1920.0, 1080.0, 1.5).unwrap();
        assert_eq!((res.width, res.height), (2880, 1620));
        assert!((vp.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn latest_resize_wins() {
        let mut vp = Viewport::new(1920.0, 1080.0, 1.0, 2.0);
        let _ = vp.resize(1024.0, 768.0, 1.0);
        let res = vp.resize(800.0, 600.0, 2.0).unwrap();
        assert_eq!((res.width, res.height), (1600, 1200));
        assert!((vp.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(vp.resolution(), res);
    }

    #[test]
    fn zero_size_is_a_no_op() {
        let mut vp = Viewport::new(800.0, 600.0, 1.0, 2.0);
        let before = vp;
        assert!(vp.resize(0.0, 600.0, 1.0).is_none());
        assert!(vp.resize(800.0, 0.0, 1.0).is_none());
        assert!(vp.resize(f32::NAN, 600.0, 1.0).is_none());
        assert_eq!(vp, before);
        assert!(vp.aspect().is_finite());
    }

    #[test]
    fn invalid_ratio_falls_back_to_one() {
        let mut vp = Viewport::new(0.0, 0.0, 0.0, 2.0);
        assert_eq!(vp.resolution(), Resolution { width: 1, height: 1 });
        let res = vp.resize(640.0, 480.0, f64::NAN).unwrap();
        assert_eq!((res.width, res.height), (640, 480));
        assert_eq!(vp.set_max_pixel_ratio(0.5), Resolution { width: 320, height: 240 });
    }
}
