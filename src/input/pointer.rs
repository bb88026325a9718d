use glam::Vec2;

/// Map a pointer position to normalized device coordinates.
///
/// The top-left pixel maps to (-1, 1), the bottom-right to (1, -1) and the
/// center to (0, 0). Returns `None` for a non-positive or non-finite
/// viewport, where the mapping is undefined.
#[must_use]
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> Option<Vec2> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(width) || !valid(height) || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0))
}

/// Last pointer position in normalized device coordinates.
///
/// Updated only on pointer movement; a resize leaves the value as it was
/// until the next move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    ndc: Vec2,
    moved: bool,
}

impl PointerState {
    /// Pointer at the viewport center, not yet moved.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move to (`x`, `y`) logical pixels in a `width` × `height`
    /// viewport. Returns `false` (leaving the state unchanged) when the
    /// input cannot be mapped.
    pub fn on_move(&mut self, x: f32, y: f32, width: f32, height: f32) -> bool {
        match to_ndc(x, y, width, height) {
            Some(ndc) => {
                self.ndc = ndc;
                self.moved = true;
                true
            }
            None => false,
        }
    }

    /// Current normalized device coordinates.
    #[must_use]
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    /// Whether any pointer movement has been observed.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn corners_and_center() {
        for (w, h) in [(1920.0, 1080.0), (800.0, 600.0), (1.0, 1.0), (333.0, 77.0)] {
            assert!(close(to_ndc(0.0, 0.0, w, h).unwrap(), Vec2::new(-1.0, 1.0)));
            assert!(close(to_ndc(w, h, w, h).unwrap(), Vec2::new(1.0, -1.0)));
            assert!(close(to_ndc(w / 2.0, h / 2.0, w, h).unwrap(), Vec2::ZERO));
            assert!((to_ndc(w, 0.0, w, h).unwrap().x - 1.0).abs() < 1e-6);
            assert!((to_ndc(0.0, h, w, h).unwrap().y + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_viewport_is_rejected() {
        assert!(to_ndc(10.0, 10.0, 0.0, 600.0).is_none());
        assert!(to_ndc(10.0, 10.0, 800.0, 0.0).is_none());
        assert!(to_ndc(10.0, 10.0, -1.0, 600.0).is_none());
        assert!(to_ndc(f32::NAN, 10.0, 800.0, 600.0).is_none());
    }

    #[test]
    fn bad_move_keeps_previous_value() {
        let mut pointer = PointerState::new();
        assert!(!pointer.has_moved());
        assert!(pointer.on_move(960.0, 540.0, 1920.0, 1080.0));
        assert!(close(pointer.ndc(), Vec2::ZERO));
        assert!(!pointer.on_move(5.0, 5.0, 0.0, 0.0));
        assert!(close(pointer.ndc(), Vec2::ZERO));
        assert!(pointer.has_moved());
    }
}
