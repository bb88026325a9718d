//! Pointer interaction: hover state, ray hit-testing against a candidate
//! set of bodies, and the information overlay.

/// Information overlay state.
pub mod overlay;

pub use hit_test::HitTester;
pub use overlay::InfoOverlay;

use crate::scene::BodyId;

/// Which candidate body, if any, the pointer ray currently intersects.
///
/// Re-evaluated every frame from that frame's hit-test result; a body stays
/// hovered only while the ray keeps hitting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// The ray misses every candidate.
    #[default]
    NoHover,
    /// The ray's nearest candidate hit.
    Hovering(BodyId),
}

impl InteractionState {
    /// Replace the state with this frame's hit result. Returns `true` if
    /// the state changed.
    pub fn update(&mut self, hit: Option<BodyId>) -> bool {
        let next = hit.map_or(Self::NoHover, Self::Hovering);
        let changed = next != *self;
        *self = next;
        changed
    }

    /// The hovered body, if any.
    #[must_use]
    pub fn current_intersecting_object(&self) -> Option<BodyId> {
        match self {
            Self::NoHover => None,
            Self::Hovering(id) => Some(*id),
        }
    }

    /// Whether a body is hovered.
    #[must_use]
    pub fn is_intersecting(&self) -> bool {
        matches!(self, Self::Hovering(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_triggered_transitions() {
        let b = BodyId(3);
        let mut state = InteractionState::default();
        assert!(!state.is_intersecting());

        assert!(state.update(Some(b)));
        assert_eq!(state, InteractionState::Hovering(b));
        assert_eq!(state.current_intersecting_object(), Some(b));

        assert!(!state.update(Some(b)));
        assert!(state.is_intersecting());

        assert!(state.update(None));
        assert_eq!(state, InteractionState::NoHover);
        assert_eq!(state.current_intersecting_object(), None);
    }

    #[test]
    fn switching_bodies_is_a_change() {
        let mut state = InteractionState::Hovering(BodyId(0));
        assert!(state.update(Some(BodyId(1))));
        assert_eq!(state.current_intersecting_object(), Some(BodyId(1)));
    }
}
