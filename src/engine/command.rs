//! The scene's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture or a programmatic call, is a `SceneCommand` passed to
//! [`SceneContext::execute`](super::SceneContext::execute).

use glam::Vec2;

/// A discrete or parameterized operation the scene can perform.
///
/// ```ignore
/// ctx.execute(SceneCommand::Zoom { delta: 1.0 });
/// ctx.execute(SceneCommand::DismissOverlay);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    // ── Camera ──────────────────────────────────────────────────────
    /// Orbit the camera by `delta` pixels of mouse movement.
    RotateCamera {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },

    /// Pan the camera by `delta` pixels of mouse movement.
    PanCamera {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },

    /// Zoom the camera (positive = zoom in, negative = zoom out).
    Zoom {
        /// Scroll amount.
        delta: f32,
    },

    /// Return the camera to its initial view.
    ResetCamera,

    // ── Interaction ─────────────────────────────────────────────────
    /// Inspect the hovered body, if any.
    Click,

    /// Hide the information overlay.
    DismissOverlay,

    // ── Options ─────────────────────────────────────────────────────
    /// Write the current options to the preset directory.
    SavePreset,
}
