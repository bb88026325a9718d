use serde::{Deserialize, Serialize};

/// Actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// dismiss_overlay = "Escape"
/// reset_camera = "KeyR"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Hide the information overlay.
    DismissOverlay,
    /// Return the camera to its initial view.
    ResetCamera,
    /// Write the current options to the preset directory.
    SavePreset,
}
