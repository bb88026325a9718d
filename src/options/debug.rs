use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Diagnostic logging toggles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Debug", inline)]
#[serde(default)]
pub struct DebugOptions {
    /// Log the smoothed frame rate every few seconds.
    #[schemars(title = "Log FPS")]
    pub log_fps: bool,
    /// Log hover transitions.
    #[schemars(title = "Log Hover")]
    pub show_hover_log: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            log_fps: false,
            show_hover_log: true,
        }
    }
}
