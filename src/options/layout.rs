use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How each body's starting angle on its circle is drawn.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    /// `2π / u + 4` with `u` uniform in (0, 1]. Heavy-tailed.
    #[default]
    Legacy,
    /// `u · 2π` with `u` uniform in [0, 1).
    Uniform,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[schemars(title = "Layout", inline)]
#[serde(default)]
/// Procedural placement parameters.
pub struct LayoutOptions {
    /// Seed for the angle generator. `None` draws a fresh seed each run.
    #[schemars(skip)]
    pub seed: Option<u64>,
    /// Starting-angle distribution.
    #[schemars(title = "Angle Mode")]
    pub angle_mode: AngleMode,
}
