use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Render resolution, background, and lighting parameters.
pub struct DisplayOptions {
    /// Upper bound on the device pixel ratio used for the render target.
    #[schemars(title = "Max Pixel Ratio", range(min = 0.5, max = 4.0), extend("step" = 0.25))]
    pub max_pixel_ratio: f64,
    /// Brightness multiplier of the environment backdrop.
    #[schemars(title = "Background Intensity", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub background_intensity: f32,
    /// Blur of the environment backdrop (0 = sharp).
    #[schemars(title = "Background Blur", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub background_blurriness: f32,
    /// Strength of the environment contribution to body lighting.
    #[schemars(title = "Env Map Intensity", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub env_map_intensity: f32,
    /// Ambient light intensity.
    #[schemars(title = "Ambient", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub ambient_intensity: f32,
    /// Intensity of the point light at the star.
    #[schemars(title = "Sun Light", range(min = 0.0, max = 300.0), extend("step" = 1.0))]
    pub sun_light_intensity: f32,
    /// Distance at which the star's light reaches zero (0 = unbounded).
    #[schemars(skip)]
    pub sun_light_range: f32,
    /// Physical falloff exponent of the star's light.
    #[schemars(skip)]
    pub sun_light_decay: f32,
    /// Clear color used before the environment map arrives.
    #[schemars(skip)]
    pub clear_color: [f32; 3],
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            background_intensity: 0.5,
            background_blurriness: 0.0,
            env_map_intensity: 1.0,
            ambient_intensity: 0.1,
            sun_light_intensity: 100.0,
            sun_light_range: 100.0,
            sun_light_decay: 1.2,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}
