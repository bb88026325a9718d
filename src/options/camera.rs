use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and orbit-control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 120.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Distance from the focus point at startup and after a reset.
    #[schemars(skip)]
    pub initial_distance: f32,
    /// Whether orbit input is applied with inertial damping.
    #[schemars(title = "Damping")]
    pub enable_damping: bool,
    /// Fraction of the remaining orbit delta applied per update.
    #[schemars(title = "Damping Factor", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Closest allowed zoom distance.
    #[schemars(title = "Min Distance", range(min = 1.0, max = 100.0), extend("step" = 1.0))]
    pub min_distance: f32,
    /// Farthest allowed zoom distance.
    #[schemars(title = "Max Distance", range(min = 10.0, max = 240.0), extend("step" = 1.0))]
    pub max_distance: f32,
    /// Rotation sensitivity in radians per pixel of drag.
    #[schemars(title = "Rotate Speed", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub rotate_speed: f32,
    /// Pan sensitivity as a fraction of the current distance per pixel.
    #[schemars(title = "Pan Speed", range(min = 0.0001, max = 0.01), extend("step" = 0.0001))]
    pub pan_speed: f32,
    /// Zoom sensitivity per scroll line.
    #[schemars(title = "Zoom Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 90.0,
            znear: 0.1,
            zfar: 250.0,
            initial_distance: 15.0,
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 10.0,
            max_distance: 80.0,
            rotate_speed: 0.005,
            pan_speed: 0.0015,
            zoom_speed: 0.1,
        }
    }
}
