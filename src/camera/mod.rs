//! Camera system: perspective camera, damped orbit controller, pointer
//! rays and frustum culling.

/// Damped orbit controller driving a [`Camera`].
pub mod controller;
/// Core camera struct and GPU uniform type.
pub mod core;
/// View frustum extraction and sphere tests.
pub mod frustum;
/// World-space rays for hit-testing.
pub mod ray;

pub use self::core::{Camera, CameraUniform};
pub use controller::OrbitController;
pub use frustum::Frustum;
pub use ray::Ray;
