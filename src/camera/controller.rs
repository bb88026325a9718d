use glam::{Quat, Vec2, Vec3};

use super::core::Camera;
use crate::options::CameraOptions;

/// Remaining input below this magnitude is dropped instead of decaying
/// forever.
const SETTLE_EPSILON: f32 = 1e-4;

/// `options` with unusable limits replaced by their defaults: non-finite or
/// negative distances, and a non-finite damping factor.
fn sanitized(options: &CameraOptions) -> CameraOptions {
    let defaults = CameraOptions::default();
    let mut out = options.clone();
    let usable = |v: f32| v.is_finite() && v >= 0.0;
    if !usable(out.min_distance) || !usable(out.max_distance) {
        log::warn!(
            "camera distance limits {}..{} unusable, using defaults",
            out.min_distance,
            out.max_distance
        );
        out.min_distance = defaults.min_distance;
        out.max_distance = defaults.max_distance;
    }
    if !usable(out.initial_distance) {
        out.initial_distance = defaults.initial_distance;
    }
    if !out.damping_factor.is_finite() {
        out.damping_factor = defaults.damping_factor;
    }
    out
}

/// Orbit camera around a focus point with inertial damping.
///
/// Input methods only accumulate deltas; [`update`](Self::update) applies
/// them once per frame. With damping enabled each update applies
/// `damping_factor` of what is left, so motion eases out over several
/// frames after the pointer stops.
pub struct OrbitController {
    orientation: Quat,
    distance: f32,
    focus_point: Vec3,

    /// The camera this controller drives.
    pub camera: Camera,

    pending_rotate: Vec2,
    pending_pan: Vec2,
    pending_zoom: f32,

    options: CameraOptions,
}

impl OrbitController {
    /// Controller at the initial view for `options`.
    #[must_use]
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let options = sanitized(options);
        let mut controller = Self {
            orientation: Quat::IDENTITY,
            distance: options.initial_distance,
            focus_point: Vec3::ZERO,
            camera: Camera::from_options(&options, aspect),
            pending_rotate: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            pending_zoom: 0.0,
            options,
        };
        controller.clamp_distance();
        controller.update_camera_pos();
        controller
    }

    /// Replace tuning parameters (speeds, damping, limits, projection).
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.options = sanitized(options);
        self.camera.fovy = options.fovy;
        self.camera.znear = options.znear;
        self.camera.zfar = options.zfar;
        self.clamp_distance();
        self.update_camera_pos();
    }

    /// Queue an orbit by a pointer drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.pending_rotate += delta;
    }

    /// Queue a pan by a pointer drag of `delta` pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.pending_pan += delta;
    }

    /// Queue a zoom by `lines` scroll lines (positive = closer).
    pub fn zoom(&mut self, lines: f32) {
        self.pending_zoom += lines;
    }

    /// Apply queued input. Returns `true` if the camera moved.
    pub fn update(&mut self) -> bool {
        let fraction = if self.options.enable_damping {
            self.options.damping_factor.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let rotate = self.pending_rotate * fraction;
        let pan = self.pending_pan * fraction;
        let zoom = self.pending_zoom * fraction;
        self.pending_rotate -= rotate;
        self.pending_pan -= pan;
        self.pending_zoom -= zoom;
        if self.pending_rotate.length() < SETTLE_EPSILON {
            self.pending_rotate = Vec2::ZERO;
        }
        if self.pending_pan.length() < SETTLE_EPSILON {
            self.pending_pan = Vec2::ZERO;
        }
        if self.pending_zoom.abs() < SETTLE_EPSILON {
            self.pending_zoom = 0.0;
        }

        let before = (self.orientation, self.distance, self.focus_point);
        if rotate != Vec2::ZERO {
            self.apply_rotation(rotate);
        }
        if pan != Vec2::ZERO {
            let right = self.orientation * Vec3::X;
            let up = self.orientation * Vec3::Y;
            let scale = self.options.pan_speed * self.distance;
            self.focus_point += right * (-pan.x * scale) + up * (pan.y * scale);
        }
        if zoom != 0.0 {
            self.distance *= (1.0 - self.options.zoom_speed).powf(zoom);
        }
        self.clamp_distance();
        self.update_camera_pos();
        before != (self.orientation, self.distance, self.focus_point)
    }

    /// Whether queued input is still being applied.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.pending_rotate != Vec2::ZERO
            || self.pending_pan != Vec2::ZERO
            || self.pending_zoom != 0.0
    }

    /// Return to the initial view and drop queued input.
    pub fn reset(&mut self) {
        self.orientation = Quat::IDENTITY;
        self.distance = self.options.initial_distance;
        self.focus_point = Vec3::ZERO;
        self.pending_rotate = Vec2::ZERO;
        self.pending_pan = Vec2::ZERO;
        self.pending_zoom = 0.0;
        self.clamp_distance();
        self.update_camera_pos();
    }

    /// Current distance from the focus point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Current focus point.
    #[must_use]
    pub fn focus_point(&self) -> Vec3 {
        self.focus_point
    }

    /// Yaw around world up, then pitch around the camera's right axis.
    fn apply_rotation(&mut self, delta: Vec2) {
        let speed = self.options.rotate_speed;
        let yaw = Quat::from_axis_angle(Vec3::Y, -delta.x * speed);
        self.orientation = (yaw * self.orientation).normalize();
        let right = self.orientation * Vec3::X;
        let pitch = Quat::from_axis_angle(right, -delta.y * speed);
        self.orientation = (pitch * self.orientation).normalize();
    }

    fn clamp_distance(&mut self) {
        let min = self.options.min_distance;
        let max = self.options.max_distance.max(min);
        self.distance = self.distance.clamp(min, max);
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;
        self.camera.eye = self.focus_point + dir * self.distance;
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undamped() -> CameraOptions {
        CameraOptions {
            enable_damping: false,
            ..CameraOptions::default()
        }
    }

    #[test]
    fn starts_at_initial_distance() {
        let controller = OrbitController::new(&CameraOptions::default(), 1.0);
        assert_eq!(controller.camera.eye, Vec3::new(0.0, 0.0, 15.0));
        assert_eq!(controller.camera.target, Vec3::ZERO);
    }

    #[test]
    fn input_waits_for_update() {
        let mut controller = OrbitController::new(&undamped(), 1.0);
        controller.rotate(Vec2::new(100.0, 0.0));
        assert_eq!(controller.camera.eye, Vec3::new(0.0, 0.0, 15.0));
        assert!(controller.update());
        assert!((controller.camera.eye.length() - 15.0).abs() < 1e-4);
        assert!(controller.camera.eye.x.abs() > 1.0);
        assert!(!controller.update());
    }

    #[test]
    fn damping_eases_out() {
        let opts = CameraOptions::default();
        let mut controller = OrbitController::new(&opts, 1.0);
        controller.rotate(Vec2::new(200.0, 0.0));
        let start = controller.camera.eye;
        assert!(controller.update());
        let first_step = controller.camera.eye.distance(start);
        assert!(controller.is_settling());

        let mid = controller.camera.eye;
        assert!(controller.update());
        let second_step = controller.camera.eye.distance(mid);
        assert!(second_step < first_step);

        for _ in 0..1000 {
            let _ = controller.update();
        }
        assert!(!controller.is_settling());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut controller = OrbitController::new(&undamped(), 1.0);
        controller.zoom(1000.0);
        let _ = controller.update();
        assert!((controller.distance() - 10.0).abs() < 1e-5);
        controller.zoom(-1000.0);
        let _ = controller.update();
        assert!((controller.distance() - 80.0).abs() < 1e-5);
    }

    #[test]
    fn non_finite_limits_fall_back_to_defaults() {
        let options = crate::options::Options::from_toml_str(
            "[camera]\nmin_distance = nan\nmax_distance = inf\ndamping_factor = nan\n",
        )
        .unwrap();
        let mut controller = OrbitController::new(&options.camera, 1.0);
        assert!((controller.distance() - 15.0).abs() < 1e-5);
        controller.zoom(1000.0);
        for _ in 0..1000 {
            let _ = controller.update();
        }
        assert!((controller.distance() - 10.0).abs() < 1e-4);
        assert!(controller.camera.eye.is_finite());

        let mut live = OrbitController::new(&undamped(), 1.0);
        let mut bad = undamped();
        bad.min_distance = -3.0;
        live.apply_options(&bad);
        live.zoom(-1000.0);
        let _ = live.update();
        assert!((live.distance() - 80.0).abs() < 1e-5);
    }

    #[test]
    fn pan_moves_focus_and_reset_restores() {
        let mut controller = OrbitController::new(&undamped(), 1.0);
        controller.pan(Vec2::new(10.0, 0.0));
        let _ = controller.update();
        assert!(controller.focus_point().x < 0.0);
        controller.reset();
        assert_eq!(controller.focus_point(), Vec3::ZERO);
        assert_eq!(controller.camera.eye, Vec3::new(0.0, 0.0, 15.0));
    }
}
