//! View frustum for culling bodies outside the camera's view.

use glam::{Mat4, Vec3, Vec4};

/// Six inward-facing planes (`xyz` = unit normal, `w` = offset) in the
/// order left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a `[0, 1]`-depth view-projection matrix
    /// (Gribb/Hartmann).
    #[must_use]
    pub fn from_view_projection(vp: Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];
        let raw = [
            rows[3] + rows[0],
            rows[3] - rows[0],
            rows[3] + rows[1],
            rows[3] - rows[1],
            rows[2],
            rows[3] - rows[2],
        ];
        Self {
            planes: raw.map(|p| {
                let len = p.truncate().length();
                if len > 0.0 {
                    p / len
                } else {
                    Vec4::ZERO
                }
            }),
        }
    }

    /// Whether any part of the sphere is inside the frustum.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center) + p.w >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::options::CameraOptions;

    #[test]
    fn culls_bodies_behind_and_beyond() {
        let camera = Camera::from_options(&CameraOptions::default(), 1.0);
        let frustum = Frustum::from_view_projection(camera.build_matrix());
        // The star in front of the camera.
        assert!(frustum.intersects_sphere(Vec3::ZERO, 5.0));
        // Behind the eye.
        assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 30.0), 1.0));
        // Past the far plane.
        assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, -300.0), 1.0));
        // Straddling the left edge.
        assert!(frustum.intersects_sphere(Vec3::new(-16.0, 0.0, 0.0), 2.0));
    }
}
