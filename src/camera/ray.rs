use glam::{Vec2, Vec3};

use super::core::Camera;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Ray from the camera eye through a point in normalized device
    /// coordinates (`x`, `y` in [-1, 1], +Y up).
    #[must_use]
    pub fn from_ndc(ndc: Vec2, camera: &Camera) -> Self {
        let inv = camera.build_matrix().inverse();
        let on_far = inv.project_point3(ndc.extend(1.0));
        let direction = (on_far - camera.eye)
            .try_normalize()
            .unwrap_or_else(|| (camera.target - camera.eye).normalize_or_zero());
        Self {
            origin: camera.eye,
            direction,
        }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first point on the sphere's surface
    /// in front of the origin. From inside the sphere this is the exit
    /// point.
    #[must_use]
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CameraOptions;

    fn camera() -> Camera {
        Camera::from_options(&CameraOptions::default(), 16.0 / 9.0)
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = camera();
        let ray = Ray::from_ndc(Vec2::ZERO, &cam);
        assert_eq!(ray.origin, cam.eye);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn corner_rays_diverge() {
        let cam = camera();
        let top_left = Ray::from_ndc(Vec2::new(-1.0, 1.0), &cam);
        assert!(top_left.direction.x < 0.0);
        assert!(top_left.direction.y > 0.0);
        // Vertical half-angle matches half the field of view.
        let top = Ray::from_ndc(Vec2::new(0.0, 1.0), &cam);
        let angle = top.direction.angle_between(Vec3::NEG_Z).to_degrees();
        assert!((angle - cam.fovy / 2.0).abs() < 0.1);
    }

    #[test]
    fn sphere_hits_and_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        let t = ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
        assert!((ray.at(t) - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);

        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 2.0).is_none());
        // Behind the origin.
        assert!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 20.0), 2.0).is_none());
    }

    #[test]
    fn origin_inside_sphere_reports_exit() {
        let ray = Ray {
            origin: Vec3::ZERO,
            direction: Vec3::X,
        };
        let t = ray.intersect_sphere(Vec3::ZERO, 3.0).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }
}
