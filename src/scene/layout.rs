//! Procedural placement of bodies on circles around the origin and
//! assembly of composite (grouped) bodies.

use std::f64::consts::TAU;
use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::geometry::Geometry;
use super::node::{Material, NodeId, Transform};
use super::{Scene, SceneError};
use crate::options::AngleMode;

/// Point on a circle of `radius` in the XZ plane (`y` = 0).
///
/// The angle is taken in `f64` so very large seeded angles keep their
/// precision through the trigonometry.
#[must_use]
pub fn position_on_circle(radius: f32, angle: f64) -> Vec3 {
    let r = f64::from(radius);
    Vec3::new((r * angle.cos()) as f32, 0.0, (r * angle.sin()) as f32)
}

/// Source of starting angles for placed bodies.
#[derive(Debug, Clone)]
pub struct AngleSeeder {
    rng: StdRng,
    mode: AngleMode,
}

impl AngleSeeder {
    /// Seeded generator; `None` draws the seed from OS entropy.
    #[must_use]
    pub fn new(mode: AngleMode, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng, mode }
    }

    /// Next starting angle in radians.
    ///
    /// [`AngleMode::Legacy`] yields `2π / u + 4` for `u` in (0, 1], which is
    /// at least `2π + 4` and unbounded above. [`AngleMode::Uniform`] yields
    /// a value in [0, 2π).
    pub fn next_angle(&mut self) -> f64 {
        let u: f64 = self.rng.random();
        match self.mode {
            AngleMode::Legacy => TAU / (1.0 - u) + 4.0,
            AngleMode::Uniform => u * TAU,
        }
    }
}

/// One mesh of a composite body.
#[derive(Debug, Clone)]
pub struct Part {
    /// Node name.
    pub name: String,
    /// Shape.
    pub geometry: Geometry,
    /// Surface.
    pub material: Material,
}

/// Rotation applied to auxiliary parts (rings) relative to the primary:
/// a quarter turn about X, laying an XY-plane ring into the XZ plane.
#[must_use]
pub fn auxiliary_rotation() -> Quat {
    Quat::from_rotation_x(FRAC_PI_2)
}

/// Build a group holding `primary` plus `auxiliary` parts under `parent`.
///
/// Auxiliary parts are rotated by [`auxiliary_rotation`] before being
/// added; the primary keeps an identity transform. The group itself is
/// left at the origin so the caller positions the whole assembly.
pub fn assemble_composite(
    scene: &mut Scene,
    parent: NodeId,
    name: &str,
    primary: Part,
    auxiliary: Vec<Part>,
) -> Result<NodeId, SceneError> {
    let group = scene.add_group(name, parent)?;
    for part in auxiliary {
        let id = scene.add_mesh(&part.name, group, part.geometry, part.material)?;
        scene.set_transform(id, Transform::from_rotation(auxiliary_rotation()))?;
    }
    let _ = scene.add_mesh(&primary.name, group, primary.geometry, primary.material)?;
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_positions_have_requested_radius() {
        let mut seeder = AngleSeeder::new(AngleMode::Legacy, Some(11));
        for r in [0.5_f32, 1.0, 10.0, 23.0, 50.0] {
            for _ in 0..50 {
                let p = position_on_circle(r, seeder.next_angle());
                assert_eq!(p.y, 0.0);
                assert!((p.x * p.x + p.z * p.z - r * r).abs() < 1e-3 * r * r);
            }
        }
    }

    #[test]
    fn circle_cardinal_angles() {
        let p = position_on_circle(10.0, 0.0);
        assert!((p - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
        let p = position_on_circle(10.0, std::f64::consts::FRAC_PI_2);
        assert!((p - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        let p = position_on_circle(10.0, std::f64::consts::PI);
        assert!((p - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn same_seed_same_angles() {
        let mut a = AngleSeeder::new(AngleMode::Legacy, Some(42));
        let mut b = AngleSeeder::new(AngleMode::Legacy, Some(42));
        for _ in 0..20 {
            assert_eq!(a.next_angle(), b.next_angle());
        }
    }

    #[test]
    fn legacy_angles_are_heavy_tailed() {
        let mut seeder = AngleSeeder::new(AngleMode::Legacy, Some(3));
        for _ in 0..1000 {
            let angle = seeder.next_angle();
            assert!(angle.is_finite());
            assert!(angle >= TAU + 4.0 - 1e-9);
        }
    }

    #[test]
    fn uniform_angles_stay_in_one_turn() {
        let mut seeder = AngleSeeder::new(AngleMode::Uniform, Some(3));
        for _ in 0..1000 {
            let angle = seeder.next_angle();
            assert!((0.0..TAU).contains(&angle));
        }
    }

    #[test]
    fn composite_ring_is_rotated_and_group_is_positioned() {
        let mut scene = Scene::new();
        let root = scene.root();
        let group = assemble_composite(
            &mut scene,
            root,
            "saturn",
            Part {
                name: "saturn-sphere".into(),
                geometry: Geometry::Sphere {
                    radius: 2.0,
                    width_segments: 8,
                    height_segments: 6,
                },
                material: Material::lit(),
            },
            vec![Part {
                name: "saturn-rings".into(),
                geometry: Geometry::Ring {
                    inner_radius: 2.5,
                    outer_radius: 4.0,
                    theta_segments: 30,
                },
                material: Material::lit(),
            }],
        )
        .unwrap();

        let pos = position_on_circle(40.0, 1.0);
        scene.set_position(group, pos).unwrap();

        let children = scene.node(group).unwrap().children.clone();
        assert_eq!(children.len(), 2);
        let ring = scene.find("saturn-rings").unwrap();
        let sphere = scene.find("saturn-sphere").unwrap();
        assert_eq!(scene.node(ring).unwrap().transform.translation, Vec3::ZERO);
        assert_eq!(scene.node(sphere).unwrap().transform.translation, Vec3::ZERO);

        // A point on the ring's local +Y axis ends up along world +Z.
        let world = scene.world_matrix(ring).unwrap();
        let p = world.transform_point3(Vec3::new(0.0, 3.0, 0.0));
        assert!((p - (pos + Vec3::new(0.0, 0.0, 3.0))).length() < 1e-4);

        let sphere_center = scene.world_matrix(sphere).unwrap().transform_point3(Vec3::ZERO);
        assert!((sphere_center - pos).length() < 1e-5);
    }
}
