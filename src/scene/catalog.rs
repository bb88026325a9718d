//! The solar system: one star, eight planets (one ringed), lights, the
//! star-field environment and optional decorative models.
//!
//! Building the catalog places every body synchronously and returns the
//! load requests that will fill in textures, the environment and models.

use std::path::Path;

use glam::Vec3;

use super::geometry::Geometry;
use super::layout::{assemble_composite, position_on_circle, AngleSeeder, Part};
use super::node::{MapSlot, Material, NodeId};
use super::{BodyId, Light, Scene};
use crate::assets::{AttachTarget, LoadRequest, ModelFormat};
use crate::error::OrreryError;
use crate::options::Options;

/// Segments around and pole-to-pole for every body sphere.
pub const SPHERE_SEGMENTS: u32 = 100;

/// Static description of one body.
#[derive(Debug, Clone, Copy)]
pub struct BodySpec {
    /// Lookup name.
    pub name: &'static str,
    /// Sphere radius.
    pub radius: f32,
    /// Distance from the origin (0 for the star).
    pub orbit_radius: f32,
    /// Color texture, relative to the asset root.
    pub texture: &'static str,
    /// Overlay text.
    pub description: &'static str,
}

/// The star at the origin.
pub const SUN: BodySpec = BodySpec {
    name: "sun",
    radius: 5.0,
    orbit_radius: 0.0,
    texture: "textures/sun.jpg",
    description: "The Sun. A G-type main-sequence star holding 99.8% of the \
                  system's mass.",
};

/// Planets in order of increasing orbit radius.
pub const PLANETS: [BodySpec; 8] = [
    BodySpec {
        name: "mercury",
        radius: 0.5,
        orbit_radius: 10.0,
        texture: "textures/mercury.jpg",
        description: "Mercury. The smallest planet, with no moons and almost \
                      no atmosphere.",
    },
    BodySpec {
        name: "venus",
        radius: 1.0,
        orbit_radius: 15.0,
        texture: "textures/venus.jpg",
        description: "Venus. Wrapped in sulfuric-acid clouds over a surface \
                      hot enough to melt lead.",
    },
    BodySpec {
        name: "earth",
        radius: 1.0,
        orbit_radius: 23.0,
        texture: "textures/earthColorMap.jpg",
        description: "Earth. The only world known to host life, with liquid \
                      water covering most of its surface.",
    },
    BodySpec {
        name: "mars",
        radius: 0.8,
        orbit_radius: 30.0,
        texture: "textures/mars.jpg",
        description: "Mars. A cold desert world with the tallest volcano in \
                      the solar system, Olympus Mons.",
    },
    BodySpec {
        name: "jupiter",
        radius: 2.0,
        orbit_radius: 35.0,
        texture: "textures/jupiter.jpg",
        description: "Jupiter. The largest planet, a gas giant whose Great \
                      Red Spot is a storm wider than Earth.",
    },
    BodySpec {
        name: "saturn",
        radius: 2.0,
        orbit_radius: 40.0,
        texture: "textures/saturn.jpg",
        description: "Saturn. A gas giant circled by rings of ice and rock.",
    },
    BodySpec {
        name: "uranus",
        radius: 0.5,
        orbit_radius: 45.0,
        texture: "textures/uranus.jpg",
        description: "Uranus. An ice giant that rotates on its side.",
    },
    BodySpec {
        name: "neptune",
        radius: 1.0,
        orbit_radius: 50.0,
        texture: "textures/neptune.jpg",
        description: "Neptune. The outermost planet, with the fastest winds \
                      measured in the solar system.",
    },
];

/// Earth's height map and its world-space amplitude.
pub const EARTH_DISPLACEMENT: (&str, f32) = ("textures/earthDisplacementMap.jpg", 0.05);

/// Saturn's ring: inner radius, outer radius, segments, texture.
pub const SATURN_RING: (f32, f32, u32, &str) = (2.5, 4.0, 30, "textures/rings.png");

/// Equirectangular star field, relative to the asset root.
pub const ENVIRONMENT_MAP: &str = "stars2kEnvMap.hdr";

/// Handles produced by [`build`].
#[derive(Debug, Clone)]
pub struct SolarSystem {
    /// The star.
    pub sun: BodyId,
    /// Planets in catalog order.
    pub planets: Vec<BodyId>,
    /// Groups receiving decorative models.
    pub model_groups: Vec<NodeId>,
    /// Loads to register with the asset coordinator.
    pub requests: Vec<LoadRequest>,
}

fn sphere(radius: f32) -> Geometry {
    Geometry::Sphere {
        radius,
        width_segments: SPHERE_SEGMENTS,
        height_segments: SPHERE_SEGMENTS,
    }
}

fn color_target(node: NodeId) -> Vec<AttachTarget> {
    vec![AttachTarget::MaterialMap {
        node,
        slot: MapSlot::Color,
    }]
}

/// Populate `scene` with the solar system.
///
/// Body positions are drawn once here from the configured angle seeder and
/// never change afterwards.
pub fn build(scene: &mut Scene, options: &Options) -> Result<SolarSystem, OrreryError> {
    let root = scene.root();
    let mut requests = Vec::new();

    let sun_node = scene.add_mesh(SUN.name, root, sphere(SUN.radius), Material::unlit())?;
    let sun = scene.add_body(SUN.name, sun_node, SUN.radius, SUN.description)?;
    scene.place_body(sun, Vec3::ZERO)?;
    requests.push(LoadRequest::texture(SUN.texture, color_target(sun_node)));

    let mut seeder = AngleSeeder::new(options.layout.angle_mode, options.layout.seed);
    let mut planets = Vec::with_capacity(PLANETS.len());
    for spec in &PLANETS {
        let node = match spec.name {
            "saturn" => build_saturn(scene, root, spec, &mut requests)?,
            "earth" => {
                let mut material = Material::lit();
                material.displacement_scale = EARTH_DISPLACEMENT.1;
                let node = scene.add_mesh(spec.name, root, sphere(spec.radius), material)?;
                requests.push(LoadRequest::data_texture(
                    EARTH_DISPLACEMENT.0,
                    vec![AttachTarget::MaterialMap {
                        node,
                        slot: MapSlot::Displacement,
                    }],
                ));
                requests.push(LoadRequest::texture(spec.texture, color_target(node)));
                node
            }
            _ => {
                let node =
                    scene.add_mesh(spec.name, root, sphere(spec.radius), Material::lit())?;
                requests.push(LoadRequest::texture(spec.texture, color_target(node)));
                node
            }
        };
        let body = scene.add_body(spec.name, node, spec.radius, spec.description)?;
        let position = position_on_circle(spec.orbit_radius, seeder.next_angle());
        scene.place_body(body, position)?;
        log::debug!("placed {} at {position}", spec.name);
        planets.push(body);
    }

    let display = &options.display;
    scene.add_light(Light::Ambient {
        color: [1.0; 3],
        intensity: display.ambient_intensity,
    });
    scene.add_light(Light::Point {
        position: Vec3::ZERO,
        color: [1.0; 3],
        intensity: display.sun_light_intensity,
        range: display.sun_light_range,
        decay: display.sun_light_decay,
    });

    requests.push(LoadRequest::environment(ENVIRONMENT_MAP));

    let mut model_groups = Vec::new();
    for path in &options.loading.models {
        if let Err(e) = ModelFormat::from_path(Path::new(path)) {
            log::warn!("skipping model: {e}");
            continue;
        }
        let group = scene.add_group(&model_group_name(path), root)?;
        requests.push(LoadRequest::model(path.as_str(), group)?);
        model_groups.push(group);
    }

    Ok(SolarSystem {
        sun,
        planets,
        model_groups,
        requests,
    })
}

/// Lookup name of the group holding the model loaded from `path`.
fn model_group_name(path: &str) -> String {
    let file = Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(path);
    format!("model:{file}")
}

fn build_saturn(
    scene: &mut Scene,
    root: NodeId,
    spec: &BodySpec,
    requests: &mut Vec<LoadRequest>,
) -> Result<NodeId, OrreryError> {
    let (inner, outer, segments, ring_texture) = SATURN_RING;
    let mut ring_material = Material::lit();
    ring_material.transparent = true;
    ring_material.double_sided = true;

    let group = assemble_composite(
        scene,
        root,
        spec.name,
        Part {
            name: format!("{}-sphere", spec.name),
            geometry: sphere(spec.radius),
            material: Material::lit(),
        },
        vec![Part {
            name: format!("{}-rings", spec.name),
            geometry: Geometry::Ring {
                inner_radius: inner,
                outer_radius: outer,
                theta_segments: segments,
            },
            material: ring_material,
        }],
    )?;

    let mut sphere_node = None;
    let mut ring_node = None;
    if let Some(node) = scene.node(group) {
        for &child in &node.children {
            match scene.node(child).map(|c| c.name.ends_with("-rings")) {
                Some(true) => ring_node = Some(child),
                Some(false) => sphere_node = Some(child),
                None => {}
            }
        }
    }
    if let Some(sphere_node) = sphere_node {
        requests.push(LoadRequest::texture(spec.texture, color_target(sphere_node)));
    }
    if let Some(ring) = ring_node {
        requests.push(LoadRequest::texture(
            ring_texture,
            vec![
                AttachTarget::MaterialMap {
                    node: ring,
                    slot: MapSlot::Color,
                },
                AttachTarget::MaterialMap {
                    node: ring,
                    slot: MapSlot::Alpha,
                },
            ],
        ));
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use web_time::Instant;

    use super::*;
    use crate::assets::LoadingBarrier;
    use crate::scene::NodeKind;

    fn seeded(seed: u64) -> Options {
        let mut opts = Options::default();
        opts.layout.seed = Some(seed);
        opts
    }

    #[test]
    fn every_body_is_placed_on_its_orbit() {
        let mut scene = Scene::new();
        let system = build(&mut scene, &seeded(1)).unwrap();
        assert_eq!(system.planets.len(), 8);

        let sun = scene.body(system.sun).unwrap();
        assert_eq!(sun.position, Some(Vec3::ZERO));

        for (id, spec) in system.planets.iter().zip(PLANETS.iter()) {
            let body = scene.body(*id).unwrap();
            assert_eq!(body.name, spec.name);
            let p = body.position.unwrap();
            assert_eq!(p.y, 0.0);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - spec.orbit_radius).abs() < 1e-3, "{}: {r}", spec.name);
            let center = scene.body_center(*id).unwrap();
            assert!((center - p).length() < 1e-4);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = Scene::new();
        let mut b = Scene::new();
        let sa = build(&mut a, &seeded(9)).unwrap();
        let sb = build(&mut b, &seeded(9)).unwrap();
        for (x, y) in sa.planets.iter().zip(&sb.planets) {
            assert_eq!(a.body(*x).unwrap().position, b.body(*y).unwrap().position);
        }
    }

    #[test]
    fn saturn_is_a_group_with_tilted_ring() {
        let mut scene = Scene::new();
        let _ = build(&mut scene, &seeded(2)).unwrap();
        let saturn = scene.body_by_name("saturn").unwrap();
        let group = scene.node(saturn.node).unwrap();
        assert!(matches!(group.kind, NodeKind::Group));
        assert_eq!(group.children.len(), 2);
        assert!((saturn.bounding_radius - 4.0).abs() < 1e-4);

        let ring = scene.find("saturn-rings").unwrap();
        let ring_node = scene.node(ring).unwrap();
        let material = &ring_node.mesh().unwrap().material;
        assert!(material.transparent && material.double_sided);
        assert_eq!(ring_node.transform.translation, Vec3::ZERO);
    }

    #[test]
    fn load_targets_are_disjoint() {
        let mut scene = Scene::new();
        let system = build(&mut scene, &seeded(3)).unwrap();
        // sun + 8 planet colors + earth displacement + ring + environment + model
        assert_eq!(system.requests.len(), 13);
        let mut barrier = LoadingBarrier::new();
        let now = Instant::now();
        for request in &system.requests {
            assert!(barrier.register(&request.path, &request.targets, now).is_ok());
        }
    }

    #[test]
    fn unsupported_model_is_skipped() {
        let mut scene = Scene::new();
        let mut opts = seeded(4);
        opts.loading.models = vec!["Models/saturn.fbx".into()];
        let nodes_without_models = {
            let mut bare = Scene::new();
            let mut none = seeded(4);
            none.loading.models.clear();
            let _ = build(&mut bare, &none).unwrap();
            bare.node_count()
        };
        let system = build(&mut scene, &opts).unwrap();
        assert!(system.model_groups.is_empty());
        assert_eq!(system.requests.len(), 12);
        assert_eq!(scene.node_count(), nodes_without_models);
        assert!(scene.find("model:saturn.fbx").is_none());
    }

    #[test]
    fn model_groups_are_named_after_their_files() {
        let mut scene = Scene::new();
        let mut opts = seeded(4);
        opts.loading.models = vec!["Models/saturn.glb".into(), "Models/lander.obj".into()];
        let system = build(&mut scene, &opts).unwrap();
        assert_eq!(system.model_groups.len(), 2);
        assert_eq!(scene.find("model:saturn.glb"), Some(system.model_groups[0]));
        assert_eq!(scene.find("model:lander.obj"), Some(system.model_groups[1]));
    }

    #[test]
    fn lights_follow_display_options() {
        let mut scene = Scene::new();
        let _ = build(&mut scene, &seeded(5)).unwrap();
        assert_eq!(scene.lights().len(), 2);
        assert!(matches!(
            scene.lights()[0],
            Light::Ambient { intensity, .. } if (intensity - 0.1).abs() < 1e-6
        ));
    }
}
