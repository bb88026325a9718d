//! Scene graph: nodes with local transforms, groups, celestial bodies,
//! lights and the background environment.
//!
//! Nodes live in a flat list indexed by [`NodeId`]; node 0 is the root
//! group. Bodies reference the node that carries their position. The
//! scene is mutated by the layout pass at build time and by asset
//! attachment afterwards; the render loop only reads it.

mod body;
pub mod catalog;
pub mod geometry;
pub mod layout;
mod node;

use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

pub use body::{BodyId, CelestialBody};
pub use geometry::{Geometry, MeshData};
pub use node::{MapSlot, Material, Mesh, Node, NodeId, NodeKind, Shading, Transform};

use crate::assets::{ModelData, TextureData};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Scene-graph construction and attachment failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node id does not exist in this scene.
    UnknownNode(NodeId),
    /// The operation requires a group node.
    NotAGroup(NodeId),
    /// The operation requires a mesh node.
    NotAMesh(NodeId),
    /// No body has this name.
    UnknownBody(String),
    /// A body's position is set once at build time.
    AlreadyPlaced(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {}", id.0),
            Self::NotAGroup(id) => write!(f, "node {} is not a group", id.0),
            Self::NotAMesh(id) => write!(f, "node {} is not a mesh", id.0),
            Self::UnknownBody(name) => write!(f, "unknown body '{name}'"),
            Self::AlreadyPlaced(name) => {
                write!(f, "body '{name}' has already been placed")
            }
        }
    }
}

impl std::error::Error for SceneError {}

// ---------------------------------------------------------------------------
// Lights and environment
// ---------------------------------------------------------------------------

/// A light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from every direction.
    Ambient {
        /// Linear RGB color.
        color: [f32; 3],
        /// Multiplier.
        intensity: f32,
    },
    /// Omnidirectional light at a point.
    Point {
        /// World position.
        position: Vec3,
        /// Linear RGB color.
        color: [f32; 3],
        /// Multiplier.
        intensity: f32,
        /// Cutoff distance; 0 = unbounded.
        range: f32,
        /// Distance falloff exponent.
        decay: f32,
    },
}

/// Equirectangular background, also sampled for image-based lighting.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// The decoded map, once loaded.
    pub texture: Option<Arc<TextureData>>,
    /// Bumped whenever `texture` changes.
    pub revision: u64,
}

/// A mesh with its resolved world transform, produced by
/// [`Scene::mesh_instances`].
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance<'a> {
    /// The node the mesh belongs to.
    pub node: NodeId,
    /// Local-to-world matrix.
    pub world: Mat4,
    /// Geometry and material.
    pub mesh: &'a Mesh,
    /// The node's revision counter.
    pub revision: u64,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The authoritative scene graph.
pub struct Scene {
    nodes: Vec<Node>,
    bodies: Vec<CelestialBody>,
    body_names: FxHashMap<String, BodyId>,
    lights: Vec<Light>,
    environment: Environment,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene holding only the root group.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            name: "root".to_owned(),
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Group,
            revision: 0,
        };
        Self {
            nodes: vec![root],
            bodies: Vec::new(),
            body_names: FxHashMap::default(),
            lights: Vec::new(),
            environment: Environment::default(),
            generation: 0,
            rendered_generation: 0,
        }
    }

    // -- Mutation helpers --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(SceneError::UnknownNode(id))
    }

    fn push_node(
        &mut self,
        name: &str,
        parent: NodeId,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        let _ = self.node(parent).ok_or(SceneError::UnknownNode(parent))?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.to_owned(),
            transform: Transform::default(),
            parent: Some(parent),
            children: Vec::new(),
            kind,
            revision: 0,
        });
        self.node_mut(parent)?.children.push(id);
        self.invalidate();
        Ok(id)
    }

    /// Whether scene data changed since last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Mark the current generation as consumed by the renderer.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    /// Current mutation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -- Nodes --

    /// The root group.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// First node with the given name, in creation order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// Total number of nodes ever created, including detached ones.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add an empty group under `parent`.
    pub fn add_group(
        &mut self,
        name: &str,
        parent: NodeId,
    ) -> Result<NodeId, SceneError> {
        self.push_node(name, parent, NodeKind::Group)
    }

    /// Add a mesh under `parent`.
    pub fn add_mesh(
        &mut self,
        name: &str,
        parent: NodeId,
        geometry: Geometry,
        material: Material,
    ) -> Result<NodeId, SceneError> {
        self.push_node(name, parent, NodeKind::Mesh(Mesh { geometry, material }))
    }

    /// Replace a node's local transform.
    pub fn set_transform(
        &mut self,
        id: NodeId,
        transform: Transform,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = transform;
        self.invalidate();
        Ok(())
    }

    /// Replace a node's local translation.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.translation = position;
        self.invalidate();
        Ok(())
    }

    /// Local-to-world matrix of a node.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut m = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            m = node.transform.matrix() * m;
        }
        Some(m)
    }

    /// Every mesh reachable from the root, with world transforms, in
    /// depth-first order.
    #[must_use]
    pub fn mesh_instances(&self) -> Vec<MeshInstance<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            let world = parent_world * node.transform.matrix();
            if let Some(mesh) = node.mesh() {
                out.push(MeshInstance {
                    node: id,
                    world,
                    mesh,
                    revision: node.revision,
                });
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }

    // -- Asset attachment --

    /// Bind a texture to one material slot of a mesh node.
    ///
    /// Rebinding the same slot replaces the previous texture, so repeated
    /// attachment is idempotent.
    pub fn attach_map(
        &mut self,
        id: NodeId,
        slot: MapSlot,
        texture: Arc<TextureData>,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let NodeKind::Mesh(mesh) = &mut node.kind else {
            return Err(SceneError::NotAMesh(id));
        };
        mesh.material.set_slot(slot, texture);
        node.revision += 1;
        self.invalidate();
        Ok(())
    }

    /// Install the background / lighting environment map.
    pub fn set_environment(&mut self, texture: Arc<TextureData>) {
        self.environment.texture = Some(texture);
        self.environment.revision += 1;
        self.invalidate();
    }

    /// The current environment.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Replace the children of group `id` with the meshes of `model`.
    ///
    /// Previous children are detached (no longer reachable from the root),
    /// so attaching twice leaves one copy of the model in the scene.
    pub fn attach_model(
        &mut self,
        id: NodeId,
        model: &ModelData,
    ) -> Result<Vec<NodeId>, SceneError> {
        let group = self.node_mut(id)?;
        if !matches!(group.kind, NodeKind::Group) {
            return Err(SceneError::NotAGroup(id));
        }
        let old = std::mem::take(&mut group.children);
        for child in old {
            self.node_mut(child)?.parent = None;
        }

        let mut added = Vec::with_capacity(model.meshes.len());
        for part in &model.meshes {
            let mut material = Material::lit();
            material.base_color = part.base_color;
            material.map.clone_from(&part.texture);
            material.transparent = part.base_color[3] < 1.0;
            let child = self.add_mesh(
                &part.name,
                id,
                Geometry::Custom(Arc::clone(&part.mesh)),
                material,
            )?;
            self.set_transform(child, Transform::from_matrix(part.transform))?;
            added.push(child);
        }
        Ok(added)
    }

    // -- Lights --

    /// Add a light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
        self.invalidate();
    }

    /// All lights.
    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    // -- Bodies --

    /// Register `node` as a named body. Re-registering a name replaces the
    /// lookup entry.
    pub fn add_body(
        &mut self,
        name: &str,
        node: NodeId,
        radius: f32,
        description: &str,
    ) -> Result<BodyId, SceneError> {
        let bounding_radius = self.subtree_bounding_radius(node)?;
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(CelestialBody {
            id,
            name: name.to_owned(),
            node,
            radius,
            bounding_radius: bounding_radius.max(radius),
            position: None,
            description: description.to_owned(),
        });
        let _ = self.body_names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Set a body's world position. Allowed once per body.
    pub fn place_body(&mut self, id: BodyId, position: Vec3) -> Result<(), SceneError> {
        let body = self
            .bodies
            .get_mut(id.index())
            .ok_or_else(|| SceneError::UnknownBody(format!("#{}", id.0)))?;
        if body.position.is_some() {
            return Err(SceneError::AlreadyPlaced(body.name.clone()));
        }
        let node = body.node;
        self.set_position(node, position)?;
        if let Some(body) = self.bodies.get_mut(id.index()) {
            body.position = Some(position);
        }
        Ok(())
    }

    /// All bodies in registration order.
    #[must_use]
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    /// Look up a body by id.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.index())
    }

    /// Look up a body by name.
    #[must_use]
    pub fn body_by_name(&self, name: &str) -> Option<&CelestialBody> {
        self.body_names.get(name).and_then(|id| self.body(*id))
    }

    /// World-space center of a body's node.
    #[must_use]
    pub fn body_center(&self, id: BodyId) -> Option<Vec3> {
        let body = self.body(id)?;
        Some(self.world_matrix(body.node)?.transform_point3(Vec3::ZERO))
    }

    fn subtree_bounding_radius(&self, id: NodeId) -> Result<f32, SceneError> {
        let node = self.node(id).ok_or(SceneError::UnknownNode(id))?;
        let mut radius = node.mesh().map_or(0.0, |m| m.geometry.bounding_radius());
        for &child in &node.children {
            let Some(c) = self.node(child) else { continue };
            let offset = c.transform.translation.length();
            let scale = c.transform.scale.max_element();
            let r = self.subtree_bounding_radius(child)? * scale + offset;
            radius = radius.max(r);
        }
        Ok(radius)
    }
}
