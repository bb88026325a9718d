use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use super::geometry::Geometry;
use crate::assets::TextureData;

/// Index of a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position of the node in the scene's node list.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local translation / rotation / scale relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset from the parent origin.
    pub translation: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// A pure translation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// A pure rotation.
    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    /// Decompose an affine matrix (e.g. a model file's node transform).
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

/// Texture slots a material exposes to asset attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSlot {
    /// Base color.
    Color,
    /// Height map displacing vertices along their normal.
    Displacement,
    /// Grayscale opacity.
    Alpha,
}

/// Shading model of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Flat textured color, ignores lights (self-luminous bodies).
    Unlit,
    /// Ambient + point light + environment contribution.
    Lit,
}

/// Surface description of a mesh.
#[derive(Debug, Clone)]
pub struct Material {
    /// Shading model.
    pub shading: Shading,
    /// Base color multiplied with the color map.
    pub base_color: [f32; 4],
    /// Color texture.
    pub map: Option<Arc<TextureData>>,
    /// Displacement texture.
    pub displacement_map: Option<Arc<TextureData>>,
    /// World-space displacement at full map intensity.
    pub displacement_scale: f32,
    /// Opacity texture (green channel).
    pub alpha_map: Option<Arc<TextureData>>,
    /// Draw with alpha blending after opaque geometry.
    pub transparent: bool,
    /// Disable back-face culling.
    pub double_sided: bool,
}

impl Material {
    /// A lit material with a white base color and no textures.
    #[must_use]
    pub fn lit() -> Self {
        Self {
            shading: Shading::Lit,
            base_color: [1.0; 4],
            map: None,
            displacement_map: None,
            displacement_scale: 0.0,
            alpha_map: None,
            transparent: false,
            double_sided: false,
        }
    }

    /// An unlit material with a white base color and no textures.
    #[must_use]
    pub fn unlit() -> Self {
        Self {
            shading: Shading::Unlit,
            ..Self::lit()
        }
    }

    /// The texture currently bound to `slot`.
    #[must_use]
    pub fn slot(&self, slot: MapSlot) -> Option<&Arc<TextureData>> {
        match slot {
            MapSlot::Color => self.map.as_ref(),
            MapSlot::Displacement => self.displacement_map.as_ref(),
            MapSlot::Alpha => self.alpha_map.as_ref(),
        }
    }

    pub(crate) fn set_slot(&mut self, slot: MapSlot, texture: Arc<TextureData>) {
        match slot {
            MapSlot::Color => self.map = Some(texture),
            MapSlot::Displacement => self.displacement_map = Some(texture),
            MapSlot::Alpha => self.alpha_map = Some(texture),
        }
    }
}

/// A drawable: geometry plus material.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Shape.
    pub geometry: Geometry,
    /// Surface.
    pub material: Material,
}

/// What a node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure transform container.
    Group,
    /// Renderable mesh (may also have children).
    Mesh(Mesh),
}

/// One entry in the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Human-readable name, not necessarily unique.
    pub name: String,
    /// Local transform.
    pub transform: Transform,
    /// Parent node, `None` for the root and for detached subtrees.
    pub parent: Option<NodeId>,
    /// Children in insertion order.
    pub children: Vec<NodeId>,
    /// Group or mesh payload.
    pub kind: NodeKind,
    /// Bumped whenever the node's mesh or material changes.
    pub revision: u64,
}

impl Node {
    /// The mesh payload, if this node is renderable.
    #[must_use]
    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }
}
