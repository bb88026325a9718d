use glam::Vec3;

use super::node::NodeId;

/// Index of a body in [`Scene::bodies`](super::Scene::bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    /// Position of the body in the scene's body list.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A star, planet, or composite (e.g. ringed) body.
///
/// `node` is the mesh or group that carries the body's world position;
/// for composites the group, not its children, is positioned.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    /// Stable handle.
    pub id: BodyId,
    /// Lookup name (`"earth"`, `"saturn"`, ...).
    pub name: String,
    /// Node carrying the position.
    pub node: NodeId,
    /// Radius of the primary sphere.
    pub radius: f32,
    /// Radius of a sphere around `node` enclosing all of its geometry.
    pub bounding_radius: f32,
    /// World position; `None` until placed.
    pub position: Option<Vec3>,
    /// Text shown in the information overlay.
    pub description: String,
}

impl CelestialBody {
    /// Whether the body has received its build-time position.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }
}
