use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::data::{ModelData, TextureData};
use super::AssetError;
use crate::error::OrreryError;
use crate::scene::{MapSlot, NodeId, Scene};

/// Model file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// glTF 2.0, either `.gltf` + buffers or binary `.glb`.
    Gltf,
    /// Wavefront `.obj` (+ optional `.mtl`).
    Obj,
}

impl ModelFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gltf" | "glb") => Ok(Self::Gltf),
            Some("obj") => Ok(Self::Obj),
            _ => Err(AssetError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// What a request decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// LDR image (PNG/JPEG).
    Texture {
        /// Whether the image holds sRGB color (false for data maps).
        srgb: bool,
    },
    /// Equirectangular Radiance `.hdr` image.
    EnvironmentHdr,
    /// 3D model.
    Model(ModelFormat),
}

/// The scene slot a loaded asset is attached to.
///
/// Every registered target is unique across all requests, so attachments
/// from different loads never touch the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachTarget {
    /// One texture slot of a mesh's material.
    MaterialMap {
        /// Mesh node.
        node: NodeId,
        /// Slot on its material.
        slot: MapSlot,
    },
    /// The scene background / lighting environment.
    Environment,
    /// Replace the children of a group with a model's meshes.
    ModelInto(NodeId),
}

/// A decoded asset ready for attachment.
#[derive(Debug, Clone)]
pub enum LoadedAsset {
    /// Any 2D texture, including the environment map.
    Texture(Arc<TextureData>),
    /// A model.
    Model(Arc<ModelData>),
}

impl AttachTarget {
    /// Stand-in content used when the load for this target fails.
    ///
    /// Color maps go neutral gray, displacement flat, alpha opaque, the
    /// environment black, and a model empty.
    #[must_use]
    pub fn placeholder(&self) -> LoadedAsset {
        let tex = match self {
            Self::MaterialMap {
                slot: MapSlot::Color,
                ..
            } => TextureData::solid([128, 128, 128, 255]),
            Self::MaterialMap {
                slot: MapSlot::Displacement,
                ..
            } => TextureData::solid_linear([0, 0, 0, 255]),
            Self::MaterialMap {
                slot: MapSlot::Alpha,
                ..
            } => TextureData::solid_linear([255, 255, 255, 255]),
            Self::Environment => TextureData::solid_hdr([0.0, 0.0, 0.0, 1.0]),
            Self::ModelInto(_) => {
                return LoadedAsset::Model(Arc::new(ModelData::default()))
            }
        };
        LoadedAsset::Texture(Arc::new(tex))
    }

    /// Attach `asset` to this slot of `scene`.
    pub fn apply(
        &self,
        scene: &mut Scene,
        asset: &LoadedAsset,
    ) -> Result<(), OrreryError> {
        match (self, asset) {
            (Self::MaterialMap { node, slot }, LoadedAsset::Texture(tex)) => {
                scene.attach_map(*node, *slot, Arc::clone(tex))?;
            }
            (Self::Environment, LoadedAsset::Texture(tex)) => {
                scene.set_environment(Arc::clone(tex));
            }
            (Self::ModelInto(node), LoadedAsset::Model(model)) => {
                let _ = scene.attach_model(*node, model)?;
            }
            _ => return Err(AssetError::KindMismatch(*self).into()),
        }
        Ok(())
    }
}

/// One asynchronous load: a file, how to decode it, and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Path relative to the asset root (or absolute).
    pub path: PathBuf,
    /// Decoder selection.
    pub kind: AssetKind,
    /// Slots the decoded asset is attached to.
    pub targets: Vec<AttachTarget>,
}

impl LoadRequest {
    /// An sRGB color texture for one or more material slots.
    pub fn texture(path: impl Into<PathBuf>, targets: Vec<AttachTarget>) -> Self {
        Self {
            path: path.into(),
            kind: AssetKind::Texture { srgb: true },
            targets,
        }
    }

    /// A linear data texture (displacement, alpha) for material slots.
    pub fn data_texture(
        path: impl Into<PathBuf>,
        targets: Vec<AttachTarget>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: AssetKind::Texture { srgb: false },
            targets,
        }
    }

    /// The equirectangular environment map.
    pub fn environment(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: AssetKind::EnvironmentHdr,
            targets: vec![AttachTarget::Environment],
        }
    }

    /// A model attached into group `node`; the format follows the extension.
    pub fn model(path: impl Into<PathBuf>, node: NodeId) -> Result<Self, AssetError> {
        let path = path.into();
        let format = ModelFormat::from_path(&path)?;
        Ok(Self {
            path,
            kind: AssetKind::Model(format),
            targets: vec![AttachTarget::ModelInto(node)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material};

    #[test]
    fn model_format_from_extension() {
        assert_eq!(
            ModelFormat::from_path(Path::new("Models/saturn.glb")).unwrap(),
            ModelFormat::Gltf
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("a/b.GLTF")).unwrap(),
            ModelFormat::Gltf
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("saturn.obj")).unwrap(),
            ModelFormat::Obj
        );
        assert!(matches!(
            ModelFormat::from_path(Path::new("saturn.fbx")),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn placeholder_matches_target() {
        let root = Scene::new().root();
        assert!(matches!(
            AttachTarget::Environment.placeholder(),
            LoadedAsset::Texture(t) if t.is_hdr()
        ));
        assert!(matches!(
            AttachTarget::ModelInto(root).placeholder(),
            LoadedAsset::Model(m) if m.meshes.is_empty()
        ));
        let alpha = AttachTarget::MaterialMap {
            node: root,
            slot: MapSlot::Alpha,
        };
        assert!(matches!(
            alpha.placeholder(),
            LoadedAsset::Texture(t) if t.bytes() == [255, 255, 255, 255]
        ));
    }

    #[test]
    fn apply_rejects_kind_mismatch() {
        let mut scene = Scene::new();
        let root = scene.root();
        let mesh = scene
            .add_mesh(
                "m",
                root,
                Geometry::Sphere {
                    radius: 1.0,
                    width_segments: 4,
                    height_segments: 3,
                },
                Material::lit(),
            )
            .unwrap();
        let target = AttachTarget::MaterialMap {
            node: mesh,
            slot: MapSlot::Color,
        };
        let model = LoadedAsset::Model(Arc::new(ModelData::default()));
        assert!(target.apply(&mut scene, &model).is_err());
        assert!(target.apply(&mut scene, &target.placeholder()).is_ok());
    }
}
