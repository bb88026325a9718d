//! Decoded asset payloads handed from the loader thread to the scene.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::scene::MeshData;

/// Pixel storage of a decoded texture.
#[derive(Debug, Clone, PartialEq)]
pub enum TexturePixels {
    /// 8-bit RGBA, row-major, top row first.
    Rgba8 {
        /// `width * height * 4` bytes.
        data: Vec<u8>,
        /// Whether the color channels are sRGB-encoded.
        srgb: bool,
    },
    /// Half-float RGBA (raw `f16` bits), row-major, top row first.
    RgbaF16(Vec<u16>),
}

/// A decoded 2D texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Pixel payload.
    pub pixels: TexturePixels,
}

impl TextureData {
    /// A 1×1 sRGB texture of one color.
    #[must_use]
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: TexturePixels::Rgba8 {
                data: rgba.to_vec(),
                srgb: true,
            },
        }
    }

    /// A 1×1 linear (non-color) texture of one value.
    #[must_use]
    pub fn solid_linear(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: TexturePixels::Rgba8 {
                data: rgba.to_vec(),
                srgb: false,
            },
        }
    }

    /// A 1×1 half-float texture of one linear color.
    #[must_use]
    pub fn solid_hdr(rgba: [f32; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: TexturePixels::RgbaF16(
                rgba.iter().map(|&c| half::f16::from_f32(c).to_bits()).collect(),
            ),
        }
    }

    /// Whether the texture holds high-dynamic-range data.
    #[must_use]
    pub fn is_hdr(&self) -> bool {
        matches!(self.pixels, TexturePixels::RgbaF16(_))
    }

    /// Bytes per row of the pixel payload.
    #[must_use]
    pub fn bytes_per_row(&self) -> u32 {
        match self.pixels {
            TexturePixels::Rgba8 { .. } => self.width * 4,
            TexturePixels::RgbaF16(_) => self.width * 8,
        }
    }

    /// The pixel payload as raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match &self.pixels {
            TexturePixels::Rgba8 { data, .. } => data,
            TexturePixels::RgbaF16(data) => bytemuck::cast_slice(data.as_slice()),
        }
    }
}

/// One mesh of a decoded model, with its node transform resolved.
#[derive(Debug, Clone)]
pub struct ModelMesh {
    /// Name from the source file, or a generated one.
    pub name: String,
    /// Triangle mesh in model space.
    pub mesh: Arc<MeshData>,
    /// Model-space transform of the mesh.
    pub transform: Mat4,
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// Base color texture, if the file provides one.
    pub texture: Option<Arc<TextureData>>,
}

/// A decoded 3D model: a flat list of meshes.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    /// Meshes in file order.
    pub meshes: Vec<ModelMesh>,
}

impl ModelData {
    /// Total triangle count over all meshes.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }
}

/// Smooth per-vertex normals from a triangle list, for files that carry
/// none. Vertices not referenced by any triangle get +Y.
#[must_use]
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let (Some(pa), Some(pb), Some(pc)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_textures_have_one_texel() {
        let t = TextureData::solid([1, 2, 3, 4]);
        assert_eq!((t.width, t.height), (1, 1));
        assert_eq!(t.bytes(), &[1, 2, 3, 4]);
        assert_eq!(t.bytes_per_row(), 4);
        assert!(!t.is_hdr());

        let h = TextureData::solid_hdr([1.0, 0.0, 0.5, 1.0]);
        assert!(h.is_hdr());
        assert_eq!(h.bytes().len(), 8);
        assert_eq!(h.bytes_per_row(), 8);
    }

    #[test]
    fn computed_normals_face_triangle_side() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals.len(), 4);
        for n in &normals[..3] {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }
}
