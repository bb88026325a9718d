//! Vertex layout and GPU buffers for scene geometry.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::scene::{Geometry, MeshData};

/// Interleaved vertex as consumed by the mesh shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Buffer layout matching `VertexInput` in the mesh shader.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave a mesh's attribute arrays. Missing normals or UVs are zero.
#[must_use]
pub fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0; 3]),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0; 2]),
        })
        .collect()
}

/// Identity of a geometry for buffer sharing. Procedural shapes with the
/// same parameters share one buffer; custom meshes are keyed by allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKey {
    /// Procedural sphere.
    Sphere {
        /// `f32::to_bits` of the radius.
        radius: u32,
        /// Segments around.
        width: u32,
        /// Segments pole to pole.
        height: u32,
    },
    /// Procedural ring.
    Ring {
        /// `f32::to_bits` of the inner radius.
        inner: u32,
        /// `f32::to_bits` of the outer radius.
        outer: u32,
        /// Segments around.
        segments: u32,
    },
    /// Shared custom mesh, by address.
    Custom(usize),
}

impl GeometryKey {
    /// Key for `geometry`.
    #[must_use]
    pub fn of(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Self::Sphere {
                radius: radius.to_bits(),
                width: *width_segments,
                height: *height_segments,
            },
            Geometry::Ring {
                inner_radius,
                outer_radius,
                theta_segments,
            } => Self::Ring {
                inner: inner_radius.to_bits(),
                outer: outer_radius.to_bits(),
                segments: *theta_segments,
            },
            Geometry::Custom(data) => Self::Custom(Arc::as_ptr(data) as usize),
        }
    }
}

/// Vertex and index buffers for one geometry.
pub struct GpuMesh {
    /// Interleaved [`Vertex`] data.
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` triangle indices.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Keeps a custom mesh's allocation alive so its key stays unique.
    source: Option<Arc<MeshData>>,
}

impl GpuMesh {
    /// Build and upload the buffers for `geometry`.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, geometry: &Geometry) -> Self {
        let (data, source) = match geometry {
            Geometry::Custom(data) => (MeshData::clone(data), Some(Arc::clone(data))),
            other => (other.build(), None),
        };
        let vertices = interleave(&data);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            source,
        }
    }

    /// Whether the scene no longer references this mesh's custom data.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|data| Arc::strong_count(data) == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn interleave_fills_missing_attributes() {
        let mesh = MeshData {
            positions: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            normals: vec![[0.0, 1.0, 0.0]],
            uvs: Vec::new(),
            indices: vec![0, 1, 0],
        };
        let v = interleave(&mesh);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(v[1].normal, [0.0; 3]);
        assert_eq!(v[1].uv, [0.0; 2]);
        assert_eq!(v[1].position, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn procedural_keys_compare_by_parameters() {
        let a = Geometry::Sphere {
            radius: 1.0,
            width_segments: 100,
            height_segments: 100,
        };
        let b = a.clone();
        let c = Geometry::Sphere {
            radius: 2.0,
            width_segments: 100,
            height_segments: 100,
        };
        assert_eq!(GeometryKey::of(&a), GeometryKey::of(&b));
        assert_ne!(GeometryKey::of(&a), GeometryKey::of(&c));

        let data = Arc::new(MeshData::default());
        let custom = Geometry::Custom(Arc::clone(&data));
        assert_eq!(GeometryKey::of(&custom), GeometryKey::of(&custom.clone()));
    }
}
