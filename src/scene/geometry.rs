//! Procedural mesh generation for bodies and rings.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

/// CPU-side triangle mesh. Attributes are parallel arrays indexed by
/// vertex; `indices` holds counter-clockwise triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, `v` = 0 at the top row of the image.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Distance from the local origin to the farthest vertex.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| glam::Vec3::from(*p).length())
            .fold(0.0, f32::max)
    }
}

/// Shape of a mesh node.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// UV sphere centered on the origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Segments around the equator.
        width_segments: u32,
        /// Segments from pole to pole.
        height_segments: u32,
    },
    /// Flat annulus in the local XY plane facing +Z.
    Ring {
        /// Hole radius.
        inner_radius: f32,
        /// Rim radius.
        outer_radius: f32,
        /// Segments around the ring.
        theta_segments: u32,
    },
    /// Mesh produced elsewhere (e.g. decoded from a model file).
    Custom(Arc<MeshData>),
}

impl Geometry {
    /// Generate (or clone) the triangle mesh for this shape.
    #[must_use]
    pub fn build(&self) -> MeshData {
        match self {
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere(*radius, *width_segments, *height_segments),
            Self::Ring {
                inner_radius,
                outer_radius,
                theta_segments,
            } => ring(*inner_radius, *outer_radius, *theta_segments),
            Self::Custom(data) => MeshData::clone(data),
        }
    }

    /// Radius of a sphere around the local origin enclosing the shape.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Sphere { radius, .. } => *radius,
            Self::Ring { outer_radius, .. } => *outer_radius,
            Self::Custom(data) => data.bounding_radius(),
        }
    }
}

/// UV sphere with `width_segments` × `height_segments` quads.
///
/// Each ring of latitude duplicates its seam vertex so the texture wraps
/// once. Pole rows are shifted half a segment in `u` so the pole triangles
/// sample the middle of their texel column.
#[must_use]
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut mesh = MeshData::default();
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(h as usize + 1);

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let u_offset = if iy == 0 {
            0.5 / w as f32
        } else if iy == h {
            -0.5 / w as f32
        } else {
            0.0
        };
        let mut row = Vec::with_capacity(w as usize + 1);
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            let n = [-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            row.push(mesh.positions.len() as u32);
            mesh.positions.push([n[0] * radius, n[1] * radius, n[2] * radius]);
            mesh.normals.push(n);
            mesh.uvs.push([u + u_offset, v]);
        }
        grid.push(row);
    }

    for iy in 0..h as usize {
        for ix in 0..w as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h as usize - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Flat annulus between `inner_radius` and `outer_radius`.
///
/// Texture coordinates map the bounding square of the outer rim onto the
/// unit square, so a ring texture is sampled radially from its center.
#[must_use]
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> MeshData {
    let segs = theta_segments.max(3);
    let mut mesh = MeshData::default();
    let outer = outer_radius.max(f32::EPSILON);

    for radius in [inner_radius, outer_radius] {
        for i in 0..=segs {
            let angle = i as f32 / segs as f32 * TAU;
            let (s, c) = angle.sin_cos();
            let (x, y) = (radius * c, radius * s);
            mesh.positions.push([x, y, 0.0]);
            mesh.normals.push([0.0, 0.0, 1.0]);
            mesh.uvs.push([(x / outer + 1.0) * 0.5, 1.0 - (y / outer + 1.0) * 0.5]);
        }
    }

    for i in 0..segs {
        let a = i;
        let b = i + segs + 1;
        let c = i + segs + 2;
        let d = i + 1;
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn sphere_vertices_lie_on_surface() {
        let mesh = sphere(2.0, 16, 12);
        assert_eq!(mesh.vertex_count(), 17 * 13);
        for p in &mesh.positions {
            assert!((Vec3::from(*p).length() - 2.0).abs() < 1e-4);
        }
        assert!((mesh.bounding_radius() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_skips_degenerate_pole_triangles() {
        let (w, h) = (16, 12);
        let mesh = sphere(1.0, w, h);
        // Two triangles per quad, minus one per quad on each pole row.
        assert_eq!(mesh.triangle_count() as u32, w * h * 2 - 2 * w);
        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn sphere_winding_faces_outward() {
        let mesh = sphere(1.0, 8, 6);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from(mesh.positions[i as usize]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn ring_spans_inner_to_outer() {
        let mesh = ring(2.5, 4.0, 30);
        assert_eq!(mesh.vertex_count(), 2 * 31);
        assert_eq!(mesh.triangle_count(), 60);
        for p in &mesh.positions {
            let r = Vec3::from(*p).length();
            assert!((r - 2.5).abs() < 1e-4 || (r - 4.0).abs() < 1e-4);
            assert_eq!(p[2], 0.0);
        }
        for uv in &mesh.uvs {
            assert!((0.0..=1.0).contains(&uv[0]));
            assert!((0.0..=1.0).contains(&uv[1]));
        }
    }

    #[test]
    fn ring_faces_positive_z() {
        let mesh = ring(1.0, 2.0, 8);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from(mesh.positions[i as usize]));
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }

    #[test]
    fn geometry_bounding_radius() {
        let ring = Geometry::Ring {
            inner_radius: 2.5,
            outer_radius: 4.0,
            theta_segments: 30,
        };
        assert_eq!(ring.bounding_radius(), 4.0);
        let custom = Geometry::Custom(Arc::new(sphere(3.0, 8, 6)));
        assert!((custom.bounding_radius() - 3.0).abs() < 1e-4);
    }
}
