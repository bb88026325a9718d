//! File decoding for textures, HDR environment maps and models.
//!
//! Runs on the loader thread; everything here is pure CPU work with no
//! access to the scene.

use std::path::Path;
use std::sync::Arc;

use glam::Mat4;

use super::data::{compute_normals, ModelData, ModelMesh, TextureData, TexturePixels};
use super::request::{AssetKind, LoadedAsset, ModelFormat};
use super::AssetError;
use crate::scene::MeshData;

/// Decode the file at `path` according to `kind`.
pub fn decode(path: &Path, kind: AssetKind) -> Result<LoadedAsset, AssetError> {
    match kind {
        AssetKind::Texture { srgb } => {
            decode_texture(path, srgb).map(|t| LoadedAsset::Texture(Arc::new(t)))
        }
        AssetKind::EnvironmentHdr => {
            decode_hdr(path).map(|t| LoadedAsset::Texture(Arc::new(t)))
        }
        AssetKind::Model(ModelFormat::Gltf) => {
            decode_gltf(path).map(|m| LoadedAsset::Model(Arc::new(m)))
        }
        AssetKind::Model(ModelFormat::Obj) => {
            decode_obj(path).map(|m| LoadedAsset::Model(Arc::new(m)))
        }
    }
}

fn image_error(path: &Path, e: image::ImageError) -> AssetError {
    match e {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        image::ImageError::Unsupported(_) => {
            AssetError::UnsupportedFormat(path.to_path_buf())
        }
        other => AssetError::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

/// Decode a PNG/JPEG into 8-bit RGBA.
pub fn decode_texture(path: &Path, srgb: bool) -> Result<TextureData, AssetError> {
    let img = image::open(path).map_err(|e| image_error(path, e))?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(TextureData {
        width,
        height,
        pixels: TexturePixels::Rgba8 {
            data: img.into_raw(),
            srgb,
        },
    })
}

/// Decode a Radiance `.hdr` into half-float RGBA.
pub fn decode_hdr(path: &Path) -> Result<TextureData, AssetError> {
    let img = image::open(path).map_err(|e| image_error(path, e))?.to_rgba32f();
    let (width, height) = img.dimensions();
    let bits = img
        .into_raw()
        .into_iter()
        .map(|c| half::f16::from_f32(c).to_bits())
        .collect();
    Ok(TextureData {
        width,
        height,
        pixels: TexturePixels::RgbaF16(bits),
    })
}

// ---------------------------------------------------------------------------
// glTF
// ---------------------------------------------------------------------------

fn decode_gltf(path: &Path) -> Result<ModelData, AssetError> {
    let (document, buffers, images) =
        gltf::import(path).map_err(|e| match e {
            gltf::Error::Io(source) => AssetError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => AssetError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::Decode {
            path: path.to_path_buf(),
            message: "file contains no scene".into(),
        })?;

    let textures: Vec<Option<Arc<TextureData>>> =
        images.iter().map(gltf_image_to_texture).collect();
    let mut model = ModelData::default();
    for node in scene.nodes() {
        visit_gltf_node(&node, Mat4::IDENTITY, &buffers, &textures, &mut model);
    }
    Ok(model)
}

fn visit_gltf_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    textures: &[Option<Arc<TextureData>>],
    out: &mut ModelData,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let base_name = mesh
            .name()
            .or_else(|| node.name())
            .map_or_else(|| format!("mesh{}", mesh.index()), str::to_owned);
        for (i, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = primitive
                .reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let indices: Vec<u32> = reader.read_indices().map_or_else(
                || (0..positions.len() as u32).collect(),
                |i| i.into_u32().collect(),
            );
            let normals = reader.read_normals().map_or_else(
                || compute_normals(&positions, &indices),
                |n| n.collect(),
            );
            let uvs = reader.read_tex_coords(0).map_or_else(
                || vec![[0.0, 0.0]; positions.len()],
                |t| t.into_f32().collect(),
            );

            let pbr = primitive.material().pbr_metallic_roughness();
            let texture = pbr
                .base_color_texture()
                .and_then(|info| textures.get(info.texture().source().index()))
                .and_then(Clone::clone);

            out.meshes.push(ModelMesh {
                name: format!("{base_name}.{i}"),
                mesh: Arc::new(MeshData {
                    positions,
                    normals,
                    uvs,
                    indices,
                }),
                transform: world,
                base_color: pbr.base_color_factor(),
                texture,
            });
        }
    }
    for child in node.children() {
        visit_gltf_node(&child, world, buffers, textures, out);
    }
}

fn gltf_image_to_texture(image: &gltf::image::Data) -> Option<Arc<TextureData>> {
    use gltf::image::Format;
    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        _ => {
            log::debug!("skipping glTF image with format {:?}", image.format);
            return None;
        }
    };
    Some(Arc::new(TextureData {
        width: image.width,
        height: image.height,
        pixels: TexturePixels::Rgba8 { data, srgb: true },
    }))
}

// ---------------------------------------------------------------------------
// OBJ
// ---------------------------------------------------------------------------

fn decode_obj(path: &Path) -> Result<ModelData, AssetError> {
    let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .map_err(|e| match e {
            tobj::LoadError::OpenFileFailed => AssetError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    e.to_string(),
                ),
            },
            other => AssetError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
    let materials = materials.unwrap_or_else(|e| {
        log::debug!("{}: no usable materials ({e})", path.display());
        Vec::new()
    });
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut model = ModelData::default();
    for m in models {
        let mesh = m.mesh;
        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let normals = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect()
        } else {
            compute_normals(&positions, &mesh.indices)
        };
        // OBJ puts v = 0 at the bottom of the image.
        let uvs = if mesh.texcoords.len() / 2 == positions.len() {
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| [t[0], 1.0 - t[1]])
                .collect()
        } else {
            vec![[0.0, 0.0]; positions.len()]
        };

        let material = mesh.material_id.and_then(|id| materials.get(id));
        let base_color = material
            .and_then(|mat| mat.diffuse)
            .map_or([1.0; 4], |d| [d[0], d[1], d[2], 1.0]);
        let texture = material
            .and_then(|mat| mat.diffuse_texture.as_deref())
            .and_then(|name| match decode_texture(&dir.join(name), true) {
                Ok(t) => Some(Arc::new(t)),
                Err(e) => {
                    log::warn!("{}: {e}", path.display());
                    None
                }
            });

        model.meshes.push(ModelMesh {
            name: m.name,
            mesh: Arc::new(MeshData {
                positions,
                normals,
                uvs,
                indices: mesh.indices,
            }),
            transform: Mat4::IDENTITY,
            base_color,
            texture,
        });
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("orrery-decode-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn decodes_png_texture() {
        let dir = temp_dir("png");
        let path = dir.join("red.png");
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        img.save(&path).unwrap();

        let tex = decode_texture(&path, true).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.bytes().len(), 4 * 2 * 4);
        assert_eq!(&tex.bytes()[..4], &[255, 0, 0, 255]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode_texture(Path::new("/nonexistent/orrery.png"), true)
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }), "{err:?}");
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = temp_dir("garbage");
        let path = dir.join("bad.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(decode_texture(&path, true).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn decodes_obj_triangle() {
        let dir = temp_dir("obj");
        let path = dir.join("tri.obj");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();
        drop(f);

        let LoadedAsset::Model(model) =
            decode(&path, AssetKind::Model(ModelFormat::Obj)).unwrap()
        else {
            panic!("expected a model");
        };
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 1);
        let mesh = &model.meshes[0].mesh;
        assert_eq!(mesh.normals.len(), 3);
        assert!((mesh.normals[0][2] - 1.0).abs() < 1e-6);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
