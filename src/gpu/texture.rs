//! GPU textures: sampled textures uploaded from decoded assets, and the
//! depth target.

use crate::assets::{TextureData, TexturePixels};

/// Depth buffer format used by every scene pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A sampled texture and its default view.
pub struct GpuTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

/// GPU format for a decoded texture.
#[must_use]
pub fn format_for(data: &TextureData) -> wgpu::TextureFormat {
    match data.pixels {
        TexturePixels::Rgba8 { srgb: true, .. } => wgpu::TextureFormat::Rgba8UnormSrgb,
        TexturePixels::Rgba8 { srgb: false, .. } => wgpu::TextureFormat::Rgba8Unorm,
        TexturePixels::RgbaF16(_) => wgpu::TextureFormat::Rgba16Float,
    }
}

impl GpuTexture {
    /// Create a texture from decoded pixels and upload them.
    #[must_use]
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: data.width.max(1),
            height: data.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format_for(data),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let bytes = data.bytes();
        let expected = data.bytes_per_row() as usize * data.height as usize;
        if bytes.len() >= expected && expected > 0 {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &bytes[..expected],
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(data.bytes_per_row()),
                    rows_per_image: Some(data.height),
                },
                size,
            );
        } else {
            log::warn!("texture '{label}' has {} bytes, expected {expected}", bytes.len());
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Depth texture sized to the render target.
pub struct DepthTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    /// Create a depth texture of the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_pixel_encoding() {
        assert_eq!(
            format_for(&TextureData::solid([1, 2, 3, 4])),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            format_for(&TextureData::solid_linear([0; 4])),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert_eq!(
            format_for(&TextureData::solid_hdr([0.0; 4])),
            wgpu::TextureFormat::Rgba16Float
        );
    }
}
