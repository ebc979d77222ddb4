use std::path::Path;

use crate::config::BodyConfig;
use crate::error::{OrreryError, OrreryResult};
use crate::gpu::GpuContext;

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Wrap around the equator, clamp at the poles.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &Path) -> OrreryResult<Self> {
        let img = image::open(path)
            .map_err(|source| OrreryError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        tracing::debug!(path = %path.display(), width, height, "texture loaded");
        Ok(Self::from_rgba(gpu, &img, width, height, &path.display().to_string()))
    }

    /// A 1x1 texture of a single linear-space color.
    pub fn solid(gpu: &GpuContext, color: [f32; 3], label: &str) -> Self {
        Self::from_rgba(gpu, &solid_pixel(color), 1, 1, label)
    }

    /// Surface texture for a body: its image if one is configured and
    /// loads, otherwise its flat color.
    pub fn for_body(gpu: &GpuContext, body: &BodyConfig) -> Self {
        if let Some(path) = &body.texture {
            match Self::from_file(gpu, path) {
                Ok(texture) => return texture,
                Err(err) => {
                    tracing::warn!(body = %body.name, %err, "using flat color instead of texture");
                }
            }
        }
        Self::solid(gpu, body.color, &body.name)
    }
}

/// RGBA8 sRGB bytes for a linear color in `0..=1`.
fn solid_pixel(color: [f32; 3]) -> [u8; 4] {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        let srgb = if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        (srgb * 255.0).round() as u8
    };
    [encode(color[0]), encode(color[1]), encode(color[2]), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_pixel_encodes_srgb() {
        assert_eq!(solid_pixel([0.0, 1.0, 0.5]), [0, 255, 188, 255]);
    }

    #[test]
    fn solid_pixel_clamps() {
        assert_eq!(solid_pixel([-1.0, 2.0, f32::NAN]), [0, 255, 0, 255]);
    }
}
