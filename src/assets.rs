use std::collections::HashMap;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::{OrreryError, OrreryResult};
use crate::gpu::GpuContext;

const PADDING: u32 = 1;
const START_SIZE: u32 = 256;

/// DejaVu Sans Mono, used when no font file is configured.
/// License text sits next to it in `src/fonts/`.
pub(crate) const EMBEDDED_FONT: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

/// Where a glyph sits in the atlas and how to place it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    /// Atlas region as normalized `(u, v, width, height)`.
    pub uv: [f32; 4],
    /// Bitmap size in pixels.
    pub width: u32,
    pub height: u32,
    /// Pen-relative offset of the bitmap's top-left corner.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Horizontal pen advance.
    pub advance: f32,
}

/// Printable ASCII glyphs rasterized at one size into a single-channel
/// texture.
pub struct FontAtlas {
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl FontAtlas {
    /// Read a TTF/OTF file and build its atlas.
    pub fn load(gpu: &GpuContext, path: &Path, size: f32) -> OrreryResult<Self> {
        let data = std::fs::read(path).map_err(|source| OrreryError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let atlas = Self::from_bytes(gpu, &data, size)?;
        tracing::debug!(path = %path.display(), size, "font loaded");
        Ok(atlas)
    }

    /// Atlas of the built-in monospace font.
    pub fn embedded(gpu: &GpuContext, size: f32) -> OrreryResult<Self> {
        Self::from_bytes(gpu, EMBEDDED_FONT, size)
    }

    /// Build an atlas from TTF/OTF data.
    pub fn from_bytes(gpu: &GpuContext, font_data: &[u8], size: f32) -> OrreryResult<Self> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(OrreryError::FontParse)?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(char::from)
            .map(|c| {
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let packing = pack_glyphs(&sizes);

        let mut atlas_data = vec![0u8; (packing.width * packing.height) as usize];
        let mut glyphs = HashMap::with_capacity(rasterized.len());

        for ((c, metrics, bitmap), &(x, y)) in rasterized.iter().zip(&packing.origins) {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * packing.width + x) as usize;
                atlas_data[dst..dst + glyph_w as usize]
                    .copy_from_slice(&bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / packing.width as f32,
                        y as f32 / packing.height as f32,
                        glyph_w as f32 / packing.width as f32,
                        glyph_h as f32 / packing.height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );
        }

        let extent = wgpu::Extent3d {
            width: packing.width,
            height: packing.height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(packing.width),
                rows_per_image: Some(packing.height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Ok(Self {
            view,
            sampler,
            glyphs,
            size,
            line_height,
        })
    }

    /// Atlas entry for `c`, if the font has it.
    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    /// Rasterized pixel size.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Pen advance of `text` on one line, in pixels.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyphs.get(&c).map_or(self.size * 0.5, |g| g.advance))
            .sum()
    }
}

/// Where each glyph landed in the atlas.
#[derive(Debug, PartialEq)]
struct Packing {
    width: u32,
    height: u32,
    origins: Vec<(u32, u32)>,
}

/// Row-pack glyph rectangles, doubling the smaller side of the atlas until
/// everything fits.
fn pack_glyphs(sizes: &[(u32, u32)]) -> Packing {
    let mut width = START_SIZE;
    let mut height = START_SIZE;
    loop {
        if let Some(origins) = try_pack(sizes, width, height) {
            return Packing {
                width,
                height,
                origins,
            };
        }
        if width <= height {
            width *= 2;
        } else {
            height *= 2;
        }
    }
}

fn try_pack(sizes: &[(u32, u32)], width: u32, height: u32) -> Option<Vec<(u32, u32)>> {
    let mut origins = Vec::with_capacity(sizes.len());
    let mut x = PADDING;
    let mut y = PADDING;
    let mut row_height = 0;

    for &(w, h) in sizes {
        if w + 2 * PADDING > width {
            return None;
        }
        if x + w + PADDING > width {
            x = PADDING;
            y += row_height + PADDING;
            row_height = 0;
        }
        if y + h + PADDING > height {
            return None;
        }
        origins.push((x, y));
        x += w + PADDING;
        row_height = row_height.max(h);
    }
    Some(origins)
}
