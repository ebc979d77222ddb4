//! GPU device, window surface and the shared depth buffer.
//!
//! [`GpuContext`] owns the wgpu objects every pass needs. It is created once
//! the window exists and handed by reference to the body and panel passes.
//!
//! The surface is sized from the window's physical size with the pixel ratio
//! capped at `max_pixel_ratio`, so high-DPI displays do not render at more
//! than twice the logical resolution by default. See [`surface_size`].

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::{OrreryError, OrreryResult};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    /// Depth attachment matching the surface size.
    pub depth_view: wgpu::TextureView,
    max_pixel_ratio: f32,
}

impl GpuContext {
    /// Create the GPU context for `window`.
    ///
    /// Creates the instance, surface, adapter and device, then configures the
    /// surface with an sRGB format and Fifo present mode.
    pub fn new(window: Arc<Window>, max_pixel_ratio: f32) -> OrreryResult<Self> {
        let size = surface_size(window.inner_size(), window.scale_factor(), max_pixel_ratio);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "gpu adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Orrery Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(OrreryError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        tracing::info!(
            format = ?surface_format,
            width = size.width,
            height = size.height,
            "surface configured"
        );

        let depth_view = create_depth_view(&device, size);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            max_pixel_ratio,
        })
    }

    /// Resize for a new window size. Ignores zero-sized dimensions, which
    /// happen while the window is minimized.
    pub fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        if physical.width == 0 || physical.height == 0 {
            return;
        }
        let size = surface_size(physical, scale_factor, self.max_pixel_ratio);
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
        self.depth_view = create_depth_view(&self.device, size);
        tracing::debug!(width = size.width, height = size.height, "surface resized");
    }

    /// Re-apply the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Ratio of surface pixels to window physical pixels.
    pub fn pointer_scale(&self, physical: PhysicalSize<u32>) -> f32 {
        if physical.width == 0 {
            1.0
        } else {
            self.config.width as f32 / physical.width as f32
        }
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

/// Surface size for a window of `physical` pixels at `scale_factor`, with
/// the effective pixel ratio capped at `max_pixel_ratio`.
///
/// Below the cap this is the physical size. Above it, the surface is the
/// logical size times the cap. Never returns a zero dimension.
pub fn surface_size(
    physical: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f32,
) -> PhysicalSize<u32> {
    let max_ratio = f64::from(max_pixel_ratio);
    let shrink = if scale_factor.is_finite() && scale_factor > max_ratio && max_ratio > 0.0 {
        max_ratio / scale_factor
    } else {
        1.0
    };
    let scale = |v: u32| ((f64::from(v) * shrink).round() as u32).max(1);
    PhysicalSize::new(scale(physical.width), scale(physical.height))
}

fn create_depth_view(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_dpi_keeps_physical_size() {
        let size = surface_size(PhysicalSize::new(1280, 720), 1.0, 2.0);
        assert_eq!(size, PhysicalSize::new(1280, 720));

        let size = surface_size(PhysicalSize::new(2560, 1440), 2.0, 2.0);
        assert_eq!(size, PhysicalSize::new(2560, 1440));
    }

    #[test]
    fn high_dpi_is_capped() {
        // 1000x500 logical at 3x
        let size = surface_size(PhysicalSize::new(3000, 1500), 3.0, 2.0);
        assert_eq!(size, PhysicalSize::new(2000, 1000));
    }

    #[test]
    fn never_zero() {
        let size = surface_size(PhysicalSize::new(1, 1), 4.0, 1.0);
        assert_eq!(size, PhysicalSize::new(1, 1));
    }

    #[test]
    fn bad_scale_factor_is_ignored() {
        let size = surface_size(PhysicalSize::new(800, 600), f64::NAN, 2.0);
        assert_eq!(size, PhysicalSize::new(800, 600));
    }
}
