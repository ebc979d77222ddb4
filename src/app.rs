use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::FontAtlas;
use crate::body_pass::{BodyDraw, BodyPass};
use crate::camera::Camera;
use crate::config::OrreryConfig;
use crate::controls::{MassSender, mass_channel};
use crate::draw2d::Draw2d;
use crate::error::{OrreryError, OrreryResult};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh::Mesh;
use crate::orbit_camera::OrbitCamera;
use crate::panel::{Panel, PanelEvent, Pointer};
use crate::scene::{BodyVisual, MaterialId, MeshId, Scene};
use crate::sim::{BodyRole, Orrery};
use crate::texture::Texture;
use crate::view::{ButtonId, PointOfView};

const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 32;

/// Open the window and run until it is closed.
///
/// Errors during startup (window, surface, GPU device) end the event loop
/// and are returned here.
pub fn run(config: OrreryConfig) -> OrreryResult<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = OrreryApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        OrreryApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum OrreryApp {
    Pending { config: OrreryConfig },
    Running(Box<Running>),
    Failed(OrreryError),
}

/// Everything alive while the window is open.
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    body_pass: BodyPass,
    draw_2d: Draw2d,
    font: Option<FontAtlas>,
    meshes: Vec<Mesh>,
    materials: Vec<wgpu::BindGroup>,
    scene: Scene,
    orrery: Orrery,
    masses: MassSender,
    panel: Panel,
    orbit: OrbitCamera,
    pov: PointOfView,
    input: Input,
    last_frame: Instant,
}

impl Running {
    fn new(window: Arc<Window>, config: &OrreryConfig) -> OrreryResult<Self> {
        let gpu = GpuContext::new(window.clone(), config.window.max_pixel_ratio)?;
        let body_pass = BodyPass::new(&gpu);
        let mut draw_2d = Draw2d::new(&gpu);

        let size = config.ui.font_size;
        let font = match &config.ui.font {
            Some(path) => FontAtlas::load(&gpu, path, size).or_else(|err| {
                tracing::warn!(%err, "falling back to the built-in font");
                FontAtlas::embedded(&gpu, size)
            }),
            None => FontAtlas::embedded(&gpu, size),
        }
        .inspect_err(|err| tracing::warn!(%err, "panel text disabled"))
        .ok();
        if let Some(font) = &font {
            draw_2d.set_font(&gpu, font);
        }

        let meshes = vec![Mesh::sphere(&gpu, SPHERE_SEGMENTS, SPHERE_RINGS)];
        let mut materials = Vec::with_capacity(2);
        let mut scene = Scene::new();
        for role in BodyRole::ALL {
            let body = match role {
                BodyRole::Orbiter => &config.orbiter,
                BodyRole::Primary => &config.primary,
            };
            let texture = Texture::for_body(&gpu, body);
            let material = MaterialId(materials.len());
            materials.push(body_pass.create_material(&gpu, &texture));
            scene.spawn_body(role, BodyVisual::new(MeshId(0), material, body.radius));
        }

        let (masses, mass_rx) = mass_channel();
        let orrery = Orrery::new(config, mass_rx);
        scene.sync(&orrery);

        let mut input = Input::new();
        input.set_pointer_scale(gpu.pointer_scale(window.inner_size()));

        tracing::info!(
            orbiter = %config.orbiter.name,
            primary = %config.primary.name,
            "orrery running"
        );

        Ok(Self {
            window,
            gpu,
            body_pass,
            draw_2d,
            font,
            meshes,
            materials,
            scene,
            orrery,
            masses,
            panel: Panel::new(config),
            orbit: OrbitCamera::from_config(&config.camera),
            pov: PointOfView::default(),
            input,
            last_frame: Instant::now(),
        })
    }

    fn resized(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(size, self.window.scale_factor());
        self.input.set_pointer_scale(self.gpu.pointer_scale(size));
    }

    fn toggle_pov(&mut self, button: ButtonId) {
        self.pov = self.pov.toggle(button);
        tracing::debug!(%button, pov = ?self.pov, "point of view changed");
    }

    /// One frame: input, panel, mass updates, physics, scene sync, camera,
    /// render.
    fn frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;

        if self.input.key_pressed(KeyCode::KeyE) {
            self.toggle_pov(ButtonId::EarthPov);
        }
        if self.input.key_pressed(KeyCode::KeyS) {
            self.toggle_pov(ButtonId::SunPov);
        }
        if self.input.key_pressed(KeyCode::Space) {
            let clock = self.orrery.clock_mut();
            clock.toggle_pause();
            tracing::info!(paused = clock.is_paused(), "simulation pause toggled");
        }

        let pointer = Pointer::from_input(&self.input);
        for event in self.panel.update(pointer, self.gpu.width() as f32) {
            match event {
                PanelEvent::MassChanged { body, mass } => self.masses.publish(body, mass),
                PanelEvent::Toggle(button) => self.toggle_pov(button),
            }
        }

        self.orrery.tick(dt);
        self.scene.sync(&self.orrery);

        self.orbit
            .update(&self.input, dt as f32, self.panel.captures_pointer());
        let camera = self.pov.camera(&self.orbit, &self.orrery);

        self.render(&camera);
        self.input.begin_frame();
    }

    fn render(&mut self, camera: &Camera) {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return;
            }
            Err(err) => {
                tracing::warn!(%err, "skipping frame");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.draw_2d.clear();
        self.panel.draw(
            &mut self.draw_2d,
            self.font.as_ref(),
            self.pov,
            self.orrery.clock().is_paused(),
            self.input.cursor(),
        );

        let visuals = self.scene.visuals();
        let draws: Vec<BodyDraw> = visuals
            .iter()
            .filter_map(|(transform, visual)| {
                Some(BodyDraw {
                    mesh: self.meshes.get(visual.mesh.0)?,
                    transform: *transform,
                    material: self.materials.get(visual.material.0)?,
                    tint: visual.tint,
                })
            })
            .collect();

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Body Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.body_pass.render(&self.gpu, &mut pass, camera, &draws);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panel Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.draw_2d.render(&self.gpu, &mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let OrreryApp::Pending { config } = self else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));

        let started = event_loop
            .create_window(window_attrs)
            .map_err(OrreryError::from)
            .and_then(|window| Running::new(Arc::new(window), config));

        match started {
            Ok(running) => {
                running.window.request_redraw();
                *self = OrreryApp::Running(Box::new(running));
            }
            Err(err) => {
                tracing::error!(%err, "startup failed");
                *self = OrreryApp::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let OrreryApp::Running(running) = self else {
            return;
        };

        running.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(steps = running.orrery.steps_taken(), "window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => running.resized(size),
            WindowEvent::RedrawRequested => {
                running.frame();
                running.window.request_redraw();
            }
            _ => {}
        }
    }
}
