use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::config::CameraConfig;
use crate::input::Input;

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// A free camera that orbits a target point with damped motion.
///
/// Mouse drags and wheel steps do not move the camera directly. They add to a
/// pending delta which is applied a fraction at a time, so the camera keeps
/// gliding for a moment after the mouse stops.
///
/// In the frame loop, [`OrbitCamera::update`] feeds the mouse into
/// [`drag`](OrbitCamera::drag) and [`scroll`](OrbitCamera::scroll) and then
/// calls [`settle`](OrbitCamera::settle).
///
/// # Example
/// ```
/// use glam::Vec3;
/// use orrery::orbit_camera::OrbitCamera;
///
/// let mut orbit = OrbitCamera::new()
///     .target(Vec3::ZERO)
///     .distance(40.0)
///     .damping(0.05);
///
/// // Two wheel steps toward the target, then one 60 Hz frame.
/// orbit.scroll(2.0);
/// orbit.settle(1.0 / 60.0);
///
/// assert!(orbit.distance < 40.0);
/// assert!(orbit.is_moving());
/// assert_eq!(orbit.camera().position, orbit.eye());
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), kept short of the poles.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the pending motion applied per 60 Hz frame. `1.0`
    /// disables damping.
    pub damping: f32,
    /// Radians per pixel of mouse drag.
    pub sensitivity: f32,
    /// Fractional zoom per wheel line.
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_rotation: Vec2,
    pending_zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 40.0,
            azimuth: 0.0,
            elevation: ELEVATION_LIMIT,
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 100.0,
            damping: 0.05,
            sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            min_distance: 2.0,
            max_distance: 90.0,
            pending_rotation: Vec2::ZERO,
            pending_zoom: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `camera` section of the config.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new()
            .distance_limits(config.min_distance, config.max_distance)
            .distance(config.distance)
            .azimuth(config.azimuth)
            .elevation(config.elevation)
            .fov(config.fov_degrees)
            .clip(config.near, config.far)
            .damping(config.damping)
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the distance from target.
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn azimuth(mut self, azimuth: f32) -> Self {
        self.azimuth = azimuth;
        self
    }

    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.001, 1.0);
        self
    }

    /// Set distance limits.
    pub fn distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max.max(min);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Feed this frame's mouse state and advance the damped motion.
    ///
    /// Pass `pointer_captured = true` when the panel owns the mouse so drags
    /// on a slider do not spin the view.
    pub fn update(&mut self, input: &Input, dt: f32, pointer_captured: bool) {
        if !pointer_captured {
            if input.mouse_down(MouseButton::Left) {
                self.drag(input.mouse_delta());
            }
            self.scroll(input.scroll_delta().y);
        }
        self.settle(dt);
    }

    /// Queue a rotation from a mouse drag of `delta` pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.pending_rotation += Vec2::new(-delta.x, delta.y) * self.sensitivity;
    }

    /// Queue a zoom from `lines` wheel steps (positive zooms in).
    pub fn scroll(&mut self, lines: f32) {
        self.pending_zoom -= lines * self.zoom_sensitivity;
    }

    /// Apply part of the pending motion for a frame of `dt` seconds.
    pub fn settle(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        // Same decay per second regardless of frame rate.
        let keep = (1.0 - self.damping).powf(dt * 60.0);
        let applied = 1.0 - keep;

        let rotation = self.pending_rotation * applied;
        self.azimuth += rotation.x;
        self.elevation = (self.elevation + rotation.y).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self.pending_rotation -= rotation;

        let zoom = self.pending_zoom * applied;
        self.distance = (self.distance * (1.0 + zoom)).clamp(self.min_distance, self.max_distance);
        self.pending_zoom -= zoom;

        if self.pending_rotation.length_squared() < 1e-12 {
            self.pending_rotation = Vec2::ZERO;
        }
        if self.pending_zoom.abs() < 1e-6 {
            self.pending_zoom = 0.0;
        }
    }

    /// True while queued motion is still being applied.
    pub fn is_moving(&self) -> bool {
        self.pending_rotation != Vec2::ZERO || self.pending_zoom != 0.0
    }

    /// Eye position for the current angles.
    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );
        self.target + offset
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        Camera::new()
            .at(self.eye())
            .looking_at(self.target)
            .with_clip(self.near, self.far)
            .with_fov(self.fov.to_degrees())
    }
}
