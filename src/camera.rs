use glam::{Mat4, Vec3};

/// A perspective camera for the 3D scene.
///
/// Holds the eye position, a view direction and the projection settings.
/// The aspect ratio is not stored; it comes from the surface each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    /// Point the camera at `target`. Keeps the current direction if the
    /// target sits on the eye.
    pub fn looking_at(mut self, target: impl Into<Vec3>) -> Self {
        self.forward = (target.into() - self.position).normalize_or(self.forward);
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Up vector to hand to the view matrix. Falls back to +Z when looking
    /// straight along the configured up axis.
    fn stable_up(&self) -> Vec3 {
        if self.forward.cross(self.up).length_squared() < 1e-8 {
            Vec3::NEG_Z
        } else {
            self.up
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.stable_up())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(1e-4), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_normalizes() {
        let camera = Camera::new().at(Vec3::ZERO).looking_at(Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(camera.forward, Vec3::NEG_Z);
    }

    #[test]
    fn looking_at_own_position_keeps_direction() {
        let camera = Camera::new().at(Vec3::ONE).looking_at(Vec3::ONE);
        assert_eq!(camera.forward, Vec3::NEG_Z);
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let camera = Camera::new().at(Vec3::new(3.0, 4.0, 5.0)).looking_at(Vec3::ZERO);
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.length() < 1e-5);
    }

    #[test]
    fn straight_down_view_is_finite() {
        let camera = Camera::new()
            .at(Vec3::new(0.0, 40.0, 0.0))
            .looking_at(Vec3::ZERO);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn target_lands_in_front() {
        let camera = Camera::new().at(Vec3::new(0.0, 0.0, 10.0)).looking_at(Vec3::ZERO);
        let clip = camera.view_projection(16.0 / 9.0) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
