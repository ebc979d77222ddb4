//! Point-of-view state for the camera buttons.
//!
//! The two buttons are mutually exclusive by construction: the state is a
//! single enum, so "follow Earth" and "follow Sun" can never both be on.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::camera::Camera;
use crate::orbit_camera::OrbitCamera;
use crate::sim::{BodyRole, Orrery};

/// Which body, if any, the camera rides on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointOfView {
    /// User-controlled orbit camera.
    #[default]
    Free,
    /// Eye on the orbiter, looking at the primary.
    FollowOrbiter,
    /// Eye on the primary, looking at the orbiter.
    FollowPrimary,
}

impl PointOfView {
    /// Apply a button press. Pressing the button of the active mode returns
    /// to [`PointOfView::Free`].
    pub fn toggle(self, button: ButtonId) -> Self {
        let target = button.point_of_view();
        if self == target { Self::Free } else { target }
    }

    /// The body the eye sits on, if following one.
    pub fn eye_body(self) -> Option<BodyRole> {
        match self {
            Self::Free => None,
            Self::FollowOrbiter => Some(BodyRole::Orbiter),
            Self::FollowPrimary => Some(BodyRole::Primary),
        }
    }

    /// Whether `button` is the one currently lit.
    pub fn is_active(self, button: ButtonId) -> bool {
        self == button.point_of_view()
    }

    /// Camera for this frame.
    ///
    /// In [`PointOfView::Free`] this is the orbit camera. Otherwise the eye
    /// sits on one body's drawn position and looks at the other, keeping the
    /// orbit camera's projection settings.
    pub fn camera(self, orbit: &OrbitCamera, orrery: &Orrery) -> Camera {
        let Some(eye_role) = self.eye_body() else {
            return orbit.camera();
        };
        let eye = orrery.drawn_position(eye_role).as_vec3();
        let target = orrery.drawn_position(eye_role.other()).as_vec3();
        follow_camera(orbit.camera(), eye, target)
    }
}

/// Move `base` to `eye` and aim it at `target`. When the two points
/// coincide (or are not finite) the camera looks down -Z.
pub fn follow_camera(base: Camera, eye: Vec3, target: Vec3) -> Camera {
    let mut camera = base;
    camera.position = if eye.is_finite() { eye } else { Vec3::ZERO };
    camera.forward = (target - camera.position).normalize_or(Vec3::NEG_Z);
    camera
}

/// Identifiers of the panel's point-of-view buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonId {
    EarthPov,
    SunPov,
}

impl ButtonId {
    pub const ALL: [ButtonId; 2] = [ButtonId::EarthPov, ButtonId::SunPov];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarthPov => "earth_pov",
            Self::SunPov => "sun_pov",
        }
    }

    fn point_of_view(self) -> PointOfView {
        match self {
            Self::EarthPov => PointOfView::FollowOrbiter,
            Self::SunPov => PointOfView::FollowPrimary,
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown button id `{0}`")]
pub struct UnknownButton(pub String);

impl FromStr for ButtonId {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earth_pov" => Ok(Self::EarthPov),
            "sun_pov" => Ok(Self::SunPov),
            other => Err(UnknownButton(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrreryConfig;
    use crate::controls::mass_channel;

    #[test]
    fn toggling_twice_returns_to_free() {
        let pov = PointOfView::Free.toggle(ButtonId::EarthPov);
        assert_eq!(pov, PointOfView::FollowOrbiter);
        assert_eq!(pov.toggle(ButtonId::EarthPov), PointOfView::Free);
    }

    #[test]
    fn other_button_switches_directly() {
        let pov = PointOfView::Free
            .toggle(ButtonId::EarthPov)
            .toggle(ButtonId::SunPov);
        assert_eq!(pov, PointOfView::FollowPrimary);
        assert!(pov.is_active(ButtonId::SunPov));
        assert!(!pov.is_active(ButtonId::EarthPov));
    }

    #[test]
    fn at_most_one_button_lit() {
        let presses = [
            ButtonId::EarthPov,
            ButtonId::SunPov,
            ButtonId::SunPov,
            ButtonId::EarthPov,
            ButtonId::EarthPov,
            ButtonId::SunPov,
        ];
        let mut pov = PointOfView::default();
        for button in presses {
            pov = pov.toggle(button);
            let lit = ButtonId::ALL.iter().filter(|b| pov.is_active(**b)).count();
            assert!(lit <= 1);
        }
    }

    #[test]
    fn button_ids_parse() {
        for button in ButtonId::ALL {
            assert_eq!(button.as_str().parse::<ButtonId>(), Ok(button));
        }
        assert_eq!(
            "moon_pov".parse::<ButtonId>(),
            Err(UnknownButton("moon_pov".to_string()))
        );
    }

    #[test]
    fn follow_orbiter_looks_at_primary() {
        let (_tx, rx) = mass_channel();
        let orrery = Orrery::new(&OrreryConfig::default(), rx);
        let orbit = OrbitCamera::new();

        let camera = PointOfView::FollowOrbiter.camera(&orbit, &orrery);
        assert!((camera.position - Vec3::new(24.959787, 0.0, 0.0)).length() < 1e-4);
        assert!((camera.forward - Vec3::NEG_X).length() < 1e-6);

        let camera = PointOfView::FollowPrimary.camera(&orbit, &orrery);
        assert_eq!(camera.position, Vec3::ZERO);
        assert!((camera.forward - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn follow_eye_rides_the_drawn_orbiter() {
        let (_tx, rx) = mass_channel();
        let mut orrery = Orrery::new(&OrreryConfig::default(), rx);
        orrery.tick(1.5 / 60.0);

        let camera = PointOfView::FollowOrbiter.camera(&OrbitCamera::new(), &orrery);
        let drawn = orrery.drawn_position(BodyRole::Orbiter).as_vec3();
        assert_eq!(camera.position, drawn);
        assert_ne!(camera.position, orrery.body(BodyRole::Orbiter).position.as_vec3());
    }

    #[test]
    fn free_uses_orbit_camera() {
        let (_tx, rx) = mass_channel();
        let orrery = Orrery::new(&OrreryConfig::default(), rx);
        let orbit = OrbitCamera::new().distance(30.0);

        assert_eq!(PointOfView::Free.camera(&orbit, &orrery), orbit.camera());
    }

    #[test]
    fn degenerate_follow_looks_down_negative_z() {
        let camera = follow_camera(Camera::new(), Vec3::ONE, Vec3::ONE);
        assert_eq!(camera.forward, Vec3::NEG_Z);

        let camera = follow_camera(Camera::new(), Vec3::splat(f32::NAN), Vec3::X);
        assert_eq!(camera.position, Vec3::ZERO);
        assert_eq!(camera.forward, Vec3::X);
    }
}
