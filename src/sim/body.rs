use glam::DVec3;

/// Which of the two simulated bodies a value refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyRole {
    /// The body that moves (the Earth by default).
    Orbiter,
    /// The stationary central body (the Sun by default).
    Primary,
}

impl BodyRole {
    /// Both roles, orbiter first.
    pub const ALL: [BodyRole; 2] = [BodyRole::Orbiter, BodyRole::Primary];

    /// The other body of the pair.
    pub fn other(self) -> Self {
        match self {
            BodyRole::Orbiter => BodyRole::Primary,
            BodyRole::Primary => BodyRole::Orbiter,
        }
    }
}

/// A simulated point mass.
///
/// Bodies only carry kinematic state. The sphere that draws a body lives in
/// the render scene and is kept in sync by copying `position` each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// World-space position, advanced once per physics step.
    pub position: DVec3,
    /// Velocity in world units per step.
    pub velocity: DVec3,
    /// Scaled mass. Never negative when set through the mass channel.
    pub mass: f64,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            mass: 0.0,
        }
    }
}

impl Body {
    pub fn new(mass: f64) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }

    /// Set the initial position.
    pub fn at(mut self, position: impl Into<DVec3>) -> Self {
        self.position = position.into();
        self
    }

    /// Set the initial velocity.
    pub fn moving(mut self, velocity: impl Into<DVec3>) -> Self {
        self.velocity = velocity.into();
        self
    }

    /// Distance to `other` measured in the x–z plane only.
    pub fn planar_distance(&self, other: &Body) -> f64 {
        let dx = other.position.x - self.position.x;
        let dz = other.position.z - self.position.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// True while position and velocity hold only finite numbers.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}
