//! Force, direction and forward-Euler stepping for the two-body orbit.
//!
//! These are free functions over [`Body`] values so they can be called and
//! tested without any of the surrounding application. One call to [`step`]
//! advances a body by exactly one tick; there is no timestep scaling here.
//! Converting wall-clock time into ticks is the job of
//! [`FixedStep`](super::FixedStep).
//!
//! The model is deliberately simple:
//!
//! - Force is `G * m_a * m_b / d` with `d` measured in the x–z plane only.
//! - The attraction vector is the raw offset between the bodies, not a unit
//!   vector. Its length is folded into the velocity change.
//!
//! ```
//! use orrery::sim::{Body, direction, gravitational_force, step, GRAVITATIONAL_CONSTANT};
//!
//! let sun = Body::new(1_988_500.0);
//! let mut earth = Body::new(5.9724).at([24.959787, 0.0, 0.0]).moving([0.0, 0.0, -0.5]);
//!
//! let force = gravitational_force(GRAVITATIONAL_CONSTANT, &earth, &sun).unwrap();
//! let dir = direction(&earth, &sun);
//! step(force, dir, &mut earth);
//! ```

use glam::DVec3;

use super::body::Body;
use crate::error::IntegratorError;

/// Scaled gravitational constant used by the default scene.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67408e-10;

/// Gravitational force magnitude between two bodies.
///
/// Returns [`IntegratorError::CoincidentBodies`] when the bodies share the
/// same x/z coordinates, since the division would be by zero.
pub fn gravitational_force(g: f64, a: &Body, b: &Body) -> Result<f64, IntegratorError> {
    let distance = a.planar_distance(b);
    if distance == 0.0 {
        return Err(IntegratorError::CoincidentBodies {
            x: a.position.x,
            z: a.position.z,
        });
    }
    // Mass product first: the result must not depend on argument order.
    Ok(g * ((a.mass * b.mass) / distance))
}

/// Attraction vector pointing from `a` to `b` (unnormalized).
pub fn direction(a: &Body, b: &Body) -> DVec3 {
    b.position - a.position
}

/// Advance `body` by one tick: velocity first, then position.
pub fn step(force: f64, direction: DVec3, body: &mut Body) {
    body.velocity += direction * force;
    body.position += body.velocity;
}

/// Advance `body` by one tick with no force applied.
pub fn coast(body: &mut Body) {
    body.position += body.velocity;
}
