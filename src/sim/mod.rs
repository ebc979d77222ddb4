//! Two-body orbit simulation.
//!
//! - [`Body`] and [`BodyRole`] describe the simulated point masses
//! - [`integrator`] holds the force, direction and Euler step functions
//! - [`FixedStep`] turns frame time into whole physics steps
//! - [`Orrery`] owns both bodies and ties the pieces together

mod body;
mod clock;
pub mod integrator;
mod orrery;

pub use body::{Body, BodyRole};
pub use clock::{FixedStep, MAX_TIME_SCALE};
pub use integrator::{GRAVITATIONAL_CONSTANT, coast, direction, gravitational_force, step};
pub use orrery::{Orrery, TickReport};
