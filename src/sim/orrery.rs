use glam::DVec3;

use super::body::{Body, BodyRole};
use super::clock::FixedStep;
use super::integrator::{coast, direction, gravitational_force, step};
use crate::config::{BodyConfig, OrreryConfig};
use crate::controls::MassReceiver;
use crate::error::IntegratorError;

/// What happened during one [`Orrery::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Physics steps taken.
    pub steps: u32,
    /// Steps where the bodies coincided and the orbiter coasted.
    pub coincident_steps: u32,
}

/// The two-body system: an orbiter pulled toward a fixed primary.
///
/// Mass edits arrive through a [`MassReceiver`] and are applied at the start
/// of the next step. Only the orbiter moves; both bodies carry a cosmetic
/// spin angle advanced by wall-clock time.
///
/// Physics advances in whole steps, so between steps the drawn position is
/// blended from the last two states by the clock's leftover fraction. See
/// [`Orrery::drawn_position`].
///
/// # Example
/// ```
/// use orrery::controls::mass_channel;
/// use orrery::sim::{BodyRole, Orrery};
/// use orrery::OrreryConfig;
///
/// let (tx, rx) = mass_channel();
/// let mut orrery = Orrery::new(&OrreryConfig::default(), rx);
///
/// tx.publish(BodyRole::Orbiter, 0.0);
/// orrery.step_once().unwrap();
/// assert_eq!(orrery.body(BodyRole::Orbiter).mass, 0.0);
/// ```
pub struct Orrery {
    orbiter: Body,
    primary: Body,
    /// Orbiter position before the most recent step.
    previous_orbiter: DVec3,
    spin: [f32; 2],
    spin_rate: [f32; 2],
    gravitational_constant: f64,
    clock: FixedStep,
    masses: MassReceiver,
    steps_taken: u64,
    warned_non_finite: bool,
}

impl Orrery {
    pub fn new(config: &OrreryConfig, masses: MassReceiver) -> Self {
        let sim = &config.simulation;
        let mut clock =
            FixedStep::new(sim.step_seconds, sim.max_steps_per_tick).with_time_scale(sim.time_scale);
        if sim.start_paused {
            clock.pause();
        }

        let orbiter = body_from(&config.orbiter);
        Self {
            previous_orbiter: orbiter.position,
            orbiter,
            primary: body_from(&config.primary),
            spin: [0.0; 2],
            spin_rate: [config.orbiter.spin_rate, config.primary.spin_rate],
            gravitational_constant: sim.gravitational_constant,
            clock,
            masses,
            steps_taken: 0,
            warned_non_finite: false,
        }
    }

    /// Advance by `dt` seconds of wall-clock time.
    ///
    /// Spin follows `dt` directly. Physics advances by however many fixed
    /// steps the clock says are due.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        if !self.clock.is_paused() && dt.is_finite() && dt > 0.0 {
            let scaled = (dt * self.clock.time_scale()) as f32;
            for (angle, rate) in self.spin.iter_mut().zip(self.spin_rate) {
                *angle = (*angle + rate * scaled).rem_euclid(std::f32::consts::TAU);
            }
        }

        let mut report = TickReport::default();
        for _ in 0..self.clock.advance(dt) {
            if self.step_once().is_err() {
                report.coincident_steps += 1;
            }
            report.steps += 1;
        }
        report
    }

    /// Take exactly one physics step, ignoring the clock.
    ///
    /// Pending mass updates are applied first. If the bodies coincide in the
    /// x–z plane the orbiter coasts on its current velocity and the error is
    /// returned.
    pub fn step_once(&mut self) -> Result<(), IntegratorError> {
        self.apply_pending_masses();
        self.previous_orbiter = self.orbiter.position;

        let result = gravitational_force(self.gravitational_constant, &self.orbiter, &self.primary);
        match result {
            Ok(force) => {
                let dir = direction(&self.orbiter, &self.primary);
                step(force, dir, &mut self.orbiter);
            }
            Err(err) => {
                tracing::warn!(%err, "orbiter coasting through the primary");
                coast(&mut self.orbiter);
            }
        }
        self.steps_taken += 1;

        if !self.warned_non_finite && !self.orbiter.is_finite() {
            self.warned_non_finite = true;
            tracing::warn!(
                step = self.steps_taken,
                "orbiter state is no longer finite; the orbit has diverged"
            );
        }

        result.map(|_| ())
    }

    fn apply_pending_masses(&mut self) {
        let pending = self.masses.drain();
        if pending.is_empty() {
            return;
        }
        for role in BodyRole::ALL {
            if let Some(mass) = pending.get(role) {
                tracing::debug!(?role, mass, "mass updated");
                self.body_mut(role).mass = mass;
            }
        }
    }

    pub fn body(&self, role: BodyRole) -> &Body {
        match role {
            BodyRole::Orbiter => &self.orbiter,
            BodyRole::Primary => &self.primary,
        }
    }

    fn body_mut(&mut self, role: BodyRole) -> &mut Body {
        match role {
            BodyRole::Orbiter => &mut self.orbiter,
            BodyRole::Primary => &mut self.primary,
        }
    }

    /// Where to draw `role` this frame.
    ///
    /// Interpolates between the state before and after the last step by
    /// [`FixedStep::alpha`], so the picture advances smoothly even when
    /// frames alternate between zero and two steps. The result trails the
    /// simulation by at most one step.
    pub fn drawn_position(&self, role: BodyRole) -> DVec3 {
        match role {
            BodyRole::Orbiter => self
                .previous_orbiter
                .lerp(self.orbiter.position, self.clock.alpha()),
            BodyRole::Primary => self.primary.position,
        }
    }

    /// Cosmetic self-rotation angle in radians, in `[0, TAU)`.
    pub fn spin(&self, role: BodyRole) -> f32 {
        match role {
            BodyRole::Orbiter => self.spin[0],
            BodyRole::Primary => self.spin[1],
        }
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn clock(&self) -> &FixedStep {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FixedStep {
        &mut self.clock
    }
}

fn body_from(config: &BodyConfig) -> Body {
    Body::new(config.mass)
        .at(DVec3::from_array(config.position))
        .moving(DVec3::from_array(config.velocity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{MassSender, mass_channel};

    fn stock() -> (Orrery, MassSender) {
        let (tx, rx) = mass_channel();
        (Orrery::new(&OrreryConfig::default(), rx), tx)
    }

    #[test]
    fn starts_from_config() {
        let (orrery, _tx) = stock();
        let earth = orrery.body(BodyRole::Orbiter);

        assert_eq!(earth.position, DVec3::new(24.959787, 0.0, 0.0));
        assert_eq!(earth.velocity, DVec3::new(0.0, 0.0, -0.5));
        assert_eq!(orrery.body(BodyRole::Primary).mass, 1_988_500.0);
    }

    #[test]
    fn primary_never_moves() {
        let (mut orrery, _tx) = stock();
        for _ in 0..500 {
            let _ = orrery.step_once();
        }
        assert_eq!(orrery.body(BodyRole::Primary).position, DVec3::ZERO);
        assert_eq!(orrery.steps_taken(), 500);
    }

    #[test]
    fn tick_steps_once_per_sixtieth() {
        let (mut orrery, _tx) = stock();

        let report = orrery.tick(0.051);
        assert_eq!(report.steps, 3);
        assert_eq!(orrery.steps_taken(), 3);
    }

    #[test]
    fn paused_tick_freezes_everything() {
        let (mut orrery, _tx) = stock();
        orrery.clock_mut().pause();

        let before = *orrery.body(BodyRole::Orbiter);
        let report = orrery.tick(1.0);

        assert_eq!(report.steps, 0);
        assert_eq!(*orrery.body(BodyRole::Orbiter), before);
        assert_eq!(orrery.spin(BodyRole::Orbiter), 0.0);
    }

    #[test]
    fn mass_update_applies_on_next_step() {
        let (mut orrery, tx) = stock();
        tx.publish(BodyRole::Primary, 0.0);

        // Nothing applied until a step runs.
        assert_eq!(orrery.body(BodyRole::Primary).mass, 1_988_500.0);

        let velocity = orrery.body(BodyRole::Orbiter).velocity;
        orrery.step_once().unwrap();

        assert_eq!(orrery.body(BodyRole::Primary).mass, 0.0);
        assert_eq!(orrery.body(BodyRole::Orbiter).velocity, velocity);
    }

    #[test]
    fn latest_mass_update_wins() {
        let (mut orrery, tx) = stock();
        tx.publish(BodyRole::Orbiter, 3.0);
        tx.publish(BodyRole::Orbiter, 4.5);
        orrery.step_once().unwrap();

        assert_eq!(orrery.body(BodyRole::Orbiter).mass, 4.5);
    }

    #[test]
    fn coincident_bodies_coast() {
        let mut config = OrreryConfig::default();
        config.orbiter.position = [0.0, 3.0, 0.0];
        config.orbiter.velocity = [1.0, 0.0, 0.0];
        let (_tx, rx) = mass_channel();
        let mut orrery = Orrery::new(&config, rx);

        let err = orrery.step_once().unwrap_err();
        assert!(matches!(err, IntegratorError::CoincidentBodies { .. }));
        assert_eq!(
            orrery.body(BodyRole::Orbiter).position,
            DVec3::new(1.0, 3.0, 0.0)
        );
        assert_eq!(orrery.body(BodyRole::Orbiter).velocity, DVec3::X);
    }

    #[test]
    fn tick_counts_coincident_steps() {
        let mut config = OrreryConfig::default();
        config.orbiter.position = [0.0, 0.0, 0.0];
        config.orbiter.velocity = [0.0, 0.0, 0.0];
        let (_tx, rx) = mass_channel();
        let mut orrery = Orrery::new(&config, rx);

        let report = orrery.tick(2.0 / 60.0 + 1e-9);
        assert_eq!(report.steps, 2);
        assert_eq!(report.coincident_steps, 2);
    }

    #[test]
    fn spin_wraps_and_follows_rates() {
        let (mut orrery, _tx) = stock();
        orrery.tick(1.0);

        assert!((orrery.spin(BodyRole::Orbiter) - 0.46).abs() < 1e-5);
        assert!((orrery.spin(BodyRole::Primary) - 1.997).abs() < 1e-5);

        for _ in 0..10 {
            orrery.tick(1.0);
        }
        assert!(orrery.spin(BodyRole::Primary) < std::f32::consts::TAU);
    }

    #[test]
    fn drawn_position_blends_last_step() {
        let (mut orrery, _tx) = stock();
        let start = orrery.body(BodyRole::Orbiter).position;
        assert_eq!(orrery.drawn_position(BodyRole::Orbiter), start);

        // One step plus half a step left in the accumulator.
        assert_eq!(orrery.tick(1.5 / 60.0).steps, 1);
        let after = orrery.body(BodyRole::Orbiter).position;
        let drawn = orrery.drawn_position(BodyRole::Orbiter);

        assert!((drawn - start.lerp(after, 0.5)).length() < 1e-9);
        assert_eq!(orrery.drawn_position(BodyRole::Primary), DVec3::ZERO);
    }

    #[test]
    fn drawn_motion_is_even_under_frame_jitter() {
        let (mut orrery, _tx) = stock();
        let mut last = orrery.drawn_position(BodyRole::Orbiter);
        let mut step_counts = Vec::new();

        for frame in 0..600 {
            let dt = if frame % 2 == 0 { 0.0166 } else { 0.0167334 };
            step_counts.push(orrery.tick(dt).steps);

            let drawn = orrery.drawn_position(BodyRole::Orbiter);
            let moved = (drawn - last).length();
            last = drawn;

            // Skip the frames before two states exist to blend between.
            if frame < 4 {
                continue;
            }
            let speed = orrery.body(BodyRole::Orbiter).velocity.length();
            let ratio = moved / speed;
            assert!((0.9..1.1).contains(&ratio), "frame {frame}: moved {ratio} steps");
        }

        // The physics itself still lurches.
        assert!(step_counts.contains(&0));
        assert!(step_counts.contains(&2));
    }

    #[test]
    fn start_paused_is_honored() {
        let mut config = OrreryConfig::default();
        config.simulation.start_paused = true;
        let (_tx, rx) = mass_channel();
        let orrery = Orrery::new(&config, rx);

        assert!(orrery.clock().is_paused());
    }
}
