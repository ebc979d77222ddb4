/// Largest accepted time-scale multiplier.
pub const MAX_TIME_SCALE: f64 = 64.0;

/// Converts variable frame deltas into a whole number of fixed physics steps.
///
/// Frame time is added to an accumulator; every full `step_seconds` in the
/// accumulator is one physics step. This keeps the orbit identical no matter
/// how the host splits time into frames.
///
/// # Example
/// ```
/// use orrery::sim::FixedStep;
///
/// let mut clock = FixedStep::new(1.0 / 60.0, 8);
/// assert_eq!(clock.advance(1.0 / 30.0), 2);
/// ```
#[derive(Clone, Debug)]
pub struct FixedStep {
    step_seconds: f64,
    max_steps_per_tick: u32,
    accumulator: f64,
    time_scale: f64,
    paused: bool,
}

impl FixedStep {
    /// Create a clock that emits one step per `step_seconds` of scaled time.
    ///
    /// `step_seconds` must be positive; `max_steps_per_tick` is raised to at
    /// least one.
    pub fn new(step_seconds: f64, max_steps_per_tick: u32) -> Self {
        debug_assert!(step_seconds > 0.0, "step_seconds must be positive");
        Self {
            step_seconds,
            max_steps_per_tick: max_steps_per_tick.max(1),
            accumulator: 0.0,
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Builder form of [`set_time_scale`](Self::set_time_scale).
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.set_time_scale(scale);
        self
    }

    /// Add `dt` seconds of frame time and return how many steps are due.
    ///
    /// Negative or non-finite deltas are ignored. When more than
    /// `max_steps_per_tick` steps are due, the extra backlog is dropped.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        self.accumulator += dt * self.time_scale;

        let due = (self.accumulator / self.step_seconds).floor();
        if due < 1.0 {
            return 0;
        }

        if due > self.max_steps_per_tick as f64 {
            self.accumulator = 0.0;
            return self.max_steps_per_tick;
        }

        let steps = due as u32;
        self.accumulator -= steps as f64 * self.step_seconds;
        // Rounding can leave a hair below zero after the subtraction.
        self.accumulator = self.accumulator.max(0.0);
        steps
    }

    /// Fraction of a step currently sitting in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.step_seconds).clamp(0.0, 1.0)
    }

    pub fn step_seconds(&self) -> f64 {
        self.step_seconds
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set the simulation speed multiplier, clamped to `0..=MAX_TIME_SCALE`.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_finite() {
            scale.clamp(0.0, MAX_TIME_SCALE)
        } else {
            1.0
        };
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Drop any partially accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 0.25;

    #[test]
    fn whole_steps_across_uneven_frames() {
        let mut clock = FixedStep::new(STEP, 100);
        let frames = [0.125, 0.25, 0.0625, 0.5, 0.3125];

        let total: u32 = frames.iter().map(|dt| clock.advance(*dt)).sum();
        // 1.25 seconds of frames at 0.25 s per step.
        assert_eq!(total, 5);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn small_frames_accumulate() {
        let mut clock = FixedStep::new(STEP, 4);
        assert_eq!(clock.advance(0.1), 0);
        assert_eq!(clock.advance(0.1), 0);
        assert_eq!(clock.advance(0.1), 1);
        assert!((clock.alpha() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn backlog_is_capped() {
        let mut clock = FixedStep::new(STEP, 3);
        assert_eq!(clock.advance(10.0), 3);
        // The stall was dropped, not carried into the next frame.
        assert_eq!(clock.advance(0.25), 1);
    }

    #[test]
    fn paused_clock_emits_nothing() {
        let mut clock = FixedStep::new(STEP, 8);
        clock.pause();
        assert_eq!(clock.advance(1.0), 0);

        clock.resume();
        assert_eq!(clock.advance(0.5), 2);
    }

    #[test]
    fn toggle_pause_flips() {
        let mut clock = FixedStep::new(STEP, 8);
        clock.toggle_pause();
        assert!(clock.is_paused());
        clock.toggle_pause();
        assert!(!clock.is_paused());
    }

    #[test]
    fn time_scale_multiplies_frame_time() {
        let mut clock = FixedStep::new(STEP, 100).with_time_scale(4.0);
        assert_eq!(clock.advance(0.25), 4);

        clock.set_time_scale(0.0);
        assert_eq!(clock.advance(10.0), 0);
    }

    #[test]
    fn time_scale_is_clamped() {
        let mut clock = FixedStep::new(STEP, 8);
        clock.set_time_scale(1000.0);
        assert_eq!(clock.time_scale(), MAX_TIME_SCALE);
        clock.set_time_scale(-3.0);
        assert_eq!(clock.time_scale(), 0.0);
        clock.set_time_scale(f64::NAN);
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut clock = FixedStep::new(STEP, 8);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f64::INFINITY), 0);
        assert_eq!(clock.advance(f64::NAN), 0);
        assert_eq!(clock.alpha(), 0.0);
    }
}
