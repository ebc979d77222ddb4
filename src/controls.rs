//! Mass controls: slider model and the channel that carries edits to the
//! simulation.
//!
//! The panel never writes into a [`Body`](crate::sim::Body). It publishes a
//! [`MassUpdate`] through a [`MassSender`]; the [`Orrery`](crate::sim::Orrery)
//! drains its [`MassReceiver`] at the start of every physics step.
//!
//! ```
//! use orrery::controls::mass_channel;
//! use orrery::sim::BodyRole;
//!
//! let (tx, rx) = mass_channel();
//! tx.publish(BodyRole::Primary, 10.0);
//! tx.publish(BodyRole::Primary, 20.0);
//!
//! let pending = rx.drain();
//! assert_eq!(pending.get(BodyRole::Primary), Some(20.0));
//! assert_eq!(pending.get(BodyRole::Orbiter), None);
//! ```

use std::sync::mpsc;

use crate::config::MassRange;
use crate::sim::BodyRole;

/// A new mass for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassUpdate {
    pub body: BodyRole,
    pub mass: f64,
}

/// Create a connected sender/receiver pair.
pub fn mass_channel() -> (MassSender, MassReceiver) {
    let (tx, rx) = mpsc::channel();
    (MassSender { tx }, MassReceiver { rx })
}

/// Publishing end, held by the control surface.
#[derive(Clone, Debug)]
pub struct MassSender {
    tx: mpsc::Sender<MassUpdate>,
}

impl MassSender {
    /// Queue a mass change for the next physics step.
    pub fn publish(&self, body: BodyRole, mass: f64) {
        if self.tx.send(MassUpdate { body, mass }).is_err() {
            tracing::warn!(?body, mass, "mass update dropped: simulation is gone");
        }
    }
}

/// Receiving end, owned by the simulation.
#[derive(Debug)]
pub struct MassReceiver {
    rx: mpsc::Receiver<MassUpdate>,
}

impl MassReceiver {
    /// Take everything queued so far, keeping the latest value per body.
    pub fn drain(&self) -> PendingMasses {
        let mut pending = PendingMasses::default();
        for update in self.rx.try_iter() {
            pending.record(update);
        }
        pending
    }
}

/// Latest queued mass per body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PendingMasses {
    orbiter: Option<f64>,
    primary: Option<f64>,
}

impl PendingMasses {
    fn record(&mut self, update: MassUpdate) {
        match update.body {
            BodyRole::Orbiter => self.orbiter = Some(update.mass),
            BodyRole::Primary => self.primary = Some(update.mass),
        }
    }

    pub fn get(&self, body: BodyRole) -> Option<f64> {
        match body {
            BodyRole::Orbiter => self.orbiter,
            BodyRole::Primary => self.primary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.orbiter.is_none() && self.primary.is_none()
    }
}

/// A bounded numeric slider with a fixed increment.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    pub label: String,
    pub range: MassRange,
    value: f64,
}

impl Slider {
    /// Create a slider showing `value`.
    ///
    /// The starting value is clamped into the range but not snapped, so a
    /// configured mass off the step grid is shown exactly as the simulation
    /// uses it. The first change snaps to the grid.
    pub fn new(label: impl Into<String>, range: MassRange, value: f64) -> Self {
        let value = if value.is_finite() {
            value.clamp(range.min, range.max)
        } else {
            range.min
        };
        Self {
            label: label.into(),
            range,
            value,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Clamp into the range and snap to the nearest `min + k * step`.
    ///
    /// The maximum is always reachable, even when the span is not a whole
    /// number of steps.
    pub fn quantize(&self, value: f64) -> f64 {
        let MassRange { min, max, step } = self.range;
        if !value.is_finite() {
            return self.value;
        }
        if value >= max {
            return max;
        }
        if value <= min {
            return min;
        }
        let snapped = min + ((value - min) / step).round() * step;
        snapped.clamp(min, max)
    }

    /// Set the value; returns the new value if it changed.
    pub fn set(&mut self, value: f64) -> Option<f64> {
        let next = self.quantize(value);
        if next != self.value {
            self.value = next;
            Some(next)
        } else {
            None
        }
    }

    /// Quantized value at fraction `t` (0 = min, 1 = max) along the track.
    pub fn value_at_fraction(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        self.quantize(self.range.min + t * (self.range.max - self.range.min))
    }

    /// Current value as a fraction of the track, for drawing the handle.
    pub fn fraction(&self) -> f64 {
        let span = self.range.max - self.range.min;
        if span <= 0.0 {
            0.0
        } else {
            ((self.value - self.range.min) / span).clamp(0.0, 1.0)
        }
    }

    /// Display string with as many decimals as the step needs. An off-grid
    /// starting value is shown in full.
    pub fn display_value(&self) -> String {
        if self.quantize(self.value) != self.value {
            return self.value.to_string();
        }
        let step = self.range.step;
        let decimals = if step.fract() == 0.0 {
            0
        } else {
            // 0.5 -> 1, 0.25 -> 2, 0.001 -> 3
            (-step.log10()).ceil().max(1.0) as usize
        };
        format!("{:.*}", decimals, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth_slider() -> Slider {
        Slider::new("mass", MassRange::new(0.0, 20.0, 0.5), 5.9724)
    }

    #[test]
    fn initial_value_is_shown_unsnapped() {
        let slider = earth_slider();
        assert_eq!(slider.value(), 5.9724);
        assert_eq!(slider.display_value(), "5.9724");
    }

    #[test]
    fn initial_value_is_clamped() {
        let range = MassRange::new(0.0, 20.0, 0.5);
        assert_eq!(Slider::new("mass", range, 31.0).value(), 20.0);
        assert_eq!(Slider::new("mass", range, -2.0).value(), 0.0);
        assert_eq!(Slider::new("mass", range, f64::NAN).value(), 0.0);
    }

    #[test]
    fn quantize_clamps_and_snaps() {
        let slider = earth_slider();
        assert_eq!(slider.quantize(-4.0), 0.0);
        assert_eq!(slider.quantize(33.0), 20.0);
        assert_eq!(slider.quantize(7.3), 7.5);
        assert_eq!(slider.quantize(7.2), 7.0);
        assert_eq!(slider.quantize(f64::NAN), slider.value());
    }

    #[test]
    fn max_is_reachable_off_grid() {
        let slider = Slider::new("mass", MassRange::new(0.0, 9_999_999.0, 10.0), 1_988_500.0);
        assert_eq!(slider.value(), 1_988_500.0);
        assert_eq!(slider.value_at_fraction(1.0), 9_999_999.0);
        assert_eq!(slider.quantize(9_999_996.0), 9_999_999.0);
        assert_eq!(slider.quantize(9_999_984.0), 9_999_980.0);
    }

    #[test]
    fn set_reports_only_changes() {
        let mut slider = earth_slider();
        // Leaving the off-grid start snaps to the grid.
        assert_eq!(slider.set(6.1), Some(6.0));
        assert_eq!(slider.set(6.1), None);
        assert_eq!(slider.display_value(), "6.0");
        assert_eq!(slider.set(8.0), Some(8.0));
        assert_eq!(slider.set(8.0), None);
    }

    #[test]
    fn fraction_round_trips_through_track() {
        let mut slider = earth_slider();
        slider.set(15.0);
        assert_eq!(slider.fraction(), 0.75);
        assert_eq!(slider.value_at_fraction(slider.fraction()), 15.0);
        assert_eq!(slider.value_at_fraction(-1.0), 0.0);
    }

    #[test]
    fn display_uses_step_precision() {
        let mut slider = earth_slider();
        slider.set(7.5);
        assert_eq!(slider.display_value(), "7.5");

        let sun = Slider::new("mass", MassRange::new(0.0, 9_999_999.0, 10.0), 1_988_500.0);
        assert_eq!(sun.display_value(), "1988500");
    }

    #[test]
    fn drain_keeps_latest_per_body() {
        let (tx, rx) = mass_channel();
        tx.publish(BodyRole::Orbiter, 1.0);
        tx.publish(BodyRole::Primary, 100.0);
        tx.publish(BodyRole::Orbiter, 2.5);

        let pending = rx.drain();
        assert_eq!(pending.get(BodyRole::Orbiter), Some(2.5));
        assert_eq!(pending.get(BodyRole::Primary), Some(100.0));

        assert!(rx.drain().is_empty());
    }

    #[test]
    fn publish_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = mass_channel();
        drop(rx);
        tx.publish(BodyRole::Orbiter, 1.0);
    }
}
