//! Runtime configuration.
//!
//! Every section has defaults matching the stock Sun/Earth scene, and every
//! field can be overridden from a JSON file. Missing fields fall back to the
//! defaults, so a file only needs the values it changes:
//!
//! ```json
//! {
//!   "window": { "width": 1600, "height": 900 },
//!   "primary": { "mass": 2500000.0 },
//!   "simulation": { "time_scale": 2.0 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::GRAVITATIONAL_CONSTANT;

/// Complete application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct OrreryConfig {
    pub window: WindowConfig,
    pub simulation: SimulationConfig,
    pub orbiter: BodyConfig,
    pub primary: BodyConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            simulation: SimulationConfig::default(),
            orbiter: BodyConfig::earth(),
            primary: BodyConfig::sun(),
            camera: CameraConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// On-disk shape of the config. Body sections are patches over the stock
/// Earth and Sun, since the two bodies have different defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    window: WindowConfig,
    simulation: SimulationConfig,
    orbiter: BodyPatch,
    primary: BodyPatch,
    camera: CameraConfig,
    ui: UiConfig,
}

impl From<ConfigFile> for OrreryConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            window: file.window,
            simulation: file.simulation,
            orbiter: file.orbiter.apply(BodyConfig::earth()),
            primary: file.primary.apply(BodyConfig::sun()),
            camera: file.camera,
            ui: file.ui,
        }
    }
}

impl OrreryConfig {
    /// Read a config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.orbiter.validate("orbiter")?;
        self.primary.validate("primary")?;

        positive("simulation.step_seconds", self.simulation.step_seconds)?;
        positive("window.max_pixel_ratio", self.window.max_pixel_ratio as f64)?;
        positive("camera.near", self.camera.near as f64)?;
        positive("camera.far", self.camera.far as f64)?;
        positive("ui.font_size", self.ui.font_size as f64)?;
        if !self.simulation.gravitational_constant.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "simulation.gravitational_constant",
                value: self.simulation.gravitational_constant,
            });
        }
        Ok(())
    }

    /// Pretty JSON rendering of the effective configuration.
    pub fn to_json(&self) -> String {
        // Plain data with string keys always serializes.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Window and surface settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Upper bound on the device pixel ratio used for the surface.
    pub max_pixel_ratio: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Orrery".to_string(),
            width: 1280,
            height: 720,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Physics stepping settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub gravitational_constant: f64,
    /// Wall-clock seconds per physics step.
    pub step_seconds: f64,
    pub max_steps_per_tick: u32,
    pub time_scale: f64,
    pub start_paused: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            step_seconds: 1.0 / 60.0,
            max_steps_per_tick: 8,
            time_scale: 1.0,
            start_paused: false,
        }
    }
}

/// Bounds and increment for a mass slider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl MassRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, mass: f64) -> bool {
        (self.min..=self.max).contains(&mass)
    }
}

/// Initial state and presentation of one body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BodyConfig {
    pub name: String,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub mass: f64,
    pub mass_range: MassRange,
    /// Sphere radius in world units.
    pub radius: f32,
    /// Cosmetic self-rotation in radians per second.
    pub spin_rate: f32,
    /// Equirectangular surface image. Without one the body is drawn in
    /// `color`.
    pub texture: Option<PathBuf>,
    /// Flat color used when no texture is available.
    pub color: [f32; 3],
}

impl BodyConfig {
    /// The orbiting Earth of the stock scene.
    pub fn earth() -> Self {
        Self {
            name: "Earth".to_string(),
            // Scaled down by 10^7 km.
            position: [24.959787, 0.0, 0.0],
            // Counter-clockwise seen from above.
            velocity: [0.0, 0.0, -0.5],
            mass: 5.9724,
            mass_range: MassRange::new(0.0, 20.0, 0.5),
            radius: 1.0,
            spin_rate: 0.46,
            texture: None,
            color: [0.25, 0.45, 0.85],
        }
    }

    /// The central Sun of the stock scene.
    pub fn sun() -> Self {
        Self {
            name: "Sun".to_string(),
            position: [0.0, 0.0, 0.0],
            velocity: [0.0, 0.0, 0.0],
            // Scaled down by 10^24 kg.
            mass: 1_988_500.0,
            mass_range: MassRange::new(0.0, 9_999_999.0, 10.0),
            radius: 10.0,
            spin_rate: 1.997,
            texture: None,
            color: [1.0, 0.8, 0.3],
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        let range = self.mass_range;
        if range.min > range.max {
            return Err(ConfigError::EmptyRange {
                field,
                min: range.min,
                max: range.max,
            });
        }
        if range.min < 0.0 {
            return Err(ConfigError::NegativeRange {
                field,
                min: range.min,
            });
        }
        if !(range.step > 0.0) {
            return Err(ConfigError::BadSliderStep {
                field,
                step: range.step,
            });
        }
        if !range.contains(self.mass) {
            return Err(ConfigError::MassOutOfRange {
                field,
                mass: self.mass,
                min: range.min,
                max: range.max,
            });
        }
        positive("radius", self.radius as f64)
    }
}

/// Body fields present in a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BodyPatch {
    name: Option<String>,
    position: Option<[f64; 3]>,
    velocity: Option<[f64; 3]>,
    mass: Option<f64>,
    mass_range: Option<MassRange>,
    radius: Option<f32>,
    spin_rate: Option<f32>,
    texture: Option<PathBuf>,
    color: Option<[f32; 3]>,
}

impl BodyPatch {
    fn apply(self, base: BodyConfig) -> BodyConfig {
        BodyConfig {
            name: self.name.unwrap_or(base.name),
            position: self.position.unwrap_or(base.position),
            velocity: self.velocity.unwrap_or(base.velocity),
            mass: self.mass.unwrap_or(base.mass),
            mass_range: self.mass_range.unwrap_or(base.mass_range),
            radius: self.radius.unwrap_or(base.radius),
            spin_rate: self.spin_rate.unwrap_or(base.spin_rate),
            texture: self.texture.or(base.texture),
            color: self.color.unwrap_or(base.color),
        }
    }
}

/// Camera settings. The free camera orbits the origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
    /// Initial elevation in radians (near-vertical looks down on the orbit).
    pub elevation: f32,
    pub azimuth: f32,
    /// Fraction of the remaining motion applied per 60 Hz frame (0..1).
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            distance: 40.0,
            elevation: std::f32::consts::FRAC_PI_2 - 0.01,
            azimuth: 0.0,
            damping: 0.05,
            min_distance: 2.0,
            max_distance: 90.0,
        }
    }
}

/// Debug panel settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// TTF/OTF font for panel text. Without one the built-in DejaVu Sans
    /// Mono is used.
    pub font: Option<PathBuf>,
    pub font_size: f32,
    pub panel_width: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 15.0,
            panel_width: 260.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> OrreryConfig {
        OrreryConfig::default()
    }

    #[test]
    fn stock_config_is_valid() {
        assert!(stock().validate().is_ok());
    }

    #[test]
    fn stock_config_needs_no_files() {
        let config = stock();
        assert_eq!(config.orbiter.texture, None);
        assert_eq!(config.primary.texture, None);
        assert_eq!(config.ui.font, None);
    }

    #[test]
    fn body_texture_can_be_set_from_json() {
        let config: OrreryConfig =
            serde_json::from_str(r#"{ "orbiter": { "texture": "earth.jpg" } }"#).unwrap();
        assert_eq!(config.orbiter.texture, Some(PathBuf::from("earth.jpg")));
        assert_eq!(config.primary.texture, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: OrreryConfig =
            serde_json::from_str(r#"{ "window": { "width": 640 }, "primary": { "mass": 3.0 } }"#)
                .unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.primary.mass, 3.0);
        assert_eq!(config.primary.radius, 10.0);
        assert_eq!(config.primary.name, "Sun");
        assert_eq!(config.orbiter.position, [24.959787, 0.0, 0.0]);
        assert_eq!(config.simulation.step_seconds, 1.0 / 60.0);
    }

    #[test]
    fn json_round_trips() {
        let config = stock();
        let parsed: OrreryConfig = serde_json::from_str(&config.to_json()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_mass_outside_range() {
        let mut config = stock();
        config.orbiter.mass = 25.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MassOutOfRange { field: "orbiter", .. })
        ));
    }

    #[test]
    fn rejects_negative_range() {
        let mut config = stock();
        config.primary.mass_range = MassRange::new(-1.0, 10.0, 1.0);
        config.primary.mass = 0.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeRange { field: "primary", .. })
        ));
    }

    #[test]
    fn rejects_zero_slider_step() {
        let mut config = stock();
        config.orbiter.mass_range.step = 0.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadSliderStep { .. })
        ));
    }

    #[test]
    fn rejects_zero_step_seconds() {
        let mut config = stock();
        config.simulation.step_seconds = 0.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "simulation.step_seconds",
                ..
            })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = OrreryConfig::load("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
