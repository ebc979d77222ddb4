//! # Orrery
//!
//! An Earth orbiting a Sun in a native window, with a debug panel to change
//! both masses while it runs and two buttons that put the camera on either
//! body.
//!
//! The simulation is deliberately simple: the Sun stays put, the Earth is
//! pulled toward it by a force computed from the planar (x-z) distance and
//! advanced with forward Euler, one step per 1/60 s of wall-clock time.
//!
//! ```
//! use orrery::controls::mass_channel;
//! use orrery::sim::{BodyRole, Orrery};
//! use orrery::OrreryConfig;
//!
//! let (masses, rx) = mass_channel();
//! let mut orrery = Orrery::new(&OrreryConfig::default(), rx);
//!
//! masses.publish(BodyRole::Primary, 2_500_000.0);
//! let report = orrery.tick(0.1);
//! assert_eq!(report.steps, 6);
//! assert_eq!(orrery.body(BodyRole::Primary).mass, 2_500_000.0);
//! ```
//!
//! The crate is laid out in two halves:
//!
//! - GPU-free: [`sim`], [`controls`], [`view`], [`config`], [`panel`] layout
//!   and the camera math
//! - Presentation: the window loop started by [`run`], the GPU context and
//!   the render passes

mod app;
mod assets;
mod body_pass;
pub mod camera;
pub mod config;
pub mod controls;
mod draw2d;
pub mod error;
mod gpu;
mod input;
mod mesh;
pub mod orbit_camera;
pub mod panel;
pub mod scene;
pub mod sim;
mod texture;
pub mod view;

pub use app::run;
pub use config::OrreryConfig;
pub use draw2d::{Color, Rect};
pub use error::{ConfigError, IntegratorError, OrreryError, OrreryResult};
pub use gpu::surface_size;
pub use mesh::{Transform, Vertex3d, sphere_geometry};
