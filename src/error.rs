//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for fallible application setup.
pub type OrreryResult<T> = Result<T, OrreryError>;

/// Degenerate inputs to the orbit integrator.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum IntegratorError {
    #[error("bodies coincide in the x-z plane at ({x}, {z}); force is undefined")]
    CoincidentBodies { x: f64, z: f64 },
}

/// Problems reading or validating an [`OrreryConfig`](crate::OrreryConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field}: mass range is empty (min {min} > max {max})")]
    EmptyRange { field: &'static str, min: f64, max: f64 },

    #[error("{field}: mass range must start at or above zero (min {min})")]
    NegativeRange { field: &'static str, min: f64 },

    #[error("{field}: slider step must be positive (got {step})")]
    BadSliderStep { field: &'static str, step: f64 },

    #[error("{field}: initial mass {mass} is outside {min}..={max}")]
    MassOutOfRange {
        field: &'static str,
        mass: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive and finite (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

/// Top-level application errors.
#[derive(Error, Debug)]
pub enum OrreryError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("failed to read font '{path}': {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font: {0}")]
    FontParse(&'static str),

    #[error("failed to load texture '{path}': {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
