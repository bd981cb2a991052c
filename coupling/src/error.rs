use std::time::Duration;

use thiserror::Error;

/// Failures reported by the positioner or the camera.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("{device} is not connected")]
    Disconnected { device: &'static str },

    #[error("Timed out after {waited:?} waiting for {operation}")]
    Timeout {
        operation: &'static str,
        waited: Duration,
    },

    #[error("{device} reported an error: {message}")]
    Device {
        device: &'static str,
        message: String,
    },

    #[error("Invalid axis channel {0}, expected 1 or 2")]
    InvalidAxis(u8),
}

/// Errors that abort an alignment run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Camera is saturated at gain {gain} dB and shutter {shutter} s")]
    CameraSaturated { gain: f64, shutter: f64 },

    #[error("Camera returned an empty frame")]
    EmptyFrame,

    #[error("Alignment interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Config(#[from] common::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
