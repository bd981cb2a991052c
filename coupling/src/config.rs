//! Operator-facing settings for an alignment session.
//!
//! All lengths are device units (nanometers). Every struct deserializes with
//! defaults for missing fields, so a config file only needs the values it changes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::search::coarse_step_size;

/// Largest accepted scan size or step, 1 m in device units.
pub const MAX_SCAN_SIZE: i64 = 1_000_000_000;

/// Amount of per-sample progress written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Phase summaries only; individual samples go to `debug`.
    #[default]
    Summary,
    /// Every sample is logged at `info` with the running maximum.
    Samples,
}

/// Tunables of the coarse scan and fine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Coarse steps on each side of the start position.
    pub step_count: u32,
    /// Nominal waveguide extent along X.
    pub size_x: i64,
    /// Nominal waveguide extent along Z.
    pub size_z: i64,
    /// Sampling stride during fine tuning.
    pub fine_step: i64,
    /// Maximum number of fine tuning rounds.
    pub iteration_limit: u32,
    /// Fixed wait after every move, on top of the positioner's own settle step.
    pub settle_delay_ms: u64,
    pub verbosity: Verbosity,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            step_count: 5,
            size_x: 5000,
            size_z: 2000,
            fine_step: 50,
            iteration_limit: 10,
            settle_delay_ms: 0,
            verbosity: Verbosity::Summary,
        }
    }
}

impl OptimizerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step_count == 0 {
            return Err(invalid("step_count", "must be at least 1"));
        }
        if self.size_x <= 0 {
            return Err(invalid("size_x", format!("must be positive, got {}", self.size_x)));
        }
        if self.size_z <= 0 {
            return Err(invalid("size_z", format!("must be positive, got {}", self.size_z)));
        }
        if self.fine_step <= 0 {
            return Err(invalid(
                "fine_step",
                format!("must be positive, got {}", self.fine_step),
            ));
        }
        if self.iteration_limit == 0 {
            return Err(invalid("iteration_limit", "must be at least 1"));
        }
        for (field, value) in [
            ("size_x", self.size_x),
            ("size_z", self.size_z),
            ("fine_step", self.fine_step),
        ] {
            if value > MAX_SCAN_SIZE {
                return Err(invalid(
                    field,
                    format!("must not exceed {} nm, got {}", MAX_SCAN_SIZE, value),
                ));
            }
        }
        for (field, size) in [("size_x", self.size_x), ("size_z", self.size_z)] {
            if coarse_step_size(size, self.step_count) < 1 {
                return Err(invalid(
                    field,
                    format!(
                        "{} nm over {} steps gives a coarse step below 1 nm",
                        size, self.step_count
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

/// How the camera exposure is prepared before the search.
///
/// Resolved once, in order: `retain_settings`, then `auto_adjust`, then the
/// explicit `gain`/`shutter` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSetup {
    pub auto_adjust: bool,
    /// Leave whatever exposure the camera already has.
    pub retain_settings: bool,
    /// Gain in dB.
    pub gain: f64,
    /// Shutter time in seconds.
    pub shutter: f64,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            auto_adjust: false,
            retain_settings: false,
            gain: -5.0,
            shutter: 0.005,
        }
    }
}

impl CameraSetup {
    pub fn validate(&self) -> Result<()> {
        let manual = !self.retain_settings && !self.auto_adjust;
        if manual && (self.shutter.is_nan() || self.shutter <= 0.0) {
            return Err(invalid(
                "shutter",
                format!("must be positive, got {}", self.shutter),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
    /// Move both axes to the middle of their travel after zeroing.
    pub center: bool,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            timeout_ms: 30_000,
            center: true,
        }
    }
}

impl HomingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub optimizer: OptimizerConfig,
    pub camera: CameraSetup,
    pub homing: HomingConfig,
}

impl SessionConfig {
    /// Loads a YAML or JSON file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = common::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        common::save_file(self, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.optimizer.validate()?;
        self.camera.validate()
    }
}
