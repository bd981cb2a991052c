//! Test helpers shared by the unit tests.

use std::collections::VecDeque;

use crate::error::HardwareError;
use crate::hardware::{Camera, Frame};
use crate::position::Position;
use crate::simulation::{self, IntensityField, SimulatedCamera, SimulatedStage};

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// `100 - ((x - 300)² + (z - 100)²) / 1000`, clipped at zero.
pub fn paraboloid_field() -> IntensityField {
    IntensityField::Paraboloid {
        center: Position::new(300, 100),
        peak: 100.0,
        scale: 1000.0,
    }
}

/// Stage at the origin looking at [`paraboloid_field`].
pub fn paraboloid_rig() -> (SimulatedStage, SimulatedCamera) {
    simulation::rig(paraboloid_field())
}

/// Stage that ignores the camera; pair it with a [`ScriptedCamera`].
pub fn blind_stage(start: Position) -> SimulatedStage {
    let (stage, _) = simulation::rig(|_: Position| 0.0f32);
    stage.with_max_position(1_000_000).with_position(start)
}

/// Camera returning a fixed sequence of peak values, one per capture.
pub struct ScriptedCamera {
    values: VecDeque<f32>,
}

impl ScriptedCamera {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl Camera for ScriptedCamera {
    fn capture(&mut self) -> Result<Frame, HardwareError> {
        let value = self.values.pop_front().ok_or_else(|| HardwareError::Device {
            device: "scripted camera",
            message: "script exhausted".into(),
        })?;
        Ok(Frame::new(2, 1, vec![value * 0.5, value]))
    }

    fn set_gain(&mut self, _gain: f64) -> Result<(), HardwareError> {
        Ok(())
    }

    fn set_shutter(&mut self, _shutter: f64) -> Result<(), HardwareError> {
        Ok(())
    }

    fn auto_adjust_shutter(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn is_saturated(&mut self) -> Result<bool, HardwareError> {
        Ok(false)
    }
}
