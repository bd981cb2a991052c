//! Contracts for the stage controller and the camera.
//!
//! Connection, device discovery and driver specifics live behind these traits.
//! Every call blocks until the device has acknowledged it.

use common::Buffer2;

use crate::error::HardwareError;
use crate::position::Axis;

/// One captured camera frame.
pub type Frame = Buffer2<f32>;

/// Two-axis piezo positioner addressed in nanometers.
pub trait Positioner {
    /// Commands an absolute position. Values outside `[0, max_position]`
    /// are clipped by the device.
    fn move_to(&mut self, axis: Axis, position: i64) -> Result<(), HardwareError>;

    /// Last commanded or settled position.
    fn position(&mut self, axis: Axis) -> Result<i64, HardwareError>;

    fn max_position(&self) -> i64;

    /// Blocks until the last move has settled.
    fn await_settled(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    /// Starts the zeroing routine of one axis; does not wait for it.
    fn zero(&mut self, axis: Axis) -> Result<(), HardwareError>;

    fn is_zeroed(&mut self, axis: Axis) -> Result<bool, HardwareError>;

    fn close(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }
}

/// Camera looking at the waveguide output.
pub trait Camera {
    fn capture(&mut self) -> Result<Frame, HardwareError>;

    /// Gain in dB.
    fn set_gain(&mut self, gain: f64) -> Result<(), HardwareError>;

    /// Shutter time in seconds.
    fn set_shutter(&mut self, shutter: f64) -> Result<(), HardwareError>;

    fn auto_adjust_shutter(&mut self) -> Result<(), HardwareError>;

    fn is_saturated(&mut self) -> Result<bool, HardwareError>;

    fn close(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }
}
