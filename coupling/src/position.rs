use std::fmt;
use std::iter::StepBy;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::HardwareError;

/// One mechanical axis of the stage.
///
/// X runs along the waveguide array, Z across the waveguide thickness.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    /// Controller channel driving this axis.
    pub const fn channel(self) -> u8 {
        match self {
            Axis::X => 2,
            Axis::Z => 1,
        }
    }

    pub fn from_channel(channel: u8) -> Result<Self, HardwareError> {
        match channel {
            2 => Ok(Axis::X),
            1 => Ok(Axis::Z),
            other => Err(HardwareError::InvalidAxis(other)),
        }
    }
}

/// Stage position in device units (nanometers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub z: i64,
}

impl Position {
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    #[inline]
    pub fn get(self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.x,
            Axis::Z => self.z,
        }
    }

    /// Copy of `self` with one coordinate replaced.
    #[inline]
    pub fn with(self, axis: Axis, value: i64) -> Self {
        match axis {
            Axis::X => Self { x: value, ..self },
            Axis::Z => Self { z: value, ..self },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A single one-axis sweep around a center position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub axis: Axis,
    pub center: i64,
    pub half_width: i64,
    pub step: i64,
    /// Whether `center + half_width` itself is visited.
    pub inclusive: bool,
}

impl ScanWindow {
    /// Symmetric grid of `2 * step_count + 1` points, both ends included.
    pub fn grid(axis: Axis, center: i64, step_count: u32, step: i64) -> Self {
        Self {
            axis,
            center,
            half_width: i64::from(step_count).saturating_mul(step),
            step,
            inclusive: true,
        }
    }

    /// `[center - half_width, center + half_width)` sampled every `step`.
    pub fn neighborhood(axis: Axis, center: i64, half_width: i64, step: i64) -> Self {
        Self {
            axis,
            center,
            half_width,
            step,
            inclusive: false,
        }
    }

    /// Positions in sweep order. `step` must be positive.
    pub fn positions(&self) -> StepBy<Range<i64>> {
        debug_assert!(self.step > 0, "scan step must be positive");
        let start = self.center.saturating_sub(self.half_width);
        let end = self.center.saturating_add(self.half_width);
        let end = if self.inclusive {
            end.saturating_add(1)
        } else {
            end
        };
        (start..end).step_by(self.step as usize)
    }
}
