use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::hardware::{Camera, Positioner};
use crate::position::{Axis, ScanWindow};
use crate::probe::Probe;

use super::{OptimizationState, Phase, sweep};

/// The coarse grid covers this much more than the nominal waveguide size,
/// to tolerate the initial misalignment.
const OVERSCAN: f64 = 1.1;

/// Coarse grid spacing: `floor(1.1 * size / 2 / step_count)`.
pub fn coarse_step_size(size: i64, step_count: u32) -> i64 {
    (OVERSCAN * size as f64 / 2.0 / f64::from(step_count)).floor() as i64
}

/// Independent grid sweeps along X, then Z, around the start position.
#[derive(Debug, Clone)]
pub struct CoarseScanner {
    step_count: u32,
    step_x: i64,
    step_z: i64,
}

impl CoarseScanner {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            step_count: config.step_count,
            step_x: coarse_step_size(config.size_x, config.step_count),
            step_z: coarse_step_size(config.size_z, config.step_count),
        }
    }

    pub fn step_sizes(&self) -> (i64, i64) {
        (self.step_x, self.step_z)
    }

    /// Sweeps X around the current best, pins X at the winner, then sweeps Z.
    ///
    /// The running maximum carries over from the X sweep into the Z sweep, so
    /// a Z sample has to beat the best X sample to move `best_z`. Leaves the
    /// stage at the best position.
    pub fn scan<P, C>(&self, probe: &mut Probe<'_, P, C>, state: &mut OptimizationState) -> Result<()>
    where
        P: Positioner + ?Sized,
        C: Camera + ?Sized,
    {
        let origin = state.best_position();

        state.set_phase(Phase::CoarseX);
        let window = ScanWindow::grid(Axis::X, origin.x, self.step_count, self.step_x);
        sweep(probe, state, window)?;
        tracing::debug!(
            "Coarse X done: max {} at {}",
            state.best_value(),
            state.best_position()
        );

        state.set_phase(Phase::CoarseZ);
        let window = ScanWindow::grid(Axis::Z, origin.z, self.step_count, self.step_z);
        sweep(probe, state, window)?;

        tracing::info!(
            "Coarse tuning complete: max {} at {}",
            state.best_value(),
            state.best_position()
        );
        Ok(())
    }
}
