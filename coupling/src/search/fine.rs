use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::hardware::{Camera, Positioner};
use crate::position::{Axis, Position, ScanWindow};
use crate::probe::Probe;

use super::{OptimizationState, Phase, sweep};

/// Fraction of the waveguide size searched on each side of the best position.
const NEIGHBORHOOD_DIVISOR: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineOutcome {
    /// Rounds actually executed.
    pub rounds: u32,
    /// A completed round left the best position unchanged.
    pub converged: bool,
}

/// Axis-alternating hill climbing in a fixed neighborhood of the best position.
#[derive(Debug, Clone)]
pub struct FineTuner {
    half_x: i64,
    half_z: i64,
    step: i64,
    iteration_limit: u32,
}

impl FineTuner {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            half_x: config.size_x / NEIGHBORHOOD_DIVISOR,
            half_z: config.size_z / NEIGHBORHOOD_DIVISOR,
            step: config.fine_step,
            iteration_limit: config.iteration_limit,
        }
    }

    pub fn half_extents(&self) -> (i64, i64) {
        (self.half_x, self.half_z)
    }

    /// Runs rounds until one of them leaves the best position where it was,
    /// or `iteration_limit` rounds have run.
    ///
    /// Expects the stage at the current best position and leaves it there.
    pub fn refine<P, C>(
        &self,
        probe: &mut Probe<'_, P, C>,
        state: &mut OptimizationState,
    ) -> Result<FineOutcome>
    where
        P: Positioner + ?Sized,
        C: Camera + ?Sized,
    {
        let mut rounds = 0;
        let mut last_round_start: Option<Position> = None;
        let mut converged = false;

        while rounds < self.iteration_limit {
            if last_round_start == Some(state.best_position()) {
                tracing::info!("No improvement in the last fine tuning round, stopping");
                converged = true;
                break;
            }

            state.set_phase(Phase::Fine(rounds));
            let round_start = state.best_position();
            tracing::info!(
                "Iteration {} - current maximum {} at {}",
                rounds,
                state.best_value(),
                round_start
            );

            let window = ScanWindow::neighborhood(Axis::X, round_start.x, self.half_x, self.step);
            sweep(probe, state, window)?;

            let best_z = state.best_position().z;
            let window = ScanWindow::neighborhood(Axis::Z, best_z, self.half_z, self.step);
            sweep(probe, state, window)?;

            last_round_start = Some(round_start);
            rounds += 1;
        }

        Ok(FineOutcome { rounds, converged })
    }
}
