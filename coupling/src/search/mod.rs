//! Peak search: coarse grid sweep followed by fine coordinate ascent.

mod coarse;
mod fine;
mod optimizer;
mod state;

#[cfg(test)]
mod tests;

use common::SharedFn;

pub use coarse::{CoarseScanner, coarse_step_size};
pub use fine::{FineOutcome, FineTuner};
pub use optimizer::{AlignmentResult, Optimizer};
pub use state::OptimizationState;

use crate::error::Result;
use crate::hardware::{Camera, Positioner};
use crate::position::{Position, ScanWindow};
use crate::probe::Probe;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    CoarseX,
    CoarseZ,
    /// Fine tuning round, 0-based.
    Fine(u32),
    Converged,
}

/// One intensity sample together with the running best after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleEvent {
    pub phase: Phase,
    pub position: Position,
    pub value: f32,
    pub best_position: Position,
    pub best_value: f32,
}

/// Callback invoked after every sample.
pub type ProgressCallback = SharedFn<dyn Fn(SampleEvent) + Send + Sync>;

/// Samples every position of `window`, then parks the axis at the best coordinate.
///
/// The other axis is assumed to already sit at its best coordinate.
fn sweep<P, C>(
    probe: &mut Probe<'_, P, C>,
    state: &mut OptimizationState,
    window: ScanWindow,
) -> Result<()>
where
    P: Positioner + ?Sized,
    C: Camera + ?Sized,
{
    for position in window.positions() {
        let value = probe.sample(window.axis, position)?;
        let candidate = state.best_position().with(window.axis, position);
        state.record(candidate, value);
    }
    probe.move_to(window.axis, state.best_position().get(window.axis))
}
