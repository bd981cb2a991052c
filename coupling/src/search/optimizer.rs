use std::sync::Arc;

use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::hardware::{Camera, Positioner};
use crate::position::Position;
use crate::probe::Probe;

use super::{
    CoarseScanner, FineOutcome, FineTuner, OptimizationState, Phase, ProgressCallback,
    SampleEvent,
};

/// Outcome of a complete run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentResult {
    pub position: Position,
    pub value: f32,
    pub coarse_position: Position,
    pub coarse_value: f32,
    /// Fine tuning rounds executed.
    pub rounds: u32,
    /// Fine tuning stopped on a fixed point rather than the iteration limit.
    pub converged: bool,
    pub samples: usize,
}

/// Runs the coarse scan and then fine tuning over one shared best state.
///
/// Any hardware error aborts the run immediately; the stage stays wherever it
/// was when the error happened.
#[derive(Debug)]
pub struct Optimizer {
    config: OptimizerConfig,
    progress: ProgressCallback,
    phase: Phase,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            progress: ProgressCallback::None,
            phase: Phase::Idle,
        }
    }

    pub fn with_progress(mut self, f: impl Fn(SampleEvent) + Send + Sync + 'static) -> Self {
        self.progress = ProgressCallback::Some(Arc::new(f));
        self
    }

    pub(crate) fn with_progress_callback(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Phase reached by the last run, `Idle` before the first one.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run<P, C>(&mut self, positioner: &mut P, camera: &mut C) -> Result<AlignmentResult>
    where
        P: Positioner + ?Sized,
        C: Camera + ?Sized,
    {
        self.config.validate()?;
        self.phase = Phase::Idle;

        let mut probe = Probe::new(positioner, camera, self.config.settle_delay());
        let start = probe.current_position()?;
        let mut state = OptimizationState::new(start)
            .with_reporting(self.config.verbosity, self.progress.clone());

        tracing::info!("Starting optimisation at {}", start);
        let outcome = self.search(&mut probe, &mut state);
        self.phase = state.phase();
        let (coarse_position, coarse_value, fine) = outcome?;

        tracing::info!(
            "Optimisation finished after {} rounds: max {} at {}",
            fine.rounds,
            state.best_value(),
            state.best_position()
        );

        Ok(AlignmentResult {
            position: state.best_position(),
            value: state.best_value(),
            coarse_position,
            coarse_value,
            rounds: fine.rounds,
            converged: fine.converged,
            samples: probe.samples(),
        })
    }

    fn search<P, C>(
        &self,
        probe: &mut Probe<'_, P, C>,
        state: &mut OptimizationState,
    ) -> Result<(Position, f32, FineOutcome)>
    where
        P: Positioner + ?Sized,
        C: Camera + ?Sized,
    {
        CoarseScanner::new(&self.config).scan(probe, state)?;
        let coarse = (state.best_position(), state.best_value());

        let fine = FineTuner::new(&self.config).refine(probe, state)?;
        state.set_phase(Phase::Converged);

        Ok((coarse.0, coarse.1, fine))
    }
}
