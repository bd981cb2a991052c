use crate::config::Verbosity;
use crate::position::Position;

use super::{Phase, ProgressCallback, SampleEvent};

/// Running best of one optimization run.
///
/// `best_value` never decreases: a sample replaces the best only when it is
/// strictly greater, so on ties the earlier position wins.
#[derive(Debug)]
pub struct OptimizationState {
    best_position: Position,
    best_value: f32,
    phase: Phase,
    verbosity: Verbosity,
    progress: ProgressCallback,
}

impl OptimizationState {
    pub fn new(start: Position) -> Self {
        Self {
            best_position: start,
            best_value: 0.0,
            phase: Phase::Idle,
            verbosity: Verbosity::Summary,
            progress: ProgressCallback::None,
        }
    }

    pub fn with_reporting(mut self, verbosity: Verbosity, progress: ProgressCallback) -> Self {
        self.verbosity = verbosity;
        self.progress = progress;
        self
    }

    #[inline]
    pub fn best_position(&self) -> Position {
        self.best_position
    }

    #[inline]
    pub fn best_value(&self) -> f32 {
        self.best_value
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Replaces the best on strict improvement. Returns whether it did.
    pub fn offer(&mut self, position: Position, value: f32) -> bool {
        if value > self.best_value {
            self.best_value = value;
            self.best_position = position;
            true
        } else {
            false
        }
    }

    /// [`offer`](Self::offer) plus logging and progress reporting.
    pub fn record(&mut self, position: Position, value: f32) -> bool {
        let improved = self.offer(position, value);

        match self.verbosity {
            Verbosity::Samples => tracing::info!(
                "{} sample at {}: {} (max {} at {})",
                self.phase,
                position,
                value,
                self.best_value,
                self.best_position
            ),
            Verbosity::Summary => tracing::debug!(
                phase = %self.phase,
                %position,
                value,
                best = self.best_value,
                "sample"
            ),
        }

        if let Some(f) = self.progress.as_ref() {
            f(SampleEvent {
                phase: self.phase,
                position,
                value,
                best_position: self.best_position,
                best_value: self.best_value,
            });
        }

        improved
    }
}
