//! Coupling - fiber-to-waveguide alignment on a two-axis piezo stage.
//!
//! The fiber position is searched for the maximum coupled intensity seen by a
//! camera: a coarse grid sweep along each axis, then axis-alternating
//! hill-climbing until the position stops moving.
//!
//! ```rust,ignore
//! use coupling::{AlignmentSession, SessionConfig};
//!
//! let mut session = AlignmentSession::new(stage, camera, SessionConfig::default());
//! session.prepare()?;
//! let result = session.optimize()?;
//! println!("best {} at {}", result.value, result.position);
//! session.close()?;
//! ```

mod config;
mod error;
mod hardware;
mod position;
mod probe;
mod search;
mod session;
pub mod simulation;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Geometry
// ============================================================================

pub use position::{Axis, Position, ScanWindow};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{
    CameraSetup, HomingConfig, OptimizerConfig, SessionConfig, Verbosity, MAX_SCAN_SIZE,
};
pub use error::{Error, HardwareError, Result};

// ============================================================================
// Hardware collaborators
// ============================================================================

pub use hardware::{Camera, Frame, Positioner};
pub use probe::{IntensitySource, Probe};

// ============================================================================
// Search
// ============================================================================

pub use search::{
    AlignmentResult, CoarseScanner, FineOutcome, FineTuner, OptimizationState, Optimizer, Phase,
    ProgressCallback, SampleEvent, coarse_step_size,
};

// ============================================================================
// Session
// ============================================================================

pub use session::{AlignmentSession, ManualAlignment};
