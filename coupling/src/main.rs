use std::path::PathBuf;

use anyhow::{Context, Result};
use common::log_setup::setup_logging;
use coupling::simulation::{self, IntensityField};
use coupling::{AlignmentSession, Position, SessionConfig};

/// Runs a full alignment against the simulated stage.
///
/// Usage: `coupling [config.yaml|config.json]`
fn main() -> Result<()> {
    let level = if common::is_debug() { "debug" } else { "info" };
    setup_logging(level, "coupling")?;

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SessionConfig::load(&path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => SessionConfig::default(),
    };

    let middle = simulation::DEFAULT_MAX_POSITION / 2;
    let peak = Position::new(middle + 1300, middle - 400);
    let (stage, camera) = simulation::rig(IntensityField::Gaussian {
        center: peak,
        peak: 200.0,
        sigma_x: 1500.0,
        sigma_z: 800.0,
    });
    let camera = camera.with_saturation(255.0).with_noise(0.5, 42);

    let mut session = AlignmentSession::new(stage, camera, config).with_manual_alignment(|| {
        tracing::info!("Simulated stage needs no manual coarse coupling");
        Ok(())
    });

    session.prepare()?;
    let result = session.optimize()?;
    session.close()?;

    tracing::info!(
        "Best intensity {} at {} (coarse {} at {}), {} rounds, {} samples, simulated peak at {}",
        result.value,
        result.position,
        result.coarse_value,
        result.coarse_position,
        result.rounds,
        result.samples,
        peak
    );
    Ok(())
}
