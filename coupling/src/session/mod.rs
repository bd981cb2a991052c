//! One-shot hardware setup and teardown around an [`Optimizer`] run.


use std::sync::Arc;
use std::time::Instant;

use strum::IntoEnumIterator;

use crate::config::SessionConfig;
use crate::error::{Error, HardwareError, Result};
use crate::hardware::{Camera, Positioner};
use crate::position::Axis;
use crate::search::{AlignmentResult, Optimizer, ProgressCallback, SampleEvent};

/// Pause for the operator to couple the fiber roughly by hand.
/// Runs after homing, before the camera is set up.
pub type ManualAlignment = Box<dyn FnOnce() -> Result<()>>;

/// Owns the stage and the camera for the lifetime of one alignment.
///
/// Devices are closed by [`close`](Self::close) or, failing that, on drop.
pub struct AlignmentSession<P: Positioner, C: Camera> {
    positioner: P,
    camera: C,
    config: SessionConfig,
    manual_alignment: Option<ManualAlignment>,
    progress: ProgressCallback,
    closed: bool,
}

impl<P: Positioner, C: Camera> AlignmentSession<P, C> {
    pub fn new(positioner: P, camera: C, config: SessionConfig) -> Self {
        Self {
            positioner,
            camera,
            config,
            manual_alignment: None,
            progress: ProgressCallback::None,
            closed: false,
        }
    }

    pub fn with_manual_alignment(mut self, f: impl FnOnce() -> Result<()> + 'static) -> Self {
        self.manual_alignment = Some(Box::new(f));
        self
    }

    pub fn with_progress(mut self, f: impl Fn(SampleEvent) + Send + Sync + 'static) -> Self {
        self.progress = ProgressCallback::Some(Arc::new(f));
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn positioner(&self) -> &P {
        &self.positioner
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Homes the stage, waits for the operator, then sets up the camera.
    pub fn prepare(&mut self) -> Result<()> {
        self.config.validate()?;
        self.home()?;

        if let Some(f) = self.manual_alignment.take() {
            f()?;
        }

        self.configure_camera()?;
        let frame = self.camera.capture()?;
        tracing::debug!(
            "Camera ready, {}x{} frame, max {:?}",
            frame.width(),
            frame.height(),
            frame.max_value()
        );
        Ok(())
    }

    pub fn optimize(&mut self) -> Result<AlignmentResult> {
        Optimizer::new(self.config.optimizer.clone())
            .with_progress_callback(self.progress.clone())
            .run(&mut self.positioner, &mut self.camera)
    }

    /// Closes the positioner, then the camera. Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let positioner = self.positioner.close();
        let camera = self.camera.close();
        positioner?;
        camera?;
        tracing::info!("Devices closed");
        Ok(())
    }

    /// Zeroes both axes and waits until both report done.
    fn home(&mut self) -> Result<()> {
        for axis in Axis::iter() {
            self.positioner.zero(axis)?;
        }

        let homing = &self.config.homing;
        let started = Instant::now();
        loop {
            let mut done = true;
            for axis in Axis::iter() {
                done &= self.positioner.is_zeroed(axis)?;
            }
            if done {
                break;
            }

            let waited = started.elapsed();
            if waited >= homing.timeout() {
                return Err(HardwareError::Timeout {
                    operation: "axis zeroing",
                    waited,
                }
                .into());
            }
            std::thread::sleep(homing.poll_interval());
        }

        if homing.center {
            let middle = self.positioner.max_position() / 2;
            for axis in Axis::iter() {
                self.positioner.move_to(axis, middle)?;
            }
        }
        tracing::info!("Piezo controller initialisation complete");
        Ok(())
    }

    fn configure_camera(&mut self) -> Result<()> {
        let setup = &self.config.camera;
        if setup.retain_settings {
            tracing::info!("Keeping current camera settings");
        } else if setup.auto_adjust {
            self.camera.auto_adjust_shutter()?;
            tracing::info!("Camera shutter auto-adjusted");
        } else {
            self.camera.set_gain(setup.gain)?;
            self.camera.set_shutter(setup.shutter)?;
            let saturated = self.camera.is_saturated()?;
            tracing::info!("Camera saturation: {}", saturated);
            if saturated {
                return Err(Error::CameraSaturated {
                    gain: setup.gain,
                    shutter: setup.shutter,
                });
            }
        }
        Ok(())
    }
}

impl<P: Positioner, C: Camera> Drop for AlignmentSession<P, C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close devices: {}", e);
        }
    }
}
