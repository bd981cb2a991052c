use std::time::Duration;

use crate::error::{Error, Result};
use crate::hardware::{Camera, Positioner};
use crate::position::{Axis, Position};

/// Reduces camera frames to a single intensity: the brightest pixel.
///
/// Every call captures a fresh frame.
pub struct IntensitySource<'a, C: Camera + ?Sized> {
    camera: &'a mut C,
}

impl<'a, C: Camera + ?Sized> IntensitySource<'a, C> {
    pub fn new(camera: &'a mut C) -> Self {
        Self { camera }
    }

    pub fn measure(&mut self) -> Result<f32> {
        let frame = self.camera.capture()?;
        frame.max_value().ok_or(Error::EmptyFrame)
    }
}

/// Moves the stage and samples intensity, one blocking step at a time.
pub struct Probe<'a, P: Positioner + ?Sized, C: Camera + ?Sized> {
    positioner: &'a mut P,
    source: IntensitySource<'a, C>,
    settle_delay: Duration,
    samples: usize,
}

impl<'a, P: Positioner + ?Sized, C: Camera + ?Sized> Probe<'a, P, C> {
    pub fn new(positioner: &'a mut P, camera: &'a mut C, settle_delay: Duration) -> Self {
        Self {
            positioner,
            source: IntensitySource::new(camera),
            settle_delay,
            samples: 0,
        }
    }

    pub fn current_position(&mut self) -> Result<Position> {
        Ok(Position::new(
            self.positioner.position(Axis::X)?,
            self.positioner.position(Axis::Z)?,
        ))
    }

    pub fn move_to(&mut self, axis: Axis, position: i64) -> Result<()> {
        self.positioner.move_to(axis, position)?;
        Ok(())
    }

    /// Moves one axis, waits for it to settle and measures the intensity there.
    pub fn sample(&mut self, axis: Axis, position: i64) -> Result<f32> {
        self.move_to(axis, position)?;
        self.await_settled()?;
        let value = self.source.measure()?;
        self.samples += 1;
        Ok(value)
    }

    /// Number of successful samples so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    fn await_settled(&mut self) -> Result<()> {
        self.positioner.await_settled()?;
        if !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use super::*;
    use crate::config::OptimizerConfig;
    use crate::error::HardwareError;
    use crate::hardware::Frame;
    use crate::search::{Optimizer, Phase};
    use crate::testing::{blind_stage, init_tracing, paraboloid_rig};

    /// Camera that delivers frames without any pixels.
    struct EmptyCamera;

    impl Camera for EmptyCamera {
        fn capture(&mut self) -> std::result::Result<Frame, HardwareError> {
            Ok(Frame::new(0, 0, Vec::new()))
        }

        fn set_gain(&mut self, _gain: f64) -> std::result::Result<(), HardwareError> {
            Ok(())
        }

        fn set_shutter(&mut self, _shutter: f64) -> std::result::Result<(), HardwareError> {
            Ok(())
        }

        fn auto_adjust_shutter(&mut self) -> std::result::Result<(), HardwareError> {
            Ok(())
        }

        fn is_saturated(&mut self) -> std::result::Result<bool, HardwareError> {
            Ok(false)
        }
    }

    #[test]
    fn test_empty_frame_is_an_error() {
        let mut stage = blind_stage(Position::new(100, 100));
        let mut camera = EmptyCamera;
        let mut probe = Probe::new(&mut stage, &mut camera, Duration::ZERO);

        let result = probe.sample(Axis::X, 150);

        assert!(matches!(result, Err(Error::EmptyFrame)));
        assert_eq!(probe.samples(), 0);
    }

    #[test]
    fn test_empty_frame_aborts_optimizer_without_progress() {
        init_tracing();
        let mut stage = blind_stage(Position::new(500, 500));
        let mut camera = EmptyCamera;
        let events = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&events);
        let mut optimizer = Optimizer::new(OptimizerConfig {
            step_count: 2,
            size_x: 1000,
            size_z: 400,
            ..Default::default()
        })
        .with_progress(move |_| *sink.lock().unwrap() += 1);

        let result = optimizer.run(&mut stage, &mut camera);

        assert!(matches!(result, Err(Error::EmptyFrame)));
        assert_eq!(*events.lock().unwrap(), 0, "no sample may be reported");
        assert_eq!(optimizer.phase(), Phase::CoarseX);
    }

    #[test]
    fn test_settle_delay_is_paid_per_sample() {
        let delay = Duration::from_millis(5);
        let (mut stage, mut camera) = paraboloid_rig();
        let mut probe = Probe::new(&mut stage, &mut camera, delay);

        for count in [2u32, 6] {
            let started = Instant::now();
            for i in 0..count {
                probe.sample(Axis::X, i64::from(i) * 10).unwrap();
            }
            let elapsed = started.elapsed();
            assert!(
                elapsed >= delay * count,
                "{} samples took {:?}, expected at least {:?}",
                count,
                elapsed,
                delay * count
            );
        }
        assert_eq!(probe.samples(), 8);
    }

    #[test]
    fn test_optimizer_honors_settle_delay() {
        let (mut stage, mut camera) = paraboloid_rig();
        let mut optimizer = Optimizer::new(OptimizerConfig {
            step_count: 2,
            size_x: 1000,
            size_z: 400,
            fine_step: 50,
            iteration_limit: 3,
            settle_delay_ms: 2,
            ..Default::default()
        });

        let started = Instant::now();
        let result = optimizer.run(&mut stage, &mut camera).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(result.samples, 16);
        assert!(elapsed >= Duration::from_millis(2) * result.samples as u32);
        assert_eq!(stage.settle_calls(), result.samples);
    }
}
