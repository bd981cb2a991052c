//! Simulated stage and camera for dry runs and tests.
//!
//! The camera renders a small spot whose peak pixel equals the modeled
//! intensity at the stage's current position.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::HardwareError;
use crate::hardware::{Camera, Frame, Positioner};
use crate::position::{Axis, Position};

/// Travel of the simulated stage, 20 µm per axis.
pub const DEFAULT_MAX_POSITION: i64 = 20_000;

const FRAME_WIDTH: usize = 16;
const FRAME_HEIGHT: usize = 12;
const SPOT_SIGMA: f32 = 2.0;
const REFERENCE_SHUTTER: f64 = 0.005;

/// Coupled intensity as a function of the fiber position.
pub trait IntensityModel {
    fn intensity(&self, position: Position) -> f32;
}

impl<F: Fn(Position) -> f32> IntensityModel for F {
    fn intensity(&self, position: Position) -> f32 {
        self(position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntensityField {
    /// `peak * exp(-dx²/2σx² - dz²/2σz²)`.
    Gaussian {
        center: Position,
        peak: f32,
        sigma_x: f64,
        sigma_z: f64,
    },
    /// `peak - (dx² + dz²) / scale`, clipped at zero.
    Paraboloid {
        center: Position,
        peak: f32,
        scale: f64,
    },
}

impl IntensityModel for IntensityField {
    fn intensity(&self, position: Position) -> f32 {
        match *self {
            IntensityField::Gaussian {
                center,
                peak,
                sigma_x,
                sigma_z,
            } => {
                let dx = (position.x - center.x) as f64 / sigma_x;
                let dz = (position.z - center.z) as f64 / sigma_z;
                peak * (-0.5 * (dx * dx + dz * dz)).exp() as f32
            }
            IntensityField::Paraboloid {
                center,
                peak,
                scale,
            } => {
                let dx = (position.x - center.x) as f64;
                let dz = (position.z - center.z) as f64;
                (peak as f64 - (dx * dx + dz * dz) / scale).max(0.0) as f32
            }
        }
    }
}

/// Builds a stage/camera pair looking at the same field.
pub fn rig(model: impl IntensityModel + 'static) -> (SimulatedStage, SimulatedCamera) {
    let position = Rc::new(Cell::new(Position::default()));
    let stage = SimulatedStage::new(Rc::clone(&position), DEFAULT_MAX_POSITION);
    let camera = SimulatedCamera::new(position, Box::new(model));
    (stage, camera)
}

/// Positioner that moves instantly and clips to `[0, max_position]`.
pub struct SimulatedStage {
    position: Rc<Cell<Position>>,
    max_position: i64,
    zeroing_polls: Option<u32>,
    pending_zero: [Option<u32>; 2],
    moves: Vec<(Axis, i64)>,
    settle_calls: usize,
    closed: bool,
}

impl SimulatedStage {
    fn new(position: Rc<Cell<Position>>, max_position: i64) -> Self {
        Self {
            position,
            max_position,
            zeroing_polls: Some(0),
            pending_zero: [None, None],
            moves: Vec::new(),
            settle_calls: 0,
            closed: false,
        }
    }

    pub fn with_max_position(mut self, max_position: i64) -> Self {
        self.max_position = max_position;
        self
    }

    /// Places the stage without recording a move.
    pub fn with_position(self, position: Position) -> Self {
        self.position.set(self.clip(position));
        self
    }

    /// Number of `is_zeroed` polls before an axis reports done.
    /// `None` never finishes.
    pub fn with_zeroing_polls(mut self, polls: Option<u32>) -> Self {
        self.zeroing_polls = polls;
        self
    }

    pub fn current(&self) -> Position {
        self.position.get()
    }

    /// Every commanded move, before clipping.
    pub fn moves(&self) -> Vec<(Axis, i64)> {
        self.moves.clone()
    }

    pub fn settle_calls(&self) -> usize {
        self.settle_calls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn clip(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(0, self.max_position),
            position.z.clamp(0, self.max_position),
        )
    }

    fn ensure_open(&self) -> Result<(), HardwareError> {
        if self.closed {
            return Err(HardwareError::Disconnected {
                device: "simulated stage",
            });
        }
        Ok(())
    }

    fn slot(axis: Axis) -> usize {
        usize::from(axis.channel() - 1)
    }
}

impl Positioner for SimulatedStage {
    fn move_to(&mut self, axis: Axis, position: i64) -> Result<(), HardwareError> {
        self.ensure_open()?;
        self.moves.push((axis, position));
        let target = self.position.get().with(axis, position);
        self.position.set(self.clip(target));
        Ok(())
    }

    fn position(&mut self, axis: Axis) -> Result<i64, HardwareError> {
        self.ensure_open()?;
        Ok(self.position.get().get(axis))
    }

    fn max_position(&self) -> i64 {
        self.max_position
    }

    fn await_settled(&mut self) -> Result<(), HardwareError> {
        self.ensure_open()?;
        self.settle_calls += 1;
        Ok(())
    }

    fn zero(&mut self, axis: Axis) -> Result<(), HardwareError> {
        self.ensure_open()?;
        self.position.set(self.position.get().with(axis, 0));
        self.pending_zero[Self::slot(axis)] = Some(self.zeroing_polls.unwrap_or(u32::MAX));
        Ok(())
    }

    fn is_zeroed(&mut self, axis: Axis) -> Result<bool, HardwareError> {
        self.ensure_open()?;
        if self.zeroing_polls.is_none() {
            return Ok(false);
        }
        match &mut self.pending_zero[Self::slot(axis)] {
            Some(0) => Ok(true),
            Some(remaining) => {
                *remaining -= 1;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn close(&mut self) -> Result<(), HardwareError> {
        self.closed = true;
        Ok(())
    }
}

/// Camera rendering the modeled intensity at the stage position.
pub struct SimulatedCamera {
    position: Rc<Cell<Position>>,
    model: Box<dyn IntensityModel>,
    gain: f64,
    shutter: f64,
    saturation: f32,
    noise: Option<(f32, StdRng)>,
    fail_after: Option<usize>,
    captures: usize,
    auto_adjusted: bool,
    closed: bool,
}

impl SimulatedCamera {
    fn new(position: Rc<Cell<Position>>, model: Box<dyn IntensityModel>) -> Self {
        Self {
            position,
            model,
            gain: 0.0,
            shutter: REFERENCE_SHUTTER,
            saturation: f32::INFINITY,
            noise: None,
            fail_after: None,
            captures: 0,
            auto_adjusted: false,
            closed: false,
        }
    }

    /// Pixel values clip at `level`.
    pub fn with_saturation(mut self, level: f32) -> Self {
        self.saturation = level;
        self
    }

    /// Adds uniform noise in `[0, amplitude)` to every pixel.
    pub fn with_noise(mut self, amplitude: f32, seed: u64) -> Self {
        self.noise = Some((amplitude, StdRng::seed_from_u64(seed)));
        self
    }

    /// The capture after `count` successful ones fails.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn captures(&self) -> usize {
        self.captures
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn shutter(&self) -> f64 {
        self.shutter
    }

    pub fn auto_adjusted(&self) -> bool {
        self.auto_adjusted
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn exposure(&self) -> f32 {
        (10f64.powf(self.gain / 20.0) * self.shutter / REFERENCE_SHUTTER) as f32
    }

    fn peak(&self) -> f32 {
        let raw = self.model.intensity(self.position.get()) * self.exposure();
        raw.min(self.saturation)
    }
}

impl Camera for SimulatedCamera {
    fn capture(&mut self) -> Result<Frame, HardwareError> {
        if self.closed {
            return Err(HardwareError::Disconnected {
                device: "simulated camera",
            });
        }
        if self.fail_after == Some(self.captures) {
            return Err(HardwareError::Device {
                device: "simulated camera",
                message: format!("capture {} failed", self.captures + 1),
            });
        }
        self.captures += 1;

        let peak = self.peak();
        let (cx, cy) = (FRAME_WIDTH / 2, FRAME_HEIGHT / 2);
        let mut frame = Frame::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
            let dx = x as f32 - cx as f32;
            let dy = y as f32 - cy as f32;
            peak * (-(dx * dx + dy * dy) / (2.0 * SPOT_SIGMA * SPOT_SIGMA)).exp()
        });

        if let Some((amplitude, rng)) = self.noise.as_mut() {
            for y in 0..FRAME_HEIGHT {
                for x in 0..FRAME_WIDTH {
                    let noisy = frame[(x, y)] + rng.random::<f32>() * *amplitude;
                    frame[(x, y)] = noisy.min(self.saturation);
                }
            }
        }

        Ok(frame)
    }

    fn set_gain(&mut self, gain: f64) -> Result<(), HardwareError> {
        self.gain = gain;
        Ok(())
    }

    fn set_shutter(&mut self, shutter: f64) -> Result<(), HardwareError> {
        self.shutter = shutter;
        Ok(())
    }

    /// Scales the shutter so the current peak lands at 80% of saturation.
    fn auto_adjust_shutter(&mut self) -> Result<(), HardwareError> {
        self.auto_adjusted = true;
        let raw = self.model.intensity(self.position.get()) * self.exposure();
        if raw > 0.0 && self.saturation.is_finite() {
            self.shutter *= f64::from(0.8 * self.saturation / raw);
        }
        Ok(())
    }

    fn is_saturated(&mut self) -> Result<bool, HardwareError> {
        let raw = self.model.intensity(self.position.get()) * self.exposure();
        Ok(raw >= self.saturation)
    }

    fn close(&mut self) -> Result<(), HardwareError> {
        self.closed = true;
        Ok(())
    }
}
