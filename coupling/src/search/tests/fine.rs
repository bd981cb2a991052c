use std::time::Duration;

use super::{assert_close, example_config};
use crate::config::OptimizerConfig;
use crate::position::{Axis, Position};
use crate::probe::Probe;
use crate::search::{CoarseScanner, FineOutcome, FineTuner, OptimizationState};
use crate::simulation::{self, IntensityField};
use crate::testing::{ScriptedCamera, blind_stage, paraboloid_rig};

#[test]
fn test_half_extents_are_a_tenth_of_the_size() {
    let tuner = FineTuner::new(&OptimizerConfig::default());
    assert_eq!(tuner.half_extents(), (500, 200));
}

#[test]
fn test_example_converges_after_one_round() {
    let (mut stage, mut camera) = paraboloid_rig();
    let config = example_config();
    let mut probe = Probe::new(&mut stage, &mut camera, Duration::ZERO);
    let mut state = OptimizationState::new(Position::new(0, 0));

    CoarseScanner::new(&config)
        .scan(&mut probe, &mut state)
        .unwrap();
    let coarse_value = state.best_value();
    let outcome = FineTuner::new(&config)
        .refine(&mut probe, &mut state)
        .unwrap();

    assert_eq!(
        outcome,
        FineOutcome {
            rounds: 1,
            converged: true
        }
    );
    let best = state.best_position();
    assert_eq!(best, Position::new(275, 110));
    assert!((best.x - 300).abs() <= config.fine_step);
    assert!((best.z - 100).abs() <= config.fine_step);
    assert_close(state.best_value(), coarse_value);

    let fine_moves: Vec<_> = stage.moves().into_iter().skip(12).collect();
    assert_eq!(
        fine_moves,
        vec![
            (Axis::X, 175),
            (Axis::X, 225),
            (Axis::X, 275),
            (Axis::X, 325),
            (Axis::X, 275),
            (Axis::Z, 70),
            (Axis::Z, 120),
            (Axis::Z, 110),
        ]
    );
    assert_eq!(stage.current(), Position::new(275, 110));
}

#[test]
fn test_no_round_after_a_still_round() {
    // One round samples 4 X and 2 Z positions; none beats the initial zero.
    let mut stage = blind_stage(Position::new(1000, 1000));
    let mut camera = ScriptedCamera::new([0.0; 6].into_iter().chain([10.0; 6]));
    let mut probe = Probe::new(&mut stage, &mut camera, Duration::ZERO);
    let mut state = OptimizationState::new(Position::new(1000, 1000));

    let outcome = FineTuner::new(&example_config())
        .refine(&mut probe, &mut state)
        .unwrap();

    assert_eq!(outcome.rounds, 1);
    assert!(outcome.converged);
    assert_eq!(camera.remaining(), 6);
    assert_eq!(state.best_position(), Position::new(1000, 1000));
}

#[test]
fn test_iteration_limit_stops_a_climbing_run() {
    let (stage, mut camera) = simulation::rig(|p: Position| -> f32 { p.x as f32 });
    let mut stage = stage
        .with_max_position(1_000_000)
        .with_position(Position::new(10_000, 10_000));
    let mut probe = Probe::new(&mut stage, &mut camera, Duration::ZERO);
    let mut state = OptimizationState::new(Position::new(10_000, 10_000));

    let outcome = FineTuner::new(&example_config())
        .refine(&mut probe, &mut state)
        .unwrap();

    // Each round moves X to the last point of its window, 50 nm further.
    assert_eq!(
        outcome,
        FineOutcome {
            rounds: 3,
            converged: false
        }
    );
    assert_eq!(state.best_position(), Position::new(10_150, 10_000));
    assert_eq!(probe.samples(), 18);
}

#[test]
fn test_gaussian_fine_improves_on_coarse() {
    let center = Position::new(10_300, 9_400);
    let (stage, mut camera) = simulation::rig(IntensityField::Gaussian {
        center,
        peak: 200.0,
        sigma_x: 1500.0,
        sigma_z: 800.0,
    });
    let mut stage = stage.with_position(Position::new(10_000, 10_000));
    let config = OptimizerConfig::default();
    let mut probe = Probe::new(&mut stage, &mut camera, Duration::ZERO);
    let mut state = OptimizationState::new(probe.current_position().unwrap());

    CoarseScanner::new(&config)
        .scan(&mut probe, &mut state)
        .unwrap();
    let coarse_value = state.best_value();
    let outcome = FineTuner::new(&config)
        .refine(&mut probe, &mut state)
        .unwrap();

    assert!(outcome.converged);
    assert!(outcome.rounds <= config.iteration_limit);
    assert!(state.best_value() >= coarse_value);
    let best = state.best_position();
    assert!((best.x - center.x).abs() <= config.fine_step, "x = {}", best.x);
    assert!((best.z - center.z).abs() <= config.fine_step, "z = {}", best.z);
}
