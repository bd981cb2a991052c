mod fine;

use crate::config::OptimizerConfig;

/// Parameters of the worked example: 2 coarse steps over a 1000 x 400 nm guide.
fn example_config() -> OptimizerConfig {
    OptimizerConfig {
        step_count: 2,
        size_x: 1000,
        size_z: 400,
        fine_step: 50,
        iteration_limit: 3,
        ..Default::default()
    }
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "Expected {expected}, got {actual}"
    );
}
