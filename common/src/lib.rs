pub mod buffer2;
pub mod config_format;
pub mod log_setup;
pub mod shared_fn;

pub use buffer2::Buffer2;
pub use config_format::{load_file, save_file, ConfigError, ConfigFormat, ConfigResult};
pub use shared_fn::SharedFn;

pub fn is_debug() -> bool {
    cfg!(debug_assertions)
}
