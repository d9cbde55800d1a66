//! Configuration subsystem.

pub mod schema;
pub mod validation;

pub use schema::{MirrorConfig, MirrorPaths, DEFAULT_UPDATE_FREQUENCY_SECS};
pub use validation::{load_mirror_config, ConfigError};
