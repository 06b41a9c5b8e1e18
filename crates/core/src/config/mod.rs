//! Configuration file loading.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path, default_types_dir};
pub use types::{ConfigFile, LoggingConfig, Profile, ResolvedConfig};
