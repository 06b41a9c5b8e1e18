pub mod check;
pub mod describe;
pub mod doctor;
pub mod types;

use std::path::Path;

use recordkit_core::TypeCatalog;
use recordkit_core::config::loader::{ConfigError, ConfigLoader, default_config_path};
use recordkit_core::config::types::ResolvedConfig;
use recordkit_core::types::TypeRepository;

/// Load the configuration, falling back to built-in defaults when there is no
/// config file but a types directory was given on the command line.
pub fn load_config(
    config: Option<&Path>,
    profile: Option<&str>,
    types_dir: Option<&Path>,
) -> Result<ResolvedConfig, ConfigError> {
    match (ConfigLoader::load(config, profile), types_dir) {
        (Ok(rc), Some(dir)) => Ok(rc.with_types_dir(dir.to_path_buf())),
        (Ok(rc), None) => Ok(rc),
        (Err(ConfigError::NotFound(_)), Some(dir)) if config.is_none() => {
            Ok(ResolvedConfig::builtin(dir.to_path_buf()))
        }
        (Err(e), _) => Err(e),
    }
}

/// Load the configuration and install logging, or exit.
pub fn resolve_config(
    command: &str,
    config: Option<&Path>,
    profile: Option<&str>,
    types_dir: Option<&Path>,
) -> ResolvedConfig {
    match load_config(config, profile, types_dir) {
        Ok(rc) => {
            crate::logging::init(&rc);
            rc
        }
        Err(e) => {
            eprintln!("FAIL rk {command}");
            eprintln!("{e}");
            if config.is_none() {
                eprintln!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}

/// Discover and declare every record type in the configured directory, or exit.
pub fn load_catalog(rc: &ResolvedConfig) -> TypeCatalog {
    let repo = match TypeRepository::new(&rc.types_dir) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Error loading record types: {e}");
            std::process::exit(1);
        }
    };

    match TypeCatalog::load(&repo) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error declaring record types: {e}");
            std::process::exit(1);
        }
    }
}
