use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    /// Directory of record type declaration files. May use `~`, environment
    /// variables and the `{{config_dir}}` placeholder.
    pub types_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    /// Directory for record type declarations.
    pub types_dir: PathBuf,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Configuration used when no config file exists: default logging and
    /// the given types directory.
    pub fn builtin(types_dir: PathBuf) -> Self {
        Self {
            active_profile: "default".to_string(),
            types_dir,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_types_dir(mut self, types_dir: PathBuf) -> Self {
        self.types_dir = types_dir;
        self
    }
}
