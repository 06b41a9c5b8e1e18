use recordkit_core::config::ResolvedConfig;
use std::fs::{self, File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable holding filter directives, e.g. `RK_LOG=recordkit_core=trace`.
pub const LOG_ENV: &str = "RK_LOG";

static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);

/// Install the global subscriber.
///
/// Diagnostics go to stderr so `rk check` output on stdout stays parseable.
/// When the config names a log file, records are appended to it as well.
pub fn init(cfg: &ResolvedConfig) {
    let stderr_level = level_or(&cfg.logging.level, LevelFilter::INFO);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .with_filter(filter(stderr_level));

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some(path) = cfg.logging.file.as_deref() else {
        registry.init();
        return;
    };

    let file = match open_log_file(path) {
        Ok(file) => file,
        Err(e) => {
            registry.init();
            tracing::warn!(path = %path.display(), "log file disabled: {e}");
            return;
        }
    };

    let file_level = cfg
        .logging
        .file_level
        .as_deref()
        .map_or(stderr_level, |level| level_or(level, LevelFilter::DEBUG));

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    if let Ok(mut g) = LOG_GUARD.lock() {
        *g = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter(file_level));

    registry.with(file_layer).init();
}

/// Filter for one layer: `RK_LOG` directives on top of the configured level.
fn filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Level named in the config, or `fallback` when the name is not a level.
fn level_or(name: &str, fallback: LevelFilter) -> LevelFilter {
    name.trim().parse().unwrap_or(fallback)
}
