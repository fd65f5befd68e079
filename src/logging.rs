//! Tracing setup. Logs go to `<log_dir>/vendadmin.log` so they never paint
//! over the terminal UI.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

pub const LOG_FILE: &str = "vendadmin.log";

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Falls back to stderr when the log file
/// cannot be opened.
pub fn init(config: &AppConfig) {
    let log_path = config.log_dir.join(LOG_FILE);
    let opened = std::fs::create_dir_all(&config.log_dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
    });

    match opened {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .try_init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .try_init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}
