//! Tracing subscriber setup for the preview binary.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use chrono::Local;
use tracing_subscriber::EnvFilter;

/// Timestamp format used in log lines.
struct PreviewTimer;

impl tracing_subscriber::fmt::time::FormatTime for PreviewTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d-T %H:%M:%S"))
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Build the filter: `RUST_LOG` when set, otherwise `level`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// What: Initialise the global tracing subscriber.
///
/// Inputs:
/// - `level`: Default filter directive
/// - `log_file`: Append logs to this file; stderr when `None`
///
/// Details:
/// - A log file that cannot be opened falls back to stderr with a warning.
/// - Calling this twice is harmless; the second subscriber is ignored.
pub fn init(level: &str, log_file: Option<&Path>) {
    let Some(path) = log_file else {
        init_stderr(level);
        return;
    };
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter(level))
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(PreviewTimer)
                .try_init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr logger
            init_stderr(level);
            tracing::warn!(error = %e, path = %path.display(), "failed to open log file; using stderr");
        }
    }
}

/// What: Stderr subscriber, keeping stdout free for block output.
fn init_stderr(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(PreviewTimer)
        .try_init();
}
