//! Subscriber setup for the installation binary
//!
//! Stdout belongs to the operator console, so every log line goes to stderr
//! or to the rotating log file.

use anyhow::{Context, Result};
use sonaura_core::logging::LogConfig;
use std::fs::File;
use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Handle to keep the logging worker thread alive
pub struct LogGuard {
    // Flushes the file writer on drop
    _guard: WorkerGuard,
}

fn level_filter(config: &LogConfig) -> EnvFilter {
    // RUST_LOG takes precedence over the configured level
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Prune old session logs and open a fresh one behind a non-blocking writer
fn open_log_file(config: &LogConfig) -> Result<(NonBlocking, LogGuard, PathBuf)> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;
    if let Err(e) = config.cleanup_old_logs() {
        eprintln!("Warning: Failed to cleanup old log files: {}", e);
    }

    let log_path = config.current_log_path();
    let file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
    let (writer, worker_guard) = tracing_appender::non_blocking(file);

    Ok((
        writer,
        LogGuard {
            _guard: worker_guard,
        },
        log_path,
    ))
}

/// Install the global subscriber. Hold the returned guard until exit.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .with_filter(level_filter(config))
    });

    let (file_layer, guard, log_path) = if config.file_output {
        let (writer, guard, path) = open_log_file(config)?;
        // Serial reader, OSC listener and console run on named threads
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_filter(level_filter(config));
        (Some(layer), Some(guard), Some(path))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized at level: {}", config.level);
    if let Some(path) = log_path {
        tracing::info!("Session log: {:?}", path);
    }
    Ok(guard)
}
