//! Logging configuration
//!
//! The subscriber itself is installed by the binary; this module only holds
//! the persisted settings and the log directory housekeeping.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::Level;

/// Prefix of every log file name
const LOG_FILE_PREFIX: &str = "sonaura_";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
    /// Directory receiving log files
    pub log_path: PathBuf,
    /// Log files kept in `log_path`; older ones are deleted at startup
    pub max_files: usize,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a timestamped file in `log_path`
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: PathBuf::from("logs"),
            max_files: 10,
            console_output: true,
            file_output: false,
        }
    }
}

impl LogConfig {
    /// Configured level, `INFO` when unrecognized
    pub fn parse_level(&self) -> Level {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Create the log directory when file output is enabled
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_path)?;
        }
        Ok(())
    }

    /// Path of the file for this run
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.log_path
            .join(format!("{}{}.log", LOG_FILE_PREFIX, stamp))
    }

    /// Delete the oldest log files so at most `max_files - 1` remain,
    /// leaving room for the file about to be created
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.log_path.is_dir() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        let keep = self.max_files.saturating_sub(1);
        if logs.len() <= keep {
            return Ok(0);
        }

        // Timestamped names sort chronologically
        logs.sort();
        let excess = logs.len() - keep;
        let mut removed = 0;
        for path in logs.into_iter().take(excess) {
            fs::remove_file(&path)?;
            removed += 1;
        }
        Ok(removed)
    }
}
