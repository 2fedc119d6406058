//! On-disk configuration file format.
//!
//! A [`ConfigFile`] wraps the [`SessionConfig`] with a format version and
//! timestamps. It is stored as RON (`.ron`, `.sonaura`) or JSON (`.json`),
//! chosen by file extension.

use crate::error::{IoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sonaura_core::SessionConfig;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Version stamped into saved files.
pub const CONFIG_FILE_VERSION: &str = "1.0.0";

/// Maximum accepted config file size (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Serialization format, selected by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.ron` or `.sonaura`
    Ron,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Format for `path`; a missing extension means RON
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("ron");
        match extension {
            "json" => Ok(ConfigFormat::Json),
            "ron" | "sonaura" => Ok(ConfigFormat::Ron),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Top-level structure of a saved configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    /// Format version
    pub version: String,
    /// Timestamps
    pub metadata: ConfigMetadata,
    /// The installation settings
    pub session: SessionConfig,
}

/// Timestamps of a config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigMetadata {
    /// When the file was first written
    pub created_at: DateTime<Utc>,
    /// Last save
    pub modified_at: DateTime<Utc>,
}

impl ConfigFile {
    /// Wrap a session config, stamping both timestamps with now.
    pub fn new(session: SessionConfig) -> Self {
        let now = Utc::now();
        Self {
            version: CONFIG_FILE_VERSION.to_string(),
            metadata: ConfigMetadata {
                created_at: now,
                modified_at: now,
            },
            session,
        }
    }

    /// Load from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_limit(path, MAX_CONFIG_FILE_SIZE)
    }

    pub(crate) fn load_with_limit(path: &Path, limit: u64) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > limit {
            return Err(IoError::FileTooLarge { size, limit });
        }

        let format = ConfigFormat::from_path(path)?;
        let mut content = String::new();
        File::open(path)?.read_to_string(&mut content)?;

        let file = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Ron => ron::from_str(&content)?,
        };
        Ok(file)
    }

    /// Save to `path`, updating `modified_at`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        self.metadata.modified_at = Utc::now();

        match format {
            ConfigFormat::Json => {
                let file = File::create(path)?;
                serde_json::to_writer_pretty(file, self)?;
            }
            ConfigFormat::Ron => {
                let config = ron::ser::PrettyConfig::default();
                let s = ron::ser::to_string_pretty(self, config)?;
                let mut file = File::create(path)?;
                file.write_all(s.as_bytes())?;
            }
        }
        Ok(())
    }
}
