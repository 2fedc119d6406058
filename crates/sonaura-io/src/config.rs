//! Config I/O - High-level API
//!
//! Version checks and validation on top of [`crate::config_format`].

use crate::config_format::{ConfigFile, CONFIG_FILE_VERSION};
use crate::error::{IoError, Result};
use sonaura_core::SessionConfig;
use std::path::Path;
use tracing::info;

/// Save a session config to `path`.
pub fn save_config(config: &SessionConfig, path: &Path) -> Result<()> {
    let mut file = ConfigFile::new(config.clone());
    file.save(path)?;
    info!("Saved config to {}", path.display());
    Ok(())
}

/// Load and validate a session config from `path`.
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    let file = ConfigFile::load(path)?;

    if file.version != CONFIG_FILE_VERSION {
        return Err(IoError::VersionMismatch {
            expected: CONFIG_FILE_VERSION.to_string(),
            found: file.version,
        });
    }

    file.session.validate()?;
    info!("Loaded config from {}", path.display());
    Ok(file.session)
}
