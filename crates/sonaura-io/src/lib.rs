//! Sonaura IO - Configuration persistence
//!
//! Session configurations are saved as RON or JSON with a version stamp.
//! Loading checks the version and validates the decoded settings.

#![warn(missing_docs)]

pub mod config;
pub mod config_format;
pub mod error;

pub use config::{load_config, save_config};
pub use config_format::{ConfigFile, ConfigFormat, CONFIG_FILE_VERSION, MAX_CONFIG_FILE_SIZE};
pub use error::{IoError, Result};
