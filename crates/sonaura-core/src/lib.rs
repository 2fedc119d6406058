//! Sonaura Core - Installation state and audio engine
//!
//! This crate contains the behavior of the installation, including:
//! - Presence edge detection and the audio mode state machine
//! - Volume ramp and clap-triggered track rotation
//! - The filter cutoff sweep
//! - The session record that ties them to the serial protocol
//! - The real-time mixer with its two filter sinks

#![warn(missing_docs)]

use std::path::PathBuf;
use thiserror::Error;

pub mod audio;
pub mod config;
pub mod fade;
pub mod logging;
pub mod mode;
pub mod presence;
pub mod ramp;
pub mod rotator;
pub mod session;
pub mod tracks;

// --- Re-exports grouped by category ---

// State machines
pub use fade::{FadeDirection, FadeState, FilterFadeOscillator};
pub use mode::{AudioMode, AudioModeStateMachine, ModeContext, ModeTransition};
pub use presence::{PresenceBridge, PresenceEvent};
pub use ramp::VolumeRamp;
pub use rotator::TrackRotator;

// Session
pub use session::{Session, SessionEvent, TickReport};
pub use tracks::{FilterBank, FilterSink, Track, TrackSet, VirtualFilters, VirtualTrack};

// Configuration
pub use config::{
    FadeConfig, FadeTarget, FiltersConfig, SerialConfig, SessionConfig, VolumeConfig,
};
pub use logging::LogConfig;

// Audio
pub use audio::{load_wav, FilterSettings, LevelMeter, MixerControl, TrackBuffer};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Audio device or stream failure
    #[error("Audio error: {0}")]
    Audio(String),

    /// A track file could not be decoded
    #[error("Failed to load track {path:?}: {source}")]
    TrackLoad {
        /// File that failed
        path: PathBuf,
        /// Decoder error
        #[source]
        source: hound::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidConfig("tick_rate_hz must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: tick_rate_hz must be positive"
        );
    }
}
