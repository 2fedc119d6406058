//! Audio engine: WAV tracks mixed through two low-pass sinks
//!
//! The tick thread never touches samples. It drives the [`mixer::Mixer`]
//! through [`mixer::MixerTrack`] and [`mixer::MixerFilters`], which implement
//! the [`crate::tracks::Track`] and [`crate::tracks::FilterBank`] seams.

pub mod filter;
pub mod level;
pub mod loader;
pub mod mixer;

#[cfg(feature = "audio")]
pub mod backend;

pub use filter::{FilterSettings, LowPassFilter};
pub use level::{rms_level, LevelMeter};
pub use loader::{load_wav, TrackBuffer};
pub use mixer::{Mixer, MixerCommand, MixerControl, MixerFilters, MixerTrack};

#[cfg(feature = "audio")]
pub use backend::{CpalInput, CpalOutput};
