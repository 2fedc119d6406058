//! Session configuration
//!
//! Defaults reproduce the installation as it is deployed. Everything here is
//! persisted by `sonaura-io`.

use crate::audio::filter::FilterSettings;
use crate::logging::LogConfig;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the fade oscillator's cutoff is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FadeTarget {
    /// Always the full-range filter; the bass filter keeps its fixed cutoff
    #[default]
    FullRange,
    /// Whichever filter the current audio mode selects
    Selected,
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Open the link at startup
    pub enabled: bool,
    /// Device path
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Delay before the startup debug request, in milliseconds
    pub initial_debug_delay_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: "/dev/tty.usbmodem1101".to_string(),
            baud_rate: 9600,
            initial_debug_delay_ms: 1000,
        }
    }
}

/// Volume ramp and clap detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Fraction of the remaining distance covered per tick
    pub ramp_rate: f32,
    /// Microphone level above which a tick counts as a clap
    pub clap_threshold: f32,
    /// Ticks to ignore claps after one fires (0 keeps every-tick triggering)
    #[serde(default)]
    pub debounce_ticks: u32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            ramp_rate: 0.02,
            clap_threshold: 0.1,
            debounce_ticks: 0,
        }
    }
}

/// Cutoff sweep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadeConfig {
    /// Interpolation factor per tick before any randomization
    pub initial_speed: f32,
    /// Distance from a bound at which the sweep turns around (Hz)
    pub tolerance: f32,
    /// Redraw the speed periodically
    pub randomize_speed: bool,
    /// Range the speed is drawn from
    pub speed_range: (f32, f32),
    /// Ticks between speed redraws
    pub speed_redraw_interval: u64,
    /// Redraw the bounds whenever the sweep turns to fade out
    pub randomize_bounds: bool,
    /// Range the lower bound is drawn from (Hz)
    pub min_freq_range: (f32, f32),
    /// Highest upper bound (Hz)
    pub max_freq_ceiling: f32,
    /// Smallest distance between the bounds (Hz)
    pub minimum_span: f32,
    /// Filter receiving the swept cutoff
    #[serde(default)]
    pub target: FadeTarget,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            initial_speed: 0.01,
            tolerance: 10.0,
            randomize_speed: false,
            speed_range: (0.05, 0.1),
            speed_redraw_interval: 200,
            randomize_bounds: false,
            min_freq_range: (200.0, 800.0),
            max_freq_ceiling: 2000.0,
            minimum_span: 400.0,
            target: FadeTarget::FullRange,
        }
    }
}

/// The two filter sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Bass-only low-pass
    pub bass: FilterSettings,
    /// Full-range low-pass; its cutoff is swept
    pub full: FilterSettings,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            bass: FilterSettings {
                cutoff_hz: 300.0,
                resonance_db: 20.0,
                gain: 7.0,
            },
            full: FilterSettings {
                cutoff_hz: 500.0,
                resonance_db: 10.0,
                gain: 1.0,
            },
        }
    }
}

/// Complete configuration of a running installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Tick loop frequency
    pub tick_rate_hz: u32,
    /// Audio files, played in rotation order
    pub tracks: Vec<PathBuf>,
    /// Motor controller link
    #[serde(default)]
    pub serial: SerialConfig,
    /// Volume ramp and clap detection
    #[serde(default)]
    pub volume: VolumeConfig,
    /// Cutoff sweep
    #[serde(default)]
    pub fade: FadeConfig,
    /// Filter sinks
    #[serde(default)]
    pub filters: FiltersConfig,
    /// UDP port of the presence listener
    #[serde(default = "default_presence_port")]
    pub presence_port: u16,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

fn default_presence_port() -> u16 {
    9000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            tracks: vec![
                PathBuf::from("taloki.wav"),
                PathBuf::from("tetakere.wav"),
                PathBuf::from("tuki.wav"),
            ],
            serial: SerialConfig::default(),
            volume: VolumeConfig::default(),
            fade: FadeConfig::default(),
            filters: FiltersConfig::default(),
            presence_port: default_presence_port(),
            log: LogConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Reject configurations the session cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_hz == 0 {
            return Err(invalid("tick_rate_hz must be positive"));
        }
        if self.tracks.is_empty() {
            return Err(invalid("at least one track is required"));
        }
        if !(self.volume.ramp_rate > 0.0 && self.volume.ramp_rate <= 1.0) {
            return Err(invalid("volume.ramp_rate must be in (0, 1]"));
        }
        // Levels live in [0, 1]; anything below 0 would fire in silence
        if !(self.volume.clap_threshold >= 0.0 && self.volume.clap_threshold < 1.0) {
            return Err(invalid("volume.clap_threshold must be in [0, 1)"));
        }
        self.fade.validate()?;
        for (name, filter) in [("bass", &self.filters.bass), ("full", &self.filters.full)] {
            let finite = filter.cutoff_hz.is_finite()
                && filter.resonance_db.is_finite()
                && filter.gain.is_finite();
            if !finite || filter.cutoff_hz <= 0.0 || filter.gain < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "filters.{}: values must be finite, cutoff positive and gain non-negative",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl FadeConfig {
    /// Check the bounds rule can always be satisfied
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.initial_speed,
            self.speed_range.0,
            self.speed_range.1,
            self.min_freq_range.0,
            self.min_freq_range.1,
            self.max_freq_ceiling,
            self.minimum_span,
            self.tolerance,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(invalid("fade values must be finite"));
        }
        let in_unit = |v: f32| v > 0.0 && v <= 1.0;
        if !in_unit(self.initial_speed) {
            return Err(invalid("fade.initial_speed must be in (0, 1]"));
        }
        if !(in_unit(self.speed_range.0) && in_unit(self.speed_range.1))
            || self.speed_range.0 > self.speed_range.1
        {
            return Err(invalid("fade.speed_range must be an ordered range within (0, 1]"));
        }
        if self.min_freq_range.0 <= 0.0 || self.min_freq_range.0 > self.min_freq_range.1 {
            return Err(invalid("fade.min_freq_range must be an ordered positive range"));
        }
        if self.minimum_span <= 0.0 || self.tolerance < 0.0 {
            return Err(invalid(
                "fade.minimum_span must be positive and fade.tolerance non-negative",
            ));
        }
        if self.min_freq_range.1 + self.minimum_span > self.max_freq_ceiling {
            return Err(invalid(
                "fade.max_freq_ceiling must leave room for minimum_span above the highest minimum",
            ));
        }
        if self.randomize_speed && self.speed_redraw_interval == 0 {
            return Err(invalid("fade.speed_redraw_interval must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> CoreError {
    CoreError::InvalidConfig(msg.to_string())
}
