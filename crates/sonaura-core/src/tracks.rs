//! Track handles and the two filter sinks they route into

use crate::audio::filter::FilterSettings;
use crate::mode::AudioMode;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// The filter a track's output is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterSink {
    /// Resonant low-pass around 300 Hz with gain boost
    Bass,
    /// Full-range low-pass with a swept cutoff
    Full,
}

impl FilterSink {
    /// Sink bound to an audio mode
    pub fn for_mode(mode: AudioMode) -> Self {
        match mode {
            AudioMode::BassOnly => FilterSink::Bass,
            AudioMode::Full => FilterSink::Full,
        }
    }

    /// Stable index, 0 for bass and 1 for full
    pub fn index(self) -> usize {
        match self {
            FilterSink::Bass => 0,
            FilterSink::Full => 1,
        }
    }
}

/// A playable track. Routing connects it to exactly one sink.
pub trait Track {
    /// Name used in logs
    fn name(&self) -> &str;
    /// Disconnect from the current sink and connect to `sink`
    fn route_to(&mut self, sink: FilterSink);
    /// Start playback from the beginning
    fn play(&mut self);
    /// Stop playback
    fn stop(&mut self);
    /// Whether the track is playing
    fn is_playing(&self) -> bool;
    /// Output gain in [0, 1]
    fn set_gain(&mut self, gain: f32);
}

/// The pair of filter sinks
pub trait FilterBank {
    /// Apply resonance, gain and cutoff to a sink
    fn configure(&mut self, sink: FilterSink, settings: &FilterSettings);
    /// Move a sink's cutoff (Hz)
    fn set_cutoff(&mut self, sink: FilterSink, cutoff_hz: f32);
}

/// Ordered, non-empty track list with a current index
#[derive(Debug)]
pub struct TrackSet<T> {
    tracks: Vec<T>,
    current: usize,
}

impl<T: Track> TrackSet<T> {
    /// Fails when `tracks` is empty
    pub fn new(tracks: Vec<T>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(CoreError::InvalidConfig(
                "track set needs at least one track".to_string(),
            ));
        }
        Ok(Self { tracks, current: 0 })
    }

    /// The selected track
    pub fn current(&self) -> &T {
        &self.tracks[self.current]
    }

    /// The selected track, mutably
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.tracks[self.current]
    }

    /// Index of the selected track
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Select the next track, wrapping around
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.tracks.len();
        self.current
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Never true for a constructed set
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate in rotation order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.tracks.iter()
    }

    /// Iterate mutably in rotation order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.tracks.iter_mut()
    }

    /// Number of tracks currently playing
    pub fn playing_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_playing()).count()
    }
}

/// Track without audio output, for headless runs and tests
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualTrack {
    name: String,
    route: Option<FilterSink>,
    playing: bool,
    gain: f32,
    play_count: u32,
}

impl VirtualTrack {
    /// Silent, unrouted and stopped
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: None,
            playing: false,
            gain: 0.0,
            play_count: 0,
        }
    }

    /// Sink currently connected
    pub fn route(&self) -> Option<FilterSink> {
        self.route
    }

    /// Last gain applied
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Times playback was started
    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

impl Track for VirtualTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn route_to(&mut self, sink: FilterSink) {
        self.route = Some(sink);
    }

    fn play(&mut self) {
        self.playing = true;
        self.play_count += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }
}

/// Filter bank that records what it was told
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualFilters {
    settings: [Option<FilterSettings>; 2],
    cutoffs: [Option<f32>; 2],
}

impl VirtualFilters {
    /// Nothing configured yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Last cutoff set on a sink
    pub fn cutoff(&self, sink: FilterSink) -> Option<f32> {
        self.cutoffs[sink.index()]
    }

    /// Last settings applied to a sink
    pub fn settings(&self, sink: FilterSink) -> Option<&FilterSettings> {
        self.settings[sink.index()].as_ref()
    }
}

impl FilterBank for VirtualFilters {
    fn configure(&mut self, sink: FilterSink, settings: &FilterSettings) {
        self.settings[sink.index()] = Some(*settings);
        self.cutoffs[sink.index()] = Some(settings.cutoff_hz);
    }

    fn set_cutoff(&mut self, sink: FilterSink, cutoff_hz: f32) {
        self.cutoffs[sink.index()] = Some(cutoff_hz);
    }
}
