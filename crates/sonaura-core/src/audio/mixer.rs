//! Real-time track mixer
//!
//! The [`Mixer`] lives on the audio callback thread. The tick thread controls
//! it through [`MixerTrack`] and [`MixerFilters`] handles, which send
//! [`MixerCommand`]s over a channel drained at the start of every render.

use super::filter::{FilterSettings, LowPassFilter};
use super::TrackBuffer;
use crate::tracks::{FilterBank, FilterSink, Track};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Maximum output channels the mixer filters independently
const MAX_CHANNELS: usize = 2;

/// Control messages from the tick thread
#[derive(Debug, Clone, PartialEq)]
pub enum MixerCommand {
    /// Connect a track to a sink, disconnecting it from the other
    Route(usize, FilterSink),
    /// Start a track from the beginning
    Play(usize),
    /// Stop a track
    Stop(usize),
    /// Set a track's gain
    Gain(usize, f32),
    /// Move a sink's cutoff
    Cutoff(FilterSink, f32),
    /// Replace a sink's settings
    Configure(FilterSink, FilterSettings),
}

struct Voice {
    buffer: Arc<TrackBuffer>,
    position: f64,
    step: f64,
    gain: f32,
    route: Option<FilterSink>,
    playing: Arc<AtomicBool>,
}

impl Voice {
    /// Sample of `channel` at the current frame, folding mono to all channels
    fn sample(&self, channel: usize) -> f32 {
        let frame = self.position as usize;
        let src_channels = self.buffer.channels.max(1);
        let ch = channel.min(src_channels - 1);
        self.buffer
            .samples
            .get(frame * src_channels + ch)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Audio-thread side of the mixer
pub struct Mixer {
    voices: Vec<Voice>,
    filters: [[LowPassFilter; MAX_CHANNELS]; 2],
    commands: Receiver<MixerCommand>,
}

impl Mixer {
    /// Build a mixer over decoded tracks plus the control handles for the tick thread
    pub fn new(
        buffers: Vec<Arc<TrackBuffer>>,
        sample_rate: u32,
        bass: &FilterSettings,
        full: &FilterSettings,
    ) -> (Self, MixerControl) {
        let (tx, rx) = unbounded();
        let rate = sample_rate as f32;

        let mut tracks = Vec::with_capacity(buffers.len());
        let voices = buffers
            .into_iter()
            .enumerate()
            .map(|(index, buffer)| {
                let playing = Arc::new(AtomicBool::new(false));
                tracks.push(MixerTrack {
                    index,
                    name: buffer.name.clone(),
                    commands: tx.clone(),
                    playing: playing.clone(),
                });
                Voice {
                    step: buffer.sample_rate as f64 / sample_rate.max(1) as f64,
                    buffer,
                    position: 0.0,
                    gain: 0.0,
                    route: None,
                    playing,
                }
            })
            .collect();

        let mixer = Self {
            voices,
            filters: [
                [LowPassFilter::new(bass, rate), LowPassFilter::new(bass, rate)],
                [LowPassFilter::new(full, rate), LowPassFilter::new(full, rate)],
            ],
            commands: rx,
        };

        (
            mixer,
            MixerControl {
                tracks,
                filters: MixerFilters { commands: tx },
            },
        )
    }

    fn apply(&mut self, command: MixerCommand) {
        match command {
            MixerCommand::Route(i, sink) => {
                if let Some(voice) = self.voices.get_mut(i) {
                    voice.route = Some(sink);
                }
            }
            MixerCommand::Play(i) => {
                if let Some(voice) = self.voices.get_mut(i) {
                    voice.position = 0.0;
                    voice.playing.store(true, Ordering::Release);
                }
            }
            MixerCommand::Stop(i) => {
                if let Some(voice) = self.voices.get_mut(i) {
                    voice.playing.store(false, Ordering::Release);
                }
            }
            MixerCommand::Gain(i, gain) => {
                if let Some(voice) = self.voices.get_mut(i) {
                    voice.gain = gain;
                }
            }
            MixerCommand::Cutoff(sink, hz) => {
                for filter in self.filters[sink.index()].iter_mut() {
                    filter.set_cutoff(hz);
                }
            }
            MixerCommand::Configure(sink, settings) => {
                for filter in self.filters[sink.index()].iter_mut() {
                    filter.configure(&settings);
                }
            }
        }
    }

    /// Fill an interleaved output buffer
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }

        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let filtered = frame.len().min(MAX_CHANNELS);
            for ch in 0..filtered {
                let mut bus = [0.0f32; 2];
                for voice in &self.voices {
                    if let Some(route) = voice.route {
                        if voice.playing.load(Ordering::Relaxed) {
                            bus[route.index()] += voice.sample(ch) * voice.gain;
                        }
                    }
                }
                let mixed =
                    self.filters[0][ch].process(bus[0]) + self.filters[1][ch].process(bus[1]);
                frame[ch] = mixed.clamp(-1.0, 1.0);
            }
            // Surround channels mirror the last filtered channel
            for ch in filtered..frame.len() {
                frame[ch] = frame[filtered - 1];
            }

            for voice in &mut self.voices {
                if !voice.playing.load(Ordering::Relaxed) {
                    continue;
                }
                voice.position += voice.step;
                if voice.position as usize >= voice.buffer.frames() {
                    voice.playing.store(false, Ordering::Release);
                }
            }
        }
    }
}

/// Tick-thread handles into a [`Mixer`]
pub struct MixerControl {
    /// One handle per track, in load order
    pub tracks: Vec<MixerTrack>,
    /// Filter sink control
    pub filters: MixerFilters,
}

/// Handle for one mixer track
pub struct MixerTrack {
    index: usize,
    name: String,
    commands: Sender<MixerCommand>,
    playing: Arc<AtomicBool>,
}

impl MixerTrack {
    fn send(&self, command: MixerCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Mixer for track '{}' is gone", self.name);
        }
    }
}

impl Track for MixerTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn route_to(&mut self, sink: FilterSink) {
        self.send(MixerCommand::Route(self.index, sink));
    }

    fn play(&mut self) {
        self.playing.store(true, Ordering::Release);
        self.send(MixerCommand::Play(self.index));
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::Release);
        self.send(MixerCommand::Stop(self.index));
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn set_gain(&mut self, gain: f32) {
        self.send(MixerCommand::Gain(self.index, gain));
    }
}

/// Handle for the two filter sinks
pub struct MixerFilters {
    commands: Sender<MixerCommand>,
}

impl MixerFilters {
    fn send(&self, command: MixerCommand) -> bool {
        if self.commands.send(command).is_err() {
            tracing::warn!("Mixer is gone, filter update dropped");
            return false;
        }
        true
    }
}

impl FilterBank for MixerFilters {
    fn configure(&mut self, sink: FilterSink, settings: &FilterSettings) {
        self.send(MixerCommand::Configure(sink, *settings));
    }

    fn set_cutoff(&mut self, sink: FilterSink, cutoff_hz: f32) {
        self.send(MixerCommand::Cutoff(sink, cutoff_hz));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dc_track(name: &str, frames: usize, value: f32) -> Arc<TrackBuffer> {
        Arc::new(TrackBuffer {
            name: name.to_string(),
            samples: vec![value; frames],
            channels: 1,
            sample_rate: 48_000,
        })
    }

    fn open_filter(gain: f32) -> FilterSettings {
        FilterSettings {
            cutoff_hz: 20_000.0,
            resonance_db: 0.0,
            gain,
        }
    }

    #[test]
    fn test_unrouted_track_is_silent() {
        let (mut mixer, mut control) = Mixer::new(
            vec![dc_track("a", 1000, 0.5)],
            48_000,
            &open_filter(1.0),
            &open_filter(1.0),
        );
        control.tracks[0].set_gain(1.0);
        control.tracks[0].play();

        let mut out = vec![0.0; 256];
        mixer.render(&mut out, 2);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_routed_track_reaches_output_with_sink_gain() {
        let (mut mixer, mut control) = Mixer::new(
            vec![dc_track("a", 48_000, 0.1)],
            48_000,
            &open_filter(3.0),
            &open_filter(1.0),
        );
        let track = &mut control.tracks[0];
        track.route_to(FilterSink::Bass);
        track.set_gain(1.0);
        track.play();

        let mut out = vec![0.0; 4096];
        mixer.render(&mut out, 2);
        let last = *out.last().unwrap();
        assert!((last - 0.3).abs() < 0.01, "got {}", last);
    }

    #[test]
    fn test_track_stops_at_end() {
        let (mut mixer, mut control) = Mixer::new(
            vec![dc_track("short", 10, 0.5)],
            48_000,
            &open_filter(1.0),
            &open_filter(1.0),
        );
        control.tracks[0].route_to(FilterSink::Full);
        control.tracks[0].play();
        assert!(control.tracks[0].is_playing());

        let mut out = vec![0.0; 64];
        mixer.render(&mut out, 1);
        assert!(!control.tracks[0].is_playing());
    }

    #[test]
    fn test_output_is_clamped() {
        let (mut mixer, mut control) = Mixer::new(
            vec![dc_track("loud", 48_000, 0.9)],
            48_000,
            &open_filter(7.0),
            &open_filter(1.0),
        );
        control.tracks[0].route_to(FilterSink::Bass);
        control.tracks[0].set_gain(1.0);
        control.tracks[0].play();

        let mut out = vec![0.0; 2048];
        mixer.render(&mut out, 2);
        assert!(out.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_filter_updates_after_mixer_dropped() {
        let (mixer, mut control) = Mixer::new(
            vec![dc_track("a", 100, 0.1)],
            48_000,
            &open_filter(1.0),
            &open_filter(1.0),
        );
        assert!(control.filters.send(MixerCommand::Cutoff(FilterSink::Full, 800.0)));

        drop(mixer);
        assert!(!control.filters.send(MixerCommand::Cutoff(FilterSink::Full, 900.0)));
        control.filters.set_cutoff(FilterSink::Bass, 300.0);
        control.filters.configure(FilterSink::Full, &open_filter(1.0));
    }
}
