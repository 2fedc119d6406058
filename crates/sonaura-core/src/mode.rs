//! Presence-driven audio mode switching

use crate::fade::{FadeDirection, FilterFadeOscillator};
use crate::presence::PresenceEvent;
use crate::ramp::VolumeRamp;
use crate::tracks::{FilterSink, Track, TrackSet};
use serde::{Deserialize, Serialize};
use sonaura_control::MotorCommand;
use std::fmt;
use tracing::info;

/// Which filter the current track is heard through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AudioMode {
    /// Nobody in front of the camera
    #[default]
    BassOnly,
    /// A face is present
    Full,
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioMode::BassOnly => write!(f, "bass-only"),
            AudioMode::Full => write!(f, "full"),
        }
    }
}

/// A mode change that actually happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTransition {
    /// Mode before
    pub from: AudioMode,
    /// Mode after
    pub to: AudioMode,
}

/// Session state a transition touches
pub struct ModeContext<'a, T> {
    /// Volume ramp; its target is reset on every transition
    pub ramp: &'a mut VolumeRamp,
    /// Tracks; the current one is rerouted and restarted
    pub tracks: &'a mut TrackSet<T>,
    /// Cutoff sweep; its direction follows the mode
    pub fade: &'a mut FilterFadeOscillator,
    /// Serial commands to send after the tick body
    pub outbox: &'a mut Vec<MotorCommand>,
}

/// Owns the audio mode. Nothing else writes it.
#[derive(Debug, Clone, Default)]
pub struct AudioModeStateMachine {
    mode: AudioMode,
}

impl AudioModeStateMachine {
    /// Start in [`AudioMode::BassOnly`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    /// Initial playback: current track through the bass sink, ramping up.
    /// No serial command is sent.
    pub fn start<T: Track>(&self, ctx: ModeContext<'_, T>) {
        ctx.ramp.set_target(1.0);
        let sink = FilterSink::for_mode(self.mode);
        let track = ctx.tracks.current_mut();
        track.route_to(sink);
        track.play();
        info!("Started '{}' in {} mode", track.name(), self.mode);
    }

    /// Apply a presence edge. `None` events never change anything.
    pub fn on_presence<T: Track>(
        &mut self,
        event: PresenceEvent,
        ctx: ModeContext<'_, T>,
    ) -> Option<ModeTransition> {
        match event {
            PresenceEvent::Appeared => self.request(AudioMode::Full, ctx),
            PresenceEvent::Disappeared => self.request(AudioMode::BassOnly, ctx),
            PresenceEvent::None => None,
        }
    }

    /// Switch to `mode`. Requesting the active mode is a no-op.
    pub fn request<T: Track>(
        &mut self,
        mode: AudioMode,
        ctx: ModeContext<'_, T>,
    ) -> Option<ModeTransition> {
        if mode == self.mode {
            return None;
        }
        let transition = ModeTransition {
            from: self.mode,
            to: mode,
        };
        self.mode = mode;

        ctx.ramp.set_target(1.0);
        let track = ctx.tracks.current_mut();
        track.route_to(FilterSink::for_mode(mode));
        track.play();

        match mode {
            AudioMode::Full => {
                ctx.outbox.push(MotorCommand::FaceDetected);
                ctx.fade.set_direction(FadeDirection::In);
            }
            AudioMode::BassOnly => {
                ctx.fade.set_direction(FadeDirection::Out);
            }
        }

        info!("Audio mode {} -> {}", transition.from, transition.to);
        Some(transition)
    }
}
