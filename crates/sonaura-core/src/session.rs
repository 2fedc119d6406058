//! The owned session record and its tick
//!
//! Presence samples, serial lines and manual commands arrive from other
//! threads as [`SessionEvent`]s. They queue up on a channel and are drained at
//! the start of every [`Session::tick`], so no callback ever runs in the middle
//! of a tick body.
//!
//! Tick order:
//! 1. first tick only: configure both filters and start the current track
//! 2. drain queued events
//! 3. release the deferred startup debug request when due
//! 4. feed the volume sample to the track rotator
//! 5. step the volume ramp and apply it to every track
//! 6. step the cutoff sweep and apply it to the target filter
//! 7. write queued serial commands

use crate::config::{FadeTarget, FiltersConfig, SessionConfig};
use crate::fade::{FadeState, FilterFadeOscillator};
use crate::mode::{AudioMode, AudioModeStateMachine, ModeContext, ModeTransition};
use crate::presence::{PresenceBridge, PresenceEvent};
use crate::ramp::VolumeRamp;
use crate::rotator::TrackRotator;
use crate::tracks::{FilterBank, FilterSink, Track, TrackSet};
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use rand::rngs::StdRng;
use sonaura_control::{
    DebugTelemetry, DeferredCommand, LineOutcome, MotorCommand, ProtocolStats, SerialLink,
    SerialLineProtocol,
};
use std::time::Duration;
use tracing::{info, warn};

/// Input delivered to the tick loop
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Detection count of one camera frame
    Presence(u32),
    /// Complete line read from the serial link
    SerialLine(String),
    /// Manual motor command from the operator
    Command(MotorCommand),
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// One entry per presence sample drained this tick
    pub presence_events: Vec<PresenceEvent>,
    /// Mode changes caused by those samples
    pub transitions: Vec<ModeTransition>,
    /// One entry per serial line drained this tick
    pub lines: Vec<LineOutcome>,
    /// New track index if the rotator fired
    pub rotated_to: Option<usize>,
    /// Commands written to the link
    pub commands_sent: Vec<MotorCommand>,
    /// Commands dropped because the link was unavailable
    pub commands_failed: Vec<MotorCommand>,
    /// Ramped volume applied to the tracks
    pub volume: f32,
    /// Cutoff applied this tick (Hz)
    pub cutoff: f32,
}

/// Complete installation state driven by a periodic tick
pub struct Session<T: Track, B: FilterBank, L: SerialLink> {
    bridge: PresenceBridge,
    machine: AudioModeStateMachine,
    ramp: VolumeRamp,
    fade: FilterFadeOscillator,
    rotator: TrackRotator,
    tracks: TrackSet<T>,
    filters: B,
    filter_settings: FiltersConfig,
    fade_target: FadeTarget,
    protocol: SerialLineProtocol<L>,
    startup_debug: DeferredCommand,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    outbox: Vec<MotorCommand>,
    started: bool,
    ticks: u64,
}

impl<T: Track, B: FilterBank, L: SerialLink> Session<T, B, L> {
    /// Assemble a session. Nothing plays until the first tick.
    pub fn new(
        config: &SessionConfig,
        tracks: Vec<T>,
        filters: B,
        link: L,
        rng: StdRng,
    ) -> Result<Self> {
        Self::with_events(config, tracks, filters, link, rng, unbounded())
    }

    /// Like [`Session::new`] but draining an existing event channel, so
    /// producers can be wired before the session exists
    pub fn with_events(
        config: &SessionConfig,
        tracks: Vec<T>,
        filters: B,
        link: L,
        rng: StdRng,
        (events_tx, events_rx): (Sender<SessionEvent>, Receiver<SessionEvent>),
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bridge: PresenceBridge::new(),
            machine: AudioModeStateMachine::new(),
            ramp: VolumeRamp::new(config.volume.ramp_rate),
            fade: FilterFadeOscillator::new(config.fade.clone(), rng)?,
            rotator: TrackRotator::new(
                config.volume.clap_threshold,
                config.volume.debounce_ticks,
            ),
            tracks: TrackSet::new(tracks)?,
            filters,
            filter_settings: config.filters.clone(),
            fade_target: config.fade.target,
            protocol: SerialLineProtocol::new(link),
            startup_debug: DeferredCommand::new(
                MotorCommand::DebugRequest,
                Duration::from_millis(config.serial.initial_debug_delay_ms),
            ),
            events_tx,
            events_rx,
            outbox: Vec::new(),
            started: false,
            ticks: 0,
        })
    }

    /// Sender for delivering events from other threads
    pub fn event_sender(&self) -> Sender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Run one tick with the latest microphone level; `dt` is the time since the last tick
    pub fn tick(&mut self, volume_level: f32, dt: Duration) -> TickReport {
        let mut report = TickReport::default();
        self.ticks += 1;

        if !self.started {
            self.start();
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event, &mut report);
        }

        if let Some(command) = self.startup_debug.advance(dt) {
            self.outbox.push(command);
        }

        report.rotated_to = self.rotator.update(
            volume_level,
            self.machine.mode(),
            &self.ramp,
            &mut self.tracks,
        );

        let volume = self.ramp.step();
        for track in self.tracks.iter_mut() {
            track.set_gain(volume);
        }
        report.volume = volume;

        let cutoff = self.fade.tick();
        let sink = match self.fade_target {
            FadeTarget::FullRange => FilterSink::Full,
            FadeTarget::Selected => FilterSink::for_mode(self.machine.mode()),
        };
        self.filters.set_cutoff(sink, cutoff);
        report.cutoff = cutoff;

        self.flush_commands(&mut report);
        report
    }

    fn start(&mut self) {
        self.filters
            .configure(FilterSink::Bass, &self.filter_settings.bass);
        self.filters
            .configure(FilterSink::Full, &self.filter_settings.full);
        self.machine.start(ModeContext {
            ramp: &mut self.ramp,
            tracks: &mut self.tracks,
            fade: &mut self.fade,
            outbox: &mut self.outbox,
        });
        self.started = true;
        info!(
            "Session started with {} tracks, serial link {}",
            self.tracks.len(),
            if self.protocol.is_link_open() { "open" } else { "closed" }
        );
    }

    fn handle_event(&mut self, event: SessionEvent, report: &mut TickReport) {
        match event {
            SessionEvent::Presence(count) => {
                let presence = self.bridge.update(count);
                report.presence_events.push(presence);
                let ctx = ModeContext {
                    ramp: &mut self.ramp,
                    tracks: &mut self.tracks,
                    fade: &mut self.fade,
                    outbox: &mut self.outbox,
                };
                if let Some(transition) = self.machine.on_presence(presence, ctx) {
                    report.transitions.push(transition);
                }
            }
            SessionEvent::SerialLine(line) => {
                report.lines.push(self.protocol.on_line_received(&line));
            }
            SessionEvent::Command(command) => self.outbox.push(command),
        }
    }

    fn flush_commands(&mut self, report: &mut TickReport) {
        for command in self.outbox.drain(..) {
            match self.protocol.send_command(command) {
                Ok(()) => report.commands_sent.push(command),
                Err(e) => {
                    warn!("Dropped {}: {}", command, e);
                    report.commands_failed.push(command);
                }
            }
        }
    }

    /// Current audio mode
    pub fn mode(&self) -> AudioMode {
        self.machine.mode()
    }

    /// Latest motor telemetry
    pub fn telemetry(&self) -> &DebugTelemetry {
        self.protocol.telemetry()
    }

    /// Serial traffic counters
    pub fn protocol_stats(&self) -> ProtocolStats {
        self.protocol.stats()
    }

    /// Volume ramp
    pub fn volume(&self) -> &VolumeRamp {
        &self.ramp
    }

    /// Cutoff sweep snapshot
    pub fn fade_state(&self) -> &FadeState {
        self.fade.state()
    }

    /// Tracks in rotation order
    pub fn tracks(&self) -> &TrackSet<T> {
        &self.tracks
    }

    /// Filter sinks
    pub fn filters(&self) -> &B {
        &self.filters
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the serial link is open
    pub fn is_link_open(&self) -> bool {
        self.protocol.is_link_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{VirtualFilters, VirtualTrack};
    use rand::SeedableRng;
    use sonaura_control::MemoryLink;

    const DT: Duration = Duration::from_millis(16);

    fn session(
        link: MemoryLink,
    ) -> Session<VirtualTrack, VirtualFilters, MemoryLink> {
        let tracks = vec![VirtualTrack::new("a"), VirtualTrack::new("b")];
        Session::new(
            &SessionConfig::default(),
            tracks,
            VirtualFilters::new(),
            link,
            StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    #[test]
    fn test_first_tick_starts_bass_playback() {
        let mut s = session(MemoryLink::new());
        assert_eq!(s.tracks().playing_count(), 0);

        let report = s.tick(0.0, DT);
        assert_eq!(s.mode(), AudioMode::BassOnly);
        assert_eq!(s.tracks().current().route(), Some(FilterSink::Bass));
        assert!(s.tracks().current().is_playing());
        assert!(report.commands_sent.is_empty());
        assert!((report.volume - 0.02).abs() < 1e-6);
        assert_eq!(
            s.filters().settings(FilterSink::Bass),
            Some(&FiltersConfig::default().bass)
        );
    }

    #[test]
    fn test_volume_applied_to_all_tracks() {
        let mut s = session(MemoryLink::new());
        for _ in 0..10 {
            s.tick(0.0, DT);
        }
        let volume = s.volume().current();
        assert!(s.tracks().iter().all(|t| t.gain() == volume));
    }

    #[test]
    fn test_cutoff_goes_to_full_sink_by_default() {
        let mut s = session(MemoryLink::new());
        let report = s.tick(0.0, DT);
        assert_eq!(s.filters().cutoff(FilterSink::Full), Some(report.cutoff));
        assert_eq!(s.filters().cutoff(FilterSink::Bass), Some(300.0));
    }

    #[test]
    fn test_selected_fade_target_follows_mode() {
        let mut config = SessionConfig::default();
        config.fade.target = FadeTarget::Selected;
        let mut s = Session::new(
            &config,
            vec![VirtualTrack::new("a")],
            VirtualFilters::new(),
            MemoryLink::new(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        let report = s.tick(0.0, DT);
        assert_eq!(s.filters().cutoff(FilterSink::Bass), Some(report.cutoff));
    }

    #[test]
    fn test_startup_debug_request_after_delay() {
        let link = MemoryLink::new();
        let mut s = session(link.clone());
        for _ in 0..62 {
            s.tick(0.0, DT);
        }
        assert!(link.written().is_empty());
        let report = s.tick(0.0, DT);
        assert_eq!(report.commands_sent, vec![MotorCommand::DebugRequest]);
        assert_eq!(link.written(), b"D".to_vec());
    }

    #[test]
    fn test_serial_lines_update_telemetry() {
        let mut s = session(MemoryLink::new());
        let tx = s.event_sender();
        tx.send(SessionEvent::SerialLine("DEBUG,120,45.5,1,30".into()))
            .unwrap();
        tx.send(SessionEvent::SerialLine("DEBUG,1,2".into())).unwrap();
        tx.send(SessionEvent::SerialLine("HELLO".into())).unwrap();

        let report = s.tick(0.0, DT);
        assert_eq!(
            report.lines,
            vec![
                LineOutcome::TelemetryUpdated,
                LineOutcome::Discarded,
                LineOutcome::Ignored
            ]
        );
        assert_eq!(s.telemetry().total_steps, 120);
        assert!(s.telemetry().is_rotating);
    }

    #[test]
    fn test_closed_link_drops_commands() {
        let link = MemoryLink::new();
        link.set_open(false);
        let mut s = session(link.clone());
        s.event_sender()
            .send(SessionEvent::Command(MotorCommand::RotateLeft))
            .unwrap();

        let report = s.tick(0.0, DT);
        assert_eq!(report.commands_failed, vec![MotorCommand::RotateLeft]);
        assert!(link.written().is_empty());
        assert_eq!(s.protocol_stats().commands_sent, 0);
    }

    #[test]
    fn test_clap_rotates_in_current_mode() {
        let mut s = session(MemoryLink::new());
        s.tick(0.0, DT);
        s.event_sender().send(SessionEvent::Presence(1)).unwrap();
        let report = s.tick(0.5, DT);
        assert_eq!(report.rotated_to, Some(1));
        assert_eq!(s.tracks().current().route(), Some(FilterSink::Full));
        assert_eq!(s.tracks().playing_count(), 1);
    }
}
