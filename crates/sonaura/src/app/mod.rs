//! Installation runtime: wires inputs and audio into a ticking session

pub mod console;
pub mod inputs;

use anyhow::{Context, Result};
use console::ConsoleRequest;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sonaura_control::SerialLink;
use sonaura_core::{
    FilterBank, Session, SessionConfig, SessionEvent, Track, VirtualFilters, VirtualTrack,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runtime switches from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Run without audio devices
    pub no_audio: bool,
    /// Run without the serial link
    pub no_serial: bool,
    /// Fixed seed for the fade randomization
    pub seed: Option<u64>,
}

/// Run until `quit` is entered on the console
pub fn run(config: SessionConfig, options: RunOptions) -> Result<()> {
    config.validate().context("Invalid session configuration")?;

    let (events_tx, events_rx) = unbounded::<SessionEvent>();
    let (console_tx, console_rx) = unbounded::<ConsoleRequest>();

    let link = inputs::open_link(&config.serial, !options.no_serial, events_tx.clone());
    let _presence = inputs::start_presence(config.presence_port, events_tx.clone());
    console::spawn(events_tx.clone(), console_tx).context("Failed to start console thread")?;

    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let channel = (events_tx, events_rx);

    if options.no_audio {
        info!("Running headless without audio devices");
        let tracks = config
            .tracks
            .iter()
            .map(|path| VirtualTrack::new(path.display().to_string()))
            .collect();
        let session =
            Session::with_events(&config, tracks, VirtualFilters::new(), link, rng, channel)?;
        return run_loop(session, config.tick_rate_hz, console_rx, || 0.0f32);
    }

    run_with_audio(&config, link, rng, channel, console_rx)
}

#[cfg(feature = "audio")]
fn run_with_audio(
    config: &SessionConfig,
    link: Box<dyn SerialLink>,
    rng: StdRng,
    channel: (Sender<SessionEvent>, Receiver<SessionEvent>),
    console_rx: Receiver<ConsoleRequest>,
) -> Result<()> {
    use sonaura_core::audio::{CpalInput, CpalOutput, LevelMeter};
    use std::sync::Arc;

    let buffers = config
        .tracks
        .iter()
        .map(|path| sonaura_core::load_wav(path).map(Arc::new))
        .collect::<sonaura_core::Result<Vec<_>>>()
        .context("Failed to load tracks")?;

    let (_output, control) =
        CpalOutput::start(buffers, &config.filters).context("Failed to start audio output")?;

    let (mut meter, levels) = LevelMeter::new();
    let _input = match CpalInput::start(levels) {
        Ok(input) => Some(input),
        Err(e) => {
            warn!("Microphone unavailable, clap detection disabled: {}", e);
            None
        }
    };

    let session = Session::with_events(
        config,
        control.tracks,
        control.filters,
        link,
        rng,
        channel,
    )?;
    run_loop(session, config.tick_rate_hz, console_rx, || meter.poll())
}

#[cfg(not(feature = "audio"))]
fn run_with_audio(
    _config: &SessionConfig,
    _link: Box<dyn SerialLink>,
    _rng: StdRng,
    _channel: (Sender<SessionEvent>, Receiver<SessionEvent>),
    _console_rx: Receiver<ConsoleRequest>,
) -> Result<()> {
    anyhow::bail!("Built without the 'audio' feature; run with --no-audio")
}

fn run_loop<T, B, L>(
    mut session: Session<T, B, L>,
    tick_rate_hz: u32,
    console_rx: Receiver<ConsoleRequest>,
    mut volume_level: impl FnMut() -> f32,
) -> Result<()>
where
    T: Track,
    B: FilterBank,
    L: SerialLink,
{
    let period = Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz.max(1)));
    let ticker = crossbeam_channel::tick(period);
    let closed = crossbeam_channel::never::<ConsoleRequest>();
    let mut console_open = true;
    let mut last = Instant::now();

    info!("Tick loop running at {} Hz", tick_rate_hz);
    loop {
        select! {
            recv(ticker) -> now => {
                let now = now.unwrap_or_else(|_| Instant::now());
                let dt = now.saturating_duration_since(last);
                last = now;

                let report = session.tick(volume_level(), dt);
                if let Some(index) = report.rotated_to {
                    debug!("Now playing track #{}", index);
                }
            }
            recv(if console_open { &console_rx } else { &closed }) -> command => match command {
                Ok(ConsoleRequest::Status) => log_status(&session),
                Ok(ConsoleRequest::Quit) => break,
                // Console closed (stdin EOF); keep running
                Err(_) => console_open = false,
            },
        }
    }

    info!("Stopping after {} ticks", session.ticks());
    Ok(())
}

fn log_status<T: Track, B: FilterBank, L: SerialLink>(session: &Session<T, B, L>) {
    let fade = session.fade_state();
    let stats = session.protocol_stats();
    info!(
        "Mode: {} | track '{}' | volume {:.3} | cutoff {:.0} Hz ({:.0}-{:.0})",
        session.mode(),
        session.tracks().current().name(),
        session.volume().current(),
        fade.current_freq,
        fade.min_freq,
        fade.max_freq,
    );
    info!(
        "Serial: link {} | {} sent, {} frames, {} discarded",
        if session.is_link_open() { "open" } else { "closed" },
        stats.commands_sent,
        stats.frames_parsed,
        stats.frames_discarded,
    );
    for line in session.telemetry().display_lines() {
        info!("{}", line);
    }
}
