//! External inputs: serial link and presence listener

use crossbeam_channel::Sender;
use sonaura_control::{NullLink, SerialLink};
use sonaura_core::{SerialConfig, SessionEvent};
use tracing::{info, warn};

/// Open the motor controller link, falling back to a closed link.
///
/// Received lines are queued as [`SessionEvent::SerialLine`].
pub fn open_link(
    config: &SerialConfig,
    enabled: bool,
    events: Sender<SessionEvent>,
) -> Box<dyn SerialLink> {
    if !enabled || !config.enabled {
        info!("Serial link disabled; motor commands will be dropped");
        return Box::new(NullLink);
    }
    open_port(config, events)
}

#[cfg(feature = "serial")]
fn open_port(config: &SerialConfig, events: Sender<SessionEvent>) -> Box<dyn SerialLink> {
    use sonaura_control::SerialPortLink;

    let on_line = move |line: String| {
        let _ = events.send(SessionEvent::SerialLine(line));
    };
    match SerialPortLink::open(&config.port, config.baud_rate, on_line) {
        Ok(link) => Box::new(link),
        Err(e) => {
            warn!("Could not open serial port {}: {}", config.port, e);
            Box::new(NullLink)
        }
    }
}

#[cfg(not(feature = "serial"))]
fn open_port(config: &SerialConfig, _events: Sender<SessionEvent>) -> Box<dyn SerialLink> {
    warn!(
        "Built without the 'serial' feature; ignoring port {}",
        config.port
    );
    Box::new(NullLink)
}

/// Running presence input, if any
#[cfg(feature = "osc")]
pub type PresenceInput = Option<sonaura_control::PresenceListener>;

/// Running presence input, if any
#[cfg(not(feature = "osc"))]
pub type PresenceInput = Option<()>;

/// Listen for detection counts from the face detector
#[cfg(feature = "osc")]
pub fn start_presence(port: u16, events: Sender<SessionEvent>) -> PresenceInput {
    use sonaura_control::PresenceListener;

    let on_sample = move |count: u32| {
        let _ = events.send(SessionEvent::Presence(count));
    };
    match PresenceListener::start(port, on_sample) {
        Ok(listener) => Some(listener),
        Err(e) => {
            warn!("Presence listener unavailable on port {}: {}", port, e);
            None
        }
    }
}

/// Listen for detection counts from the face detector
#[cfg(not(feature = "osc"))]
pub fn start_presence(port: u16, _events: Sender<SessionEvent>) -> PresenceInput {
    warn!("Built without the 'osc' feature; no presence input on port {}", port);
    None
}
