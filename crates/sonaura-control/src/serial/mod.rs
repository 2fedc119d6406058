//! Line-oriented serial protocol with the motor controller
//!
//! Outbound traffic is a single byte per [`MotorCommand`]; inbound traffic is
//! newline terminated text. The protocol owns the latest [`DebugTelemetry`]
//! and is its only writer.
//!
//! ## Example
//!
//! ```rust
//! use sonaura_control::serial::{MemoryLink, SerialLineProtocol};
//! use sonaura_control::MotorCommand;
//!
//! let link = MemoryLink::new();
//! let mut protocol = SerialLineProtocol::new(link.clone());
//!
//! protocol.send_command(MotorCommand::DebugRequest).unwrap();
//! protocol.on_line_received("DEBUG,120,45.5,1,30");
//!
//! assert_eq!(link.written(), b"D".to_vec());
//! assert_eq!(protocol.telemetry().total_steps, 120);
//! ```

pub mod deferred;
pub mod line_buffer;
pub mod link;
#[cfg(feature = "serial")]
pub mod port;

pub use deferred::DeferredCommand;
pub use line_buffer::LineBuffer;
pub use link::{MemoryLink, NullLink, SerialLink};
#[cfg(feature = "serial")]
pub use port::{SerialPortLink, DEFAULT_BAUD_RATE};

use crate::command::MotorCommand;
use crate::telemetry::{parse_frame, DebugTelemetry, Frame};
use crate::{error::ControlError, Result};
use tracing::{debug, trace};

/// What happened to a received line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A `DEBUG` frame replaced the telemetry
    TelemetryUpdated,
    /// A `DEBUG` frame failed validation and was dropped
    Discarded,
    /// Not a known frame type
    Ignored,
}

/// Counters for received traffic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    /// Frames that updated telemetry
    pub frames_parsed: u64,
    /// Malformed `DEBUG` frames dropped
    pub frames_discarded: u64,
    /// Lines of unknown type
    pub lines_ignored: u64,
    /// Commands written to the link
    pub commands_sent: u64,
}

/// Serial protocol endpoint: command encoder plus telemetry parser
pub struct SerialLineProtocol<L: SerialLink> {
    link: L,
    telemetry: DebugTelemetry,
    stats: ProtocolStats,
}

impl<L: SerialLink> SerialLineProtocol<L> {
    /// Wrap a link. Telemetry starts zeroed.
    pub fn new(link: L) -> Self {
        Self {
            link,
            telemetry: DebugTelemetry::default(),
            stats: ProtocolStats::default(),
        }
    }

    /// Write a command byte.
    ///
    /// Fails with [`ControlError::LinkUnavailable`] when the link is closed.
    /// There is no acknowledgement and no retry.
    pub fn send_command(&mut self, command: MotorCommand) -> Result<()> {
        if !self.link.is_open() {
            return Err(ControlError::LinkUnavailable(self.link.describe()));
        }
        self.link.write_byte(command.as_byte())?;
        self.stats.commands_sent += 1;
        debug!("Sent {} to {}", command, self.link.describe());
        Ok(())
    }

    /// Handle one complete line from the controller.
    ///
    /// Malformed `DEBUG` frames keep the previous telemetry.
    pub fn on_line_received(&mut self, line: &str) -> LineOutcome {
        match parse_frame(line) {
            Ok(Frame::Debug(telemetry)) => {
                self.telemetry = telemetry;
                self.stats.frames_parsed += 1;
                trace!("Telemetry updated: {:?}", telemetry);
                LineOutcome::TelemetryUpdated
            }
            Ok(Frame::Unrecognized) => {
                self.stats.lines_ignored += 1;
                LineOutcome::Ignored
            }
            Err(e) => {
                self.stats.frames_discarded += 1;
                trace!("Discarding malformed frame {:?}: {}", line.trim(), e);
                LineOutcome::Discarded
            }
        }
    }

    /// Latest telemetry snapshot
    pub fn telemetry(&self) -> &DebugTelemetry {
        &self.telemetry
    }

    /// Traffic counters
    pub fn stats(&self) -> ProtocolStats {
        self.stats
    }

    /// Whether the underlying link is open
    pub fn is_link_open(&self) -> bool {
        self.link.is_open()
    }

    /// Access the underlying link
    pub fn link(&self) -> &L {
        &self.link
    }
}
