//! Sonaura Control - Motor controller and sensor links
//!
//! This crate provides the external control surfaces of the installation:
//! - **Serial**: single-byte motor commands and `DEBUG` telemetry parsing
//! - **OSC**: detection counts from the external face detector
//!
//! ## Feature Flags
//!
//! - `serial`: Enable the hardware serial link (requires `serialport`)
//! - `osc`: Enable the OSC presence listener (requires `rosc`)
//!
//! ## Modules
//!
//! - [`serial`] - Line protocol, links and deferred commands
//! - `osc` - Presence listener (requires `osc` feature)
//! - [`command`] - Outbound command alphabet
//! - [`telemetry`] - Telemetry frames
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Outbound command alphabet
pub mod command;
/// Error types
pub mod error;
/// Serial line protocol
pub mod serial;
/// Telemetry frame parsing
pub mod telemetry;

#[cfg(feature = "osc")]
/// OSC presence input
pub mod osc;

// Re-exports
pub use command::MotorCommand;
pub use error::{ControlError, Result};
pub use serial::{
    DeferredCommand, LineBuffer, LineOutcome, MemoryLink, NullLink, ProtocolStats, SerialLink,
    SerialLineProtocol,
};
pub use telemetry::{parse_frame, DebugTelemetry, Frame, FrameError};

#[cfg(feature = "serial")]
pub use serial::SerialPortLink;

#[cfg(feature = "osc")]
pub use osc::PresenceListener;
