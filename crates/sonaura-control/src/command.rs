//! Outbound motor controller commands
//!
//! Every command is a single ASCII byte with no framing. The controller does
//! not acknowledge commands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A command understood by the motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorCommand {
    /// Rotate the platform left (`L`)
    RotateLeft,
    /// Rotate the platform right (`R`)
    RotateRight,
    /// Ask the controller to emit a `DEBUG` telemetry line (`D`)
    DebugRequest,
    /// A face entered the camera's view (`F`)
    FaceDetected,
}

impl MotorCommand {
    /// All commands in wire order
    pub const ALL: [MotorCommand; 4] = [
        MotorCommand::RotateLeft,
        MotorCommand::RotateRight,
        MotorCommand::DebugRequest,
        MotorCommand::FaceDetected,
    ];

    /// Encode to the wire byte
    pub fn as_byte(self) -> u8 {
        match self {
            MotorCommand::RotateLeft => b'L',
            MotorCommand::RotateRight => b'R',
            MotorCommand::DebugRequest => b'D',
            MotorCommand::FaceDetected => b'F',
        }
    }

    /// Decode a wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'L' => Some(MotorCommand::RotateLeft),
            b'R' => Some(MotorCommand::RotateRight),
            b'D' => Some(MotorCommand::DebugRequest),
            b'F' => Some(MotorCommand::FaceDetected),
            _ => None,
        }
    }

    /// Human readable label, used for console and log output
    pub fn label(self) -> &'static str {
        match self {
            MotorCommand::RotateLeft => "Rotate Left",
            MotorCommand::RotateRight => "Rotate Right",
            MotorCommand::DebugRequest => "Update Debug Info",
            MotorCommand::FaceDetected => "Face Detected",
        }
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.label(), self.as_byte() as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_alphabet() {
        let bytes: Vec<u8> = MotorCommand::ALL.iter().map(|c| c.as_byte()).collect();
        assert_eq!(bytes, b"LRDF".to_vec());
    }

    #[test]
    fn test_from_byte_rejects_unknown() {
        assert_eq!(MotorCommand::from_byte(b'F'), Some(MotorCommand::FaceDetected));
        assert_eq!(MotorCommand::from_byte(b'x'), None);
        assert_eq!(MotorCommand::from_byte(b'l'), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MotorCommand::DebugRequest.to_string(), "Update Debug Info ('D')");
    }
}
