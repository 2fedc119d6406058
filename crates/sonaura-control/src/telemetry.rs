//! Motor controller telemetry frames
//!
//! The controller periodically (or on a `D` request) writes a status line:
//!
//! ```text
//! DEBUG,<total steps>,<angle degrees>,<0|1 rotating>,<speed rpm>
//! ```
//!
//! Lines with any other prefix are reserved for future frame types.

use serde::{Deserialize, Serialize};

/// Prefix that marks a debug telemetry frame
pub const DEBUG_TAG: &str = "DEBUG";

/// Number of comma separated fields in a debug frame, tag included
pub const DEBUG_FIELD_COUNT: usize = 5;

/// Last known state of the motor controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DebugTelemetry {
    /// Steps taken since the controller booted
    pub total_steps: i64,
    /// Current platform angle in degrees
    pub current_angle: f32,
    /// Whether the motor is currently turning
    pub is_rotating: bool,
    /// Motor speed in RPM
    pub motor_speed: i64,
}

impl DebugTelemetry {
    /// Text lines for the on-screen debug overlay
    pub fn display_lines(&self) -> [String; 4] {
        [
            format!("Total Steps: {}", self.total_steps),
            format!("Current Angle: {:.2}°", self.current_angle),
            format!(
                "Motor Status: {}",
                if self.is_rotating { "Rotating" } else { "Stopped" }
            ),
            format!("Motor Speed: {} RPM", self.motor_speed),
        ]
    }
}

/// A recognized inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A well-formed `DEBUG` frame
    Debug(DebugTelemetry),
    /// A line that is not a known frame type
    Unrecognized,
}

/// Why a `DEBUG` line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Wrong number of comma separated fields
    FieldCount(usize),
    /// A field could not be parsed as the expected type
    InvalidField {
        /// Field index (1-based, the tag is field 0)
        index: usize,
        /// Raw field text
        value: String,
    },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::FieldCount(n) => write!(
                f,
                "expected {} fields, got {}",
                DEBUG_FIELD_COUNT, n
            ),
            FrameError::InvalidField { index, value } => {
                write!(f, "field {} is not valid: {:?}", index, value)
            }
        }
    }
}

/// Parse one line received from the controller.
///
/// Surrounding whitespace (including the `\r` some firmwares emit) is ignored.
pub fn parse_frame(line: &str) -> std::result::Result<Frame, FrameError> {
    let line = line.trim();
    if !line.starts_with(DEBUG_TAG) {
        return Ok(Frame::Unrecognized);
    }

    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != DEBUG_FIELD_COUNT {
        return Err(FrameError::FieldCount(parts.len()));
    }

    Ok(Frame::Debug(DebugTelemetry {
        total_steps: parse_field(&parts, 1)?,
        current_angle: parse_field(&parts, 2)?,
        is_rotating: parts[3].trim() == "1",
        motor_speed: parse_field(&parts, 4)?,
    }))
}

fn parse_field<T: std::str::FromStr>(
    parts: &[&str],
    index: usize,
) -> std::result::Result<T, FrameError> {
    let raw = parts[index].trim();
    raw.parse().map_err(|_| FrameError::InvalidField {
        index,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_debug_frame() {
        let frame = parse_frame("DEBUG,120,45.5,1,30\n").unwrap();
        assert_eq!(
            frame,
            Frame::Debug(DebugTelemetry {
                total_steps: 120,
                current_angle: 45.5,
                is_rotating: true,
                motor_speed: 30,
            })
        );
    }

    #[test]
    fn test_rotating_flag_only_accepts_one() {
        for flag in ["0", "true", "2", ""] {
            let line = format!("DEBUG,1,0.0,{},0", flag);
            match parse_frame(&line).unwrap() {
                Frame::Debug(t) => assert!(!t.is_rotating, "flag {:?}", flag),
                other => panic!("unexpected frame {:?}", other),
            }
        }
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(parse_frame("DEBUG,1,2"), Err(FrameError::FieldCount(3)));
        assert_eq!(
            parse_frame("DEBUG,1,2,1,4,5"),
            Err(FrameError::FieldCount(6))
        );
    }

    #[test]
    fn test_non_numeric_field() {
        let err = parse_frame("DEBUG,abc,1.0,1,3").unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidField {
                index: 1,
                value: "abc".to_string()
            }
        );
        assert!(parse_frame("DEBUG,1,north,1,3").is_err());
        assert!(parse_frame("DEBUG,1,1.0,1,fast").is_err());
    }

    #[test]
    fn test_other_lines_are_unrecognized() {
        assert_eq!(parse_frame("HELLO\n"), Ok(Frame::Unrecognized));
        assert_eq!(parse_frame(""), Ok(Frame::Unrecognized));
        assert_eq!(parse_frame("debug,1,2,1,3"), Ok(Frame::Unrecognized));
    }

    #[test]
    fn test_crlf_and_padding() {
        let frame = parse_frame("  DEBUG, -40, -12.25 ,0, 0\r\n").unwrap();
        assert_eq!(
            frame,
            Frame::Debug(DebugTelemetry {
                total_steps: -40,
                current_angle: -12.25,
                is_rotating: false,
                motor_speed: 0,
            })
        );
    }

    #[test]
    fn test_display_lines() {
        let telemetry = DebugTelemetry {
            total_steps: 120,
            current_angle: 45.5,
            is_rotating: true,
            motor_speed: 30,
        };
        let lines = telemetry.display_lines();
        assert_eq!(lines[0], "Total Steps: 120");
        assert_eq!(lines[1], "Current Angle: 45.50°");
        assert_eq!(lines[2], "Motor Status: Rotating");
        assert_eq!(lines[3], "Motor Speed: 30 RPM");
    }
}
