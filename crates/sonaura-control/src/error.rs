//! Error types for the control system
use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// A command was written while the controller link was closed
    #[error("Serial link unavailable: {0}")]
    LinkUnavailable(String),

    /// Serial port error
    #[error("Serial error: {0}")]
    #[cfg(feature = "serial")]
    SerialError(#[from] serialport::Error),

    /// OSC error
    #[error("OSC error: {0}")]
    OscError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_unavailable_display() {
        let err = ControlError::LinkUnavailable("/dev/ttyACM0".to_string());
        assert_eq!(err.to_string(), "Serial link unavailable: /dev/ttyACM0");
    }
}
