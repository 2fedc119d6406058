//! Transport abstraction for the controller link

use crate::{error::ControlError, Result};
use std::sync::{Arc, Mutex};

/// Byte-level write side of the controller link.
///
/// Reads are delivered asynchronously as lines (see [`super::SerialPortLink`]),
/// so the trait only covers what the tick loop needs.
pub trait SerialLink: Send {
    /// Whether the link is currently open
    fn is_open(&self) -> bool;

    /// Write a single byte. Implementations must not block for long.
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Name of the device or endpoint, for logs and errors
    fn describe(&self) -> String;
}

impl<L: SerialLink + ?Sized> SerialLink for Box<L> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A link that is never open. Used when running without a controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLink;

impl SerialLink for NullLink {
    fn is_open(&self) -> bool {
        false
    }

    fn write_byte(&mut self, _byte: u8) -> Result<()> {
        Err(ControlError::LinkUnavailable(self.describe()))
    }

    fn describe(&self) -> String {
        "null link".to_string()
    }
}

/// In-memory link that records written bytes.
///
/// Clones share the same buffer and open flag, so a test can keep one handle
/// while the protocol owns the other.
#[derive(Debug, Clone)]
pub struct MemoryLink {
    inner: Arc<Mutex<MemoryLinkState>>,
}

#[derive(Debug)]
struct MemoryLinkState {
    open: bool,
    written: Vec<u8>,
}

impl MemoryLink {
    /// Create an open link
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryLinkState {
                open: true,
                written: Vec::new(),
            })),
        }
    }

    /// Open or close the link
    pub fn set_open(&self, open: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.open = open;
        }
    }

    /// Bytes written so far
    pub fn written(&self) -> Vec<u8> {
        self.inner
            .lock()
            .map(|state| state.written.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLink for MemoryLink {
    fn is_open(&self) -> bool {
        self.inner.lock().map(|state| state.open).unwrap_or(false)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| ControlError::LinkUnavailable(self.describe()))?;
        if !state.open {
            return Err(ControlError::LinkUnavailable("memory link".to_string()));
        }
        state.written.push(byte);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory link".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_link_always_fails() {
        let mut link = NullLink;
        assert!(!link.is_open());
        assert!(matches!(
            link.write_byte(b'D'),
            Err(ControlError::LinkUnavailable(_))
        ));
    }

    #[test]
    fn test_memory_link_shares_state() {
        let observer = MemoryLink::new();
        let mut link = observer.clone();
        link.write_byte(b'L').unwrap();
        link.write_byte(b'R').unwrap();
        assert_eq!(observer.written(), b"LR".to_vec());

        observer.set_open(false);
        assert!(!link.is_open());
        assert!(link.write_byte(b'D').is_err());
        assert_eq!(observer.written().len(), 2);
    }
}
