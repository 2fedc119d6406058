//! Reassembly of newline terminated lines from arbitrary read chunks

/// Upper bound for a line without a terminator. Anything longer is noise.
pub const MAX_LINE_LEN: usize = 512;

/// Accumulates raw serial bytes and yields complete lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    overflowed: bool,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every line completed by it.
    ///
    /// Returned lines do not include the `\n`. Invalid UTF-8 is replaced.
    /// A line longer than [`MAX_LINE_LEN`] is dropped up to its terminator.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' {
                if !self.overflowed {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                }
                self.pending.clear();
                self.overflowed = false;
            } else if self.overflowed {
                continue;
            } else if self.pending.len() < MAX_LINE_LEN {
                self.pending.push(byte);
            } else {
                tracing::trace!("Serial line exceeded {} bytes, dropping", MAX_LINE_LEN);
                self.pending.clear();
                self.overflowed = true;
            }
        }
        lines
    }

    /// Bytes waiting for a terminator
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
