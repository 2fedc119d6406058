//! Hardware serial link backed by the `serialport` crate

use super::line_buffer::LineBuffer;
use super::link::SerialLink;
use crate::{error::ControlError, Result};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default baud rate of the motor controller firmware
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout of the background reader; bounds shutdown latency
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Size of a single read from the port
const READ_CHUNK: usize = 256;

/// Serial link to the motor controller.
///
/// Writes happen on the caller's thread. Reads run on a background thread that
/// reassembles lines and hands each complete line to the `on_line` callback.
pub struct SerialPortLink {
    path: String,
    writer: Box<dyn SerialPort>,
    open: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl SerialPortLink {
    /// Open the device at `path` and start the line reader.
    ///
    /// `on_line` is invoked once per complete line, without the terminator.
    pub fn open<F>(path: &str, baud_rate: u32, on_line: F) -> Result<Self>
    where
        F: FnMut(String) + Send + 'static,
    {
        let writer = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        let reader_port = writer.try_clone()?;

        let open = Arc::new(AtomicBool::new(true));
        let running = Arc::new(AtomicBool::new(true));

        let reader = {
            let open = open.clone();
            let running = running.clone();
            let path = path.to_string();
            thread::Builder::new()
                .name("serial-reader".to_string())
                .spawn(move || read_lines(reader_port, &path, open, running, on_line))?
        };

        info!("Serial link opened on {} at {} baud", path, baud_rate);

        Ok(Self {
            path: path.to_string(),
            writer,
            open,
            running,
            reader: Some(reader),
        })
    }

    /// Device path this link was opened on
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SerialLink for SerialPortLink {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if !self.is_open() {
            return Err(ControlError::LinkUnavailable(self.path.clone()));
        }
        let result = self
            .writer
            .write_all(&[byte])
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            warn!("Serial write to {} failed: {}", self.path, e);
            self.open.store(false, Ordering::Release);
            return Err(ControlError::LinkUnavailable(format!("{}: {}", self.path, e)));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.clone()
    }
}

impl Drop for SerialPortLink {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        debug!("Serial link on {} closed", self.path);
    }
}

fn read_lines<R, F>(
    mut port: R,
    path: &str,
    open: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    mut on_line: F,
) where
    R: Read,
    F: FnMut(String),
{
    let mut buffer = LineBuffer::new();
    let mut scratch = [0u8; READ_CHUNK];

    while running.load(Ordering::Acquire) {
        match port.read(&mut scratch) {
            Ok(0) => {
                warn!("Serial device {} reported end of stream", path);
                open.store(false, Ordering::Release);
                break;
            }
            Ok(n) => {
                for line in buffer.push(&scratch[..n]) {
                    on_line(line);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                error!("Serial read from {} failed: {}", path, e);
                open.store(false, Ordering::Release);
                break;
            }
        }
    }
}
