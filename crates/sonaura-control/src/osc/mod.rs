//! OSC input from the external face detector
//!
//! The detector process sends one message per analysed video frame:
//!
//! - `/presence <int count>`: number of faces found
//! - `/faces [xMin yMin width height]*`: one float quad per bounding box
//!
//! Only emptiness matters downstream, so both forms reduce to a count.

use crate::{error::ControlError, Result};
use rosc::{OscMessage, OscPacket, OscType};
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, trace, warn};

/// Default UDP port of the presence listener
pub const DEFAULT_PRESENCE_PORT: u16 = 9000;

/// Address carrying a detection count
pub const PRESENCE_ADDRESS: &str = "/presence";

/// Address carrying bounding boxes
pub const FACES_ADDRESS: &str = "/faces";

const RECV_TIMEOUT: Duration = Duration::from_millis(50);

/// Extract a detection count from a decoded packet.
///
/// Bundles are searched in order; the first presence message wins.
pub fn detection_count(packet: &OscPacket) -> Option<u32> {
    match packet {
        OscPacket::Message(msg) => message_count(msg),
        OscPacket::Bundle(bundle) => bundle.content.iter().find_map(detection_count),
    }
}

fn message_count(msg: &OscMessage) -> Option<u32> {
    match msg.addr.as_str() {
        PRESENCE_ADDRESS => match msg.args.first()? {
            OscType::Int(n) => Some((*n).max(0) as u32),
            OscType::Long(n) => Some(u32::try_from((*n).max(0)).unwrap_or(u32::MAX)),
            OscType::Float(f) => Some(f.max(0.0) as u32),
            OscType::Bool(b) => Some(u32::from(*b)),
            _ => None,
        },
        FACES_ADDRESS => Some((msg.args.len() / 4) as u32),
        _ => None,
    }
}

/// Background UDP listener that reports a detection count per frame
pub struct PresenceListener {
    port: u16,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PresenceListener {
    /// Bind `0.0.0.0:port` and start listening.
    ///
    /// `on_sample` receives each detection count on the listener thread.
    pub fn start<F>(port: u16, mut on_sample: F) -> Result<Self>
    where
        F: FnMut(u32) + Send + 'static,
    {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        socket.set_read_timeout(Some(RECV_TIMEOUT))?;
        let port = socket.local_addr()?.port();

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::Builder::new()
            .name("presence-osc".to_string())
            .spawn(move || {
                let mut buf = [0u8; rosc::decoder::MTU];
                while flag.load(Ordering::Acquire) {
                    match socket.recv_from(&mut buf) {
                        Ok((size, addr)) => match rosc::decoder::decode_udp(&buf[..size]) {
                            Ok((_, packet)) => {
                                if let Some(count) = detection_count(&packet) {
                                    on_sample(count);
                                } else {
                                    trace!("Ignoring OSC packet from {}", addr);
                                }
                            }
                            Err(e) => trace!("Undecodable OSC packet from {}: {:?}", addr, e),
                        },
                        Err(ref e)
                            if matches!(
                                e.kind(),
                                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                            ) => {}
                        Err(e) => {
                            warn!("Presence listener stopped: {}", e);
                            break;
                        }
                    }
                }
            })
            .map_err(|e| ControlError::OscError(e.to_string()))?;

        info!("Presence listener on UDP port {}", port);

        Ok(Self {
            port,
            running,
            handle: Some(handle),
        })
    }

    /// Bound port (useful when started on port 0)
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for PresenceListener {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
