//! Microphone level metering

use crossbeam_channel::{bounded, Receiver, Sender};

/// Root-mean-square of a block of samples, clamped to [0, 1]
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt().clamp(0.0, 1.0)
}

/// Holds the most recent level reported by the input stream.
///
/// The input callback sends one value per block; the tick reads whatever
/// arrived last and keeps the previous value when nothing new came in.
pub struct LevelMeter {
    rx: Receiver<f32>,
    latest: f32,
}

impl LevelMeter {
    /// Meter plus the sender handed to the input stream
    pub fn new() -> (Self, Sender<f32>) {
        let (tx, rx) = bounded(64);
        (Self { rx, latest: 0.0 }, tx)
    }

    /// Drain pending blocks and return the newest level
    pub fn poll(&mut self) -> f32 {
        while let Ok(level) = self.rx.try_recv() {
            self.latest = level;
        }
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert_eq!(rms_level(&[]), 0.0);
        assert!((rms_level(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(rms_level(&[4.0, 4.0]), 1.0);
    }

    #[test]
    fn test_meter_keeps_latest() {
        let (mut meter, tx) = LevelMeter::new();
        assert_eq!(meter.poll(), 0.0);
        tx.send(0.2).unwrap();
        tx.send(0.4).unwrap();
        assert_eq!(meter.poll(), 0.4);
        assert_eq!(meter.poll(), 0.4);
    }
}
