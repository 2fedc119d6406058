//! WAV decoding

use crate::{CoreError, Result};
use std::path::Path;
use tracing::info;

/// Decoded track, interleaved f32 samples
#[derive(Debug, Clone, PartialEq)]
pub struct TrackBuffer {
    /// File stem, used in logs
    pub name: String,
    /// Interleaved samples in [-1, 1]
    pub samples: Vec<f32>,
    /// Interleaved channel count
    pub channels: usize,
    /// Native sample rate
    pub sample_rate: u32,
}

impl TrackBuffer {
    /// Number of frames
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    /// Duration in seconds at the native rate
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }
}

/// Decode a WAV file to f32
pub fn load_wav(path: &Path) -> Result<TrackBuffer> {
    let track_err = |source: hound::Error| CoreError::TrackLoad {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = hound::WavReader::open(path).map_err(track_err)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(track_err)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(track_err)?
        }
    };

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let buffer = TrackBuffer {
        name,
        samples,
        channels: spec.channels as usize,
        sample_rate: spec.sample_rate,
    };
    info!(
        "Loaded track '{}' ({} ch, {} Hz, {:.1}s)",
        buffer.name,
        buffer.channels,
        buffer.sample_rate,
        buffer.duration_secs()
    );
    Ok(buffer)
}
