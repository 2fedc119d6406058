//! Resonant low-pass filter sinks

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz};
use serde::{Deserialize, Serialize};

/// Lowest cutoff accepted by the filter (Hz)
const MIN_CUTOFF_HZ: f32 = 10.0;

/// Static parameters of a filter sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Cutoff frequency (Hz)
    pub cutoff_hz: f32,
    /// Resonance peak in dB
    pub resonance_db: f32,
    /// Output gain applied after filtering
    pub gain: f32,
}

impl FilterSettings {
    /// Resonance as a biquad Q factor
    pub fn q(&self) -> f32 {
        10f32.powf(self.resonance_db / 20.0).max(0.1)
    }
}

/// One channel of a biquad low-pass with output gain
pub struct LowPassFilter {
    filter: DirectForm2Transposed<f32>,
    sample_rate: f32,
    cutoff_hz: f32,
    q: f32,
    gain: f32,
}

impl LowPassFilter {
    /// Create a filter for the given output sample rate
    pub fn new(settings: &FilterSettings, sample_rate: f32) -> Self {
        let q = settings.q();
        let cutoff_hz = clamp_cutoff(settings.cutoff_hz, sample_rate);
        let coeffs = coefficients(sample_rate, cutoff_hz, q).unwrap_or_else(passthrough);
        Self {
            filter: DirectForm2Transposed::<f32>::new(coeffs),
            sample_rate,
            cutoff_hz,
            q,
            gain: settings.gain,
        }
    }

    /// Replace resonance and gain and move the cutoff
    pub fn configure(&mut self, settings: &FilterSettings) {
        self.q = settings.q();
        self.gain = settings.gain;
        self.cutoff_hz = -1.0;
        self.set_cutoff(settings.cutoff_hz);
    }

    /// Move the cutoff. Unchanged values are ignored.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff_hz = clamp_cutoff(cutoff_hz, self.sample_rate);
        if (cutoff_hz - self.cutoff_hz).abs() < f32::EPSILON {
            return;
        }
        if let Ok(coeffs) = coefficients(self.sample_rate, cutoff_hz, self.q) {
            self.filter.update_coefficients(coeffs);
            self.cutoff_hz = cutoff_hz;
        }
    }

    /// Filter one sample
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.filter.run(sample) * self.gain
    }

    /// Current cutoff (Hz)
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }
}

fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    cutoff_hz.clamp(MIN_CUTOFF_HZ, sample_rate * 0.49)
}

fn coefficients(
    sample_rate: f32,
    cutoff_hz: f32,
    q: f32,
) -> Result<Coefficients<f32>, biquad::Errors> {
    Coefficients::<f32>::from_params(biquad::Type::LowPass, sample_rate.hz(), cutoff_hz.hz(), q)
}

fn passthrough(_: biquad::Errors) -> Coefficients<f32> {
    Coefficients {
        a1: 0.0,
        a2: 0.0,
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
    }
}
