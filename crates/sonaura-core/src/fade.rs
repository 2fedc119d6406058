//! Filter cutoff sweep
//!
//! The cutoff moves toward `max_freq` while fading in and toward `min_freq`
//! while fading out, covering a fixed fraction of the remaining distance per
//! tick. It turns around once it is within `tolerance` of the bound it is
//! approaching. The sweep knows nothing about audio modes; the session decides
//! which filter receives the value.

use crate::config::FadeConfig;
use crate::Result;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FadeDirection {
    /// Toward `max_freq`
    In,
    /// Toward `min_freq`
    Out,
}

/// Snapshot of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeState {
    /// Cutoff applied this tick (Hz)
    pub current_freq: f32,
    /// Lower bound (Hz)
    pub min_freq: f32,
    /// Upper bound (Hz)
    pub max_freq: f32,
    /// Interpolation factor per tick
    pub fade_speed: f32,
    /// Bound being approached
    pub direction: FadeDirection,
}

/// Oscillating cutoff generator with optional randomization
#[derive(Debug, Clone)]
pub struct FilterFadeOscillator {
    state: FadeState,
    config: FadeConfig,
    ticks: u64,
    rng: StdRng,
}

impl FilterFadeOscillator {
    /// Draw initial bounds and start fading in from `min_freq`
    pub fn new(config: FadeConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let (min_freq, max_freq) = draw_bounds(&config, &mut rng);
        Ok(Self {
            state: FadeState {
                current_freq: min_freq,
                min_freq,
                max_freq,
                fade_speed: config.initial_speed,
                direction: FadeDirection::In,
            },
            config,
            ticks: 0,
            rng,
        })
    }

    /// Start from explicit bounds. `min_freq` must be below `max_freq`.
    pub fn with_bounds(
        config: FadeConfig,
        rng: StdRng,
        min_freq: f32,
        max_freq: f32,
    ) -> Result<Self> {
        if min_freq.partial_cmp(&max_freq) != Some(std::cmp::Ordering::Less) {
            return Err(crate::CoreError::InvalidConfig(format!(
                "fade bounds must be ordered: {} >= {}",
                min_freq, max_freq
            )));
        }
        let mut osc = Self::new(config, rng)?;
        osc.state.min_freq = min_freq;
        osc.state.max_freq = max_freq;
        osc.state.current_freq = min_freq;
        Ok(osc)
    }

    /// Advance one tick and return the new cutoff
    pub fn tick(&mut self) -> f32 {
        self.ticks += 1;

        if self.config.randomize_speed && self.ticks % self.config.speed_redraw_interval == 0 {
            let (lo, hi) = self.config.speed_range;
            self.state.fade_speed = self.rng.random_range(lo..=hi);
            trace!("Fade speed redrawn: {:.3}", self.state.fade_speed);
        }

        let tolerance = self.config.tolerance;
        let state = &mut self.state;
        match state.direction {
            FadeDirection::In => {
                state.current_freq += (state.max_freq - state.current_freq) * state.fade_speed;
                if state.current_freq >= state.max_freq - tolerance {
                    self.turn_out();
                }
            }
            FadeDirection::Out => {
                state.current_freq += (state.min_freq - state.current_freq) * state.fade_speed;
                if state.current_freq <= state.min_freq + tolerance {
                    state.direction = FadeDirection::In;
                }
            }
        }

        self.state.current_freq
    }

    /// Force the sweep direction, e.g. after an audio mode change
    pub fn set_direction(&mut self, direction: FadeDirection) {
        match (self.state.direction, direction) {
            (FadeDirection::In, FadeDirection::Out) => self.turn_out(),
            _ => self.state.direction = direction,
        }
    }

    fn turn_out(&mut self) {
        self.state.direction = FadeDirection::Out;
        if self.config.randomize_bounds {
            let (min_freq, max_freq) = draw_bounds(&self.config, &mut self.rng);
            self.state.min_freq = min_freq;
            self.state.max_freq = max_freq;
            self.state.current_freq = self.state.current_freq.clamp(min_freq, max_freq);
            trace!("Fade bounds redrawn: {:.0}-{:.0} Hz", min_freq, max_freq);
        }
    }

    /// Current snapshot
    pub fn state(&self) -> &FadeState {
        &self.state
    }

    /// Overshoot tolerance (Hz)
    pub fn tolerance(&self) -> f32 {
        self.config.tolerance
    }

    /// Ticks processed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// `min` from the configured range, `max` at least `minimum_span` above it
fn draw_bounds(config: &FadeConfig, rng: &mut StdRng) -> (f32, f32) {
    let (lo, hi) = config.min_freq_range;
    let min_freq = rng.random_range(lo..=hi);
    let max_freq = rng.random_range((min_freq + config.minimum_span)..=config.max_freq_ceiling);
    (min_freq, max_freq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn oscillator(config: FadeConfig) -> FilterFadeOscillator {
        FilterFadeOscillator::new(config, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_initial_bounds_follow_rule() {
        for seed in 0..50 {
            let osc =
                FilterFadeOscillator::new(FadeConfig::default(), StdRng::seed_from_u64(seed))
                    .unwrap();
            let s = osc.state();
            assert!(s.min_freq >= 200.0 && s.min_freq <= 800.0);
            assert!(s.max_freq >= s.min_freq + 400.0 && s.max_freq <= 2000.0);
            assert_eq!(s.current_freq, s.min_freq);
            assert_eq!(s.direction, FadeDirection::In);
        }
    }

    #[test]
    fn test_exponential_step_and_turnaround() {
        let config = FadeConfig {
            initial_speed: 0.5,
            ..Default::default()
        };
        let mut osc =
            FilterFadeOscillator::with_bounds(config, StdRng::seed_from_u64(1), 200.0, 1000.0)
                .unwrap();

        assert_eq!(osc.tick(), 600.0);
        assert_eq!(osc.tick(), 800.0);

        let mut ticks = 0;
        while osc.state().direction == FadeDirection::In {
            osc.tick();
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(osc.state().current_freq >= 990.0);

        while osc.state().direction == FadeDirection::Out {
            osc.tick();
        }
        assert!(osc.state().current_freq <= 210.0);
    }

    #[test]
    fn test_speed_redraw_interval() {
        let config = FadeConfig {
            randomize_speed: true,
            speed_redraw_interval: 10,
            ..Default::default()
        };
        let mut osc = oscillator(config);
        for _ in 0..9 {
            osc.tick();
        }
        assert_eq!(osc.state().fade_speed, 0.01);
        osc.tick();
        let speed = osc.state().fade_speed;
        assert!((0.05..=0.1).contains(&speed));
    }

    #[test]
    fn test_bounds_redrawn_on_turn_out() {
        let config = FadeConfig {
            randomize_bounds: true,
            initial_speed: 0.3,
            ..Default::default()
        };
        let mut osc = oscillator(config);
        let before = *osc.state();
        while osc.state().direction == FadeDirection::In {
            osc.tick();
        }
        let after = *osc.state();
        assert!(after.max_freq >= after.min_freq + 400.0);
        assert!(after.current_freq >= after.min_freq && after.current_freq <= after.max_freq);
        assert!(before.min_freq != after.min_freq || before.max_freq != after.max_freq);
    }

    #[test]
    fn test_set_direction() {
        let mut osc = oscillator(FadeConfig::default());
        osc.set_direction(FadeDirection::Out);
        assert_eq!(osc.state().direction, FadeDirection::Out);
        osc.set_direction(FadeDirection::In);
        assert_eq!(osc.state().direction, FadeDirection::In);
    }

    #[test]
    fn test_rejects_unordered_bounds() {
        let result = FilterFadeOscillator::with_bounds(
            FadeConfig::default(),
            StdRng::seed_from_u64(1),
            900.0,
            900.0,
        );
        assert!(result.is_err());
    }
}
