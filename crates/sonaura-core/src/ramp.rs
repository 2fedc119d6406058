//! Exponential volume ramp

/// Scalar that approaches a target by a fixed fraction every tick
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRamp {
    current: f32,
    target: f32,
    rate: f32,
}

impl VolumeRamp {
    /// Silent ramp with the given per-tick rate in (0, 1]
    pub fn new(rate: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            rate: rate.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Set the level to approach, clamped to [0, 1]
    pub fn set_target(&mut self, target: f32) {
        self.target = target.clamp(0.0, 1.0);
    }

    /// Advance one tick and return the new level
    pub fn step(&mut self) -> f32 {
        self.current += (self.target - self.current) * self.rate;
        self.current
    }

    /// Current level
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Level being approached
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Per-tick interpolation factor
    pub fn rate(&self) -> f32 {
        self.rate
    }
}
