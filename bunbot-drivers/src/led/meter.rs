//! Plain sound level meter
//!
//! Used by the standalone sound demo: a running average with the noise
//! floor cut off and the rest doubled.

/// Noise floor subtracted from the averaged reading
pub const NOISE_FLOOR: i32 = 500;

const ADC_MAX: i32 = 4095;

/// Running-average level meter
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearMeter {
    smoothed: i32,
}

impl LinearMeter {
    pub const fn new() -> Self {
        Self { smoothed: 0 }
    }

    /// Averaged reading
    pub fn smoothed(&self) -> i32 {
        self.smoothed
    }

    /// Feed a raw 12-bit sample
    pub fn sample(&mut self, raw: u16) -> i32 {
        self.smoothed = (self.smoothed * 3 + i32::from(raw)) / 4;
        self.smoothed
    }

    /// Amplified level in `0..=4095`
    pub fn amplified(&self) -> i32 {
        ((self.smoothed - NOISE_FLOOR) * 2).clamp(0, ADC_MAX)
    }

    /// Lit bar length for a strip of `pixels`
    pub fn step(&self, pixels: usize) -> usize {
        let last = pixels.saturating_sub(1) as i32;
        (self.amplified() * last / ADC_MAX).clamp(0, last) as usize
    }
}
