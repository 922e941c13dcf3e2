//! Sound gauge for the Chef board
//!
//! Yelling at the toaster charges a gauge; silence slowly drains it. The
//! gauge lights the LED bar and, during toasting in audio mode, sets the
//! heater power (capped at 60%).

/// Smoothing factor for the microphone reading
pub const SOUND_ALPHA: f32 = 0.4;

/// Below this the gauge drains
pub const QUIET_THRESHOLD: f32 = 300.0;
/// At or above this the gauge charges at the normal rate
pub const ACTIVE_THRESHOLD: f32 = 400.0;
/// At or above this the gauge charges fast
pub const LOUD_THRESHOLD: f32 = 600.0;

pub const DRAIN_RATE: f32 = 0.002;
pub const CHARGE_RATE: f32 = 0.03;
pub const FAST_CHARGE_RATE: f32 = 0.06;

/// Heater duty at a full gauge (60% of 255)
pub const HEATER_CAP: u8 = 153;

/// Smoothing factor for the heater duty
pub const PWM_ALPHA: f32 = 0.1;

/// Charge/drain gauge driven by microphone samples
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundGauge {
    smoothed: f32,
    level: f32,
}

impl SoundGauge {
    pub const fn new() -> Self {
        Self {
            smoothed: 0.0,
            level: 0.0,
        }
    }

    /// Smoothed microphone reading
    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    /// Gauge level in `0.0..=1.0`
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Feed one raw ADC sample
    pub fn sample(&mut self, raw: u16) {
        self.smoothed = self.smoothed * (1.0 - SOUND_ALPHA) + f32::from(raw) * SOUND_ALPHA;

        let delta = if self.smoothed < QUIET_THRESHOLD {
            -DRAIN_RATE
        } else if self.smoothed >= LOUD_THRESHOLD {
            FAST_CHARGE_RATE
        } else if self.smoothed >= ACTIVE_THRESHOLD {
            CHARGE_RATE
        } else {
            CHARGE_RATE * 0.5
        };
        self.level = (self.level + delta).clamp(0.0, 1.0);
    }

    /// Lit bar length for a strip of `pixels`
    pub fn step(&self, pixels: usize) -> usize {
        let last = pixels.saturating_sub(1);
        ((self.level * last as f32) as usize).min(last)
    }

    /// Unsmoothed heater duty
    pub fn pwm_target(&self) -> u8 {
        ((self.level * f32::from(HEATER_CAP)) as u8).min(HEATER_CAP)
    }
}

/// First-order low-pass on a PWM duty
#[derive(Debug, Clone, Copy, Default)]
pub struct PwmSmoother {
    value: f32,
}

impl PwmSmoother {
    pub const fn new() -> Self {
        Self { value: 0.0 }
    }

    /// Move towards `target` and return the duty to write
    pub fn update(&mut self, target: u8) -> u8 {
        self.value = self.value * (1.0 - PWM_ALPHA) + f32::from(target) * PWM_ALPHA;
        self.value as u8
    }

    /// Current duty
    pub fn value(&self) -> u8 {
        self.value as u8
    }
}

/// Heater duty in audio mode: the smoothed gauge while toasting, else off
pub fn audio_heater_duty(toasting: bool, smoothed: u8) -> u8 {
    if toasting {
        smoothed
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_drains_to_zero() {
        let mut gauge = SoundGauge::new();
        for _ in 0..100 {
            gauge.sample(0);
        }
        assert_eq!(gauge.level(), 0.0);
        assert_eq!(gauge.step(16), 0);
    }

    #[test]
    fn test_loud_fills_and_clamps() {
        let mut gauge = SoundGauge::new();
        for _ in 0..100 {
            gauge.sample(4095);
        }
        assert_eq!(gauge.level(), 1.0);
        assert_eq!(gauge.step(16), 15);
        assert_eq!(gauge.pwm_target(), HEATER_CAP);
    }

    #[test]
    fn test_charge_rates() {
        // Let the EMA settle without filling the gauge, then measure one step
        let rate = |raw: u16| {
            let mut gauge = SoundGauge::new();
            for _ in 0..10 {
                gauge.sample(raw);
            }
            let before = gauge.level();
            gauge.sample(raw);
            gauge.level() - before
        };

        assert!((rate(350) - 0.015).abs() < 1e-4);
        assert!((rate(500) - CHARGE_RATE).abs() < 1e-4);
        assert!((rate(800) - FAST_CHARGE_RATE).abs() < 1e-4);
    }

    #[test]
    fn test_drain_rate() {
        let mut gauge = SoundGauge::new();
        for _ in 0..20 {
            gauge.sample(4095);
        }
        assert_eq!(gauge.level(), 1.0);

        // Walk the EMA down below the quiet threshold
        while gauge.smoothed() >= QUIET_THRESHOLD {
            gauge.sample(0);
        }
        let before = gauge.level();
        gauge.sample(0);
        assert!((before - gauge.level() - DRAIN_RATE).abs() < 1e-5);
    }

    #[test]
    fn test_pwm_smoother_converges() {
        let mut pwm = PwmSmoother::new();
        assert_eq!(pwm.update(100), 10);
        for _ in 0..200 {
            pwm.update(100);
        }
        assert!(pwm.value() >= 99);
    }

    #[test]
    fn test_small_targets_are_not_truncated_away() {
        let mut pwm = PwmSmoother::new();
        for _ in 0..100 {
            pwm.update(5);
        }
        assert_eq!(pwm.value(), 4);
    }

    #[test]
    fn test_audio_heater_duty() {
        assert_eq!(audio_heater_duty(true, 120), 120);
        assert_eq!(audio_heater_duty(false, 120), 0);
    }
}
