//! PWM output abstractions
//!
//! A PWM output is a single channel with a fixed resolution. Duty values
//! are raw counts in `0..=max_duty()`, so an 8-bit channel takes 0-255 the
//! same way `ledcWrite` does.

/// Errors reported by PWM outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Duty value larger than the channel resolution allows
    DutyOutOfRange,
    /// Peripheral rejected the update
    Hardware,
}

/// Single PWM channel
pub trait PwmOutput {
    /// Largest duty count (255 for 8-bit resolution)
    fn max_duty(&self) -> u32;

    /// Set the raw duty count
    fn set_duty(&mut self, duty: u32) -> Result<(), PwmError>;

    /// Current raw duty count
    fn duty(&self) -> u32;

    /// Set the output fully off
    fn off(&mut self) -> Result<(), PwmError> {
        self.set_duty(0)
    }
}

/// Number of counts for a resolution in bits (8 -> 255)
pub const fn max_duty_for_bits(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_duty_for_bits() {
        assert_eq!(max_duty_for_bits(8), 255);
        assert_eq!(max_duty_for_bits(14), 16383);
        assert_eq!(max_duty_for_bits(1), 1);
    }
}
