//! Analog input abstractions

/// Errors that can occur during an analog read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete
    Conversion,
}

/// One-shot analog input
///
/// Takes `&mut self` because ADC reads typically require mutable access.
pub trait AnalogInput {
    /// Resolution of a raw reading in bits (12 on the ESP32)
    fn resolution_bits(&self) -> u8;

    /// Read a raw sample in `0..(1 << resolution_bits)`
    fn read_raw(&mut self) -> Result<u16, AdcError>;

    /// Read a sample scaled down to 8 bits
    fn read_u8(&mut self) -> Result<u8, AdcError> {
        let shift = self.resolution_bits().saturating_sub(8);
        self.read_raw().map(|raw| (raw >> shift).min(255) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u16);

    impl AnalogInput for Fixed {
        fn resolution_bits(&self) -> u8 {
            12
        }

        fn read_raw(&mut self) -> Result<u16, AdcError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_read_u8_divides_by_sixteen() {
        assert_eq!(Fixed(4095).read_u8(), Ok(255));
        assert_eq!(Fixed(160).read_u8(), Ok(10));
        assert_eq!(Fixed(0).read_u8(), Ok(0));
    }
}
