//! One-shot ADC reads

use bunbot_hal::adc::AdcError;
use bunbot_hal::AnalogInput;
use esp_hal::analog::adc::{Adc, AdcChannel, AdcPin, RegisterAccess};
use esp_hal::Blocking;

/// ESP32 ADCs convert at 12 bits
pub const ADC_BITS: u8 = 12;

/// One ADC unit bound to one pin
pub struct EspAnalog<'d, ADCI, PIN> {
    adc: Adc<'d, ADCI, Blocking>,
    pin: AdcPin<PIN, ADCI>,
}

impl<'d, ADCI, PIN> EspAnalog<'d, ADCI, PIN> {
    pub fn new(adc: Adc<'d, ADCI, Blocking>, pin: AdcPin<PIN, ADCI>) -> Self {
        Self { adc, pin }
    }
}

impl<'d, ADCI, PIN> AnalogInput for EspAnalog<'d, ADCI, PIN>
where
    ADCI: RegisterAccess + 'd,
    PIN: AdcChannel,
{
    fn resolution_bits(&self) -> u8 {
        ADC_BITS
    }

    fn read_raw(&mut self) -> Result<u16, AdcError> {
        nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|_| AdcError::Conversion)
    }
}
