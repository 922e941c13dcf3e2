//! GPIO wrappers

use bunbot_hal::{InputPin, OutputPin};
use esp_hal::gpio::{Input, Output};

/// Push-pull output
pub struct EspOutput<'d>(pub Output<'d>);

impl<'d> EspOutput<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self(pin)
    }
}

impl OutputPin for EspOutput<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Digital input
pub struct EspInput<'d>(pub Input<'d>);

impl<'d> EspInput<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self(pin)
    }

    /// Wait for any level change
    pub async fn wait_for_any_edge(&mut self) {
        self.0.wait_for_any_edge().await;
    }

    /// Borrow the pin for async edge waits
    pub fn inner(&mut self) -> &mut Input<'d> {
        &mut self.0
    }
}

impl InputPin for EspInput<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
