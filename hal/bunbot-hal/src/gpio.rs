//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Toggle the pin state
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePin(bool);

    impl OutputPin for FakePin {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_toggle_flips_state() {
        let mut pin = FakePin(false);
        pin.toggle();
        assert!(pin.is_set_high());
        pin.toggle();
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_set_state() {
        let mut pin = FakePin(false);
        pin.set_state(true);
        assert!(pin.0);
        pin.set_state(false);
        assert!(!pin.0);
    }
}
