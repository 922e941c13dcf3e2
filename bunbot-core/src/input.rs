//! Button input
//!
//! The Chef's start button is active-low and read on every edge. An edge
//! closer than `debounce_ms` to the last accepted edge is bounce; a press
//! counts when the button is released after being held `min_press_ms`.

use crate::config::ButtonConfig;

/// Debounced press detector fed from edge interrupts
#[derive(Debug, Clone)]
pub struct PressDetector {
    config: ButtonConfig,
    last_edge_ms: Option<u32>,
    press_start_ms: u32,
    pressed: bool,
    registered: bool,
}

impl PressDetector {
    /// Create a detector with the button released
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            last_edge_ms: None,
            press_start_ms: 0,
            pressed: false,
            registered: false,
        }
    }

    /// Check if the button is currently held
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed an edge; `level_high` is the pin level after the edge
    pub fn on_edge(&mut self, level_high: bool, now_ms: u32) {
        if let Some(last) = self.last_edge_ms {
            if now_ms.wrapping_sub(last) < self.config.debounce_ms {
                return;
            }
        }
        self.last_edge_ms = Some(now_ms);

        if !level_high {
            self.press_start_ms = now_ms;
            self.pressed = true;
        } else {
            let held = now_ms.wrapping_sub(self.press_start_ms);
            if self.pressed && held >= self.config.min_press_ms {
                self.registered = true;
            }
            self.pressed = false;
        }
    }

    /// Consume a registered press
    pub fn take_press(&mut self) -> bool {
        core::mem::take(&mut self.registered)
    }
}

/// Rising-edge detector for polled inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    /// Create a detector that treats the input as initially low
    pub const fn new() -> Self {
        Self { previous: false }
    }

    /// Feed the current level; returns true on a low-to-high change
    pub fn rising(&mut self, level: bool) -> bool {
        let edge = level && !self.previous;
        self.previous = level;
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PressDetector {
        PressDetector::new(ButtonConfig::default())
    }

    #[test]
    fn test_long_press_registers() {
        let mut det = detector();
        det.on_edge(false, 1000);
        assert!(det.is_pressed());
        det.on_edge(true, 1250);
        assert!(!det.is_pressed());
        assert!(det.take_press());
        // Consumed
        assert!(!det.take_press());
    }

    #[test]
    fn test_short_press_ignored() {
        let mut det = detector();
        det.on_edge(false, 1000);
        det.on_edge(true, 1150);
        assert!(!det.take_press());
    }

    #[test]
    fn test_bounce_ignored() {
        let mut det = detector();
        det.on_edge(false, 1000);
        // Bounce inside the debounce window
        det.on_edge(true, 1020);
        det.on_edge(false, 1040);
        assert!(det.is_pressed());
        det.on_edge(true, 1300);
        assert!(det.take_press());
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut det = detector();
        det.on_edge(true, 5000);
        assert!(!det.take_press());
    }

    #[test]
    fn test_exact_minimum_counts() {
        let mut det = detector();
        det.on_edge(false, 0);
        det.on_edge(true, 200);
        assert!(det.take_press());
    }

    #[test]
    fn test_rising_edge() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.rising(false));
        assert!(edge.rising(true));
        assert!(!edge.rising(true));
        assert!(!edge.rising(false));
        assert!(edge.rising(true));
    }
}
