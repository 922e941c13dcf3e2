//! HC-SR04 ultrasonic proximity trigger
//!
//! The sensor reports distance as the length of an echo pulse. Sound takes
//! about 58 µs to travel one centimetre and back.

/// Longest echo waited for; a timeout reads as 0 cm
pub const ECHO_TIMEOUT_US: u32 = 30_000;

/// Microseconds of echo per centimetre of distance
pub const US_PER_CM: u32 = 58;

/// Distance below which something counts as near
pub const NEAR_CM: u32 = 20;

/// Minimum time between triggers
pub const COOLDOWN_MS: u32 = 2000;

/// Distance for an echo pulse length
pub fn echo_to_cm(echo_us: u32) -> u32 {
    echo_us / US_PER_CM
}

/// Whether a reading is a valid near object
///
/// A zero reading means no echo and never counts.
pub fn is_near(cm: u32) -> bool {
    cm > 0 && cm < NEAR_CM
}

/// Outcome of one proximity sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerDecision {
    /// Nothing new
    None,
    /// Object arrived, send the trigger
    Fire,
    /// Object arrived during the cooldown
    CooledDown,
}

/// Edge-triggered proximity detector with a cooldown
#[derive(Debug, Clone, Copy)]
pub struct ProximityTrigger {
    cooldown_ms: u32,
    was_near: bool,
    last_fire_ms: Option<u32>,
}

impl ProximityTrigger {
    pub const fn new(cooldown_ms: u32) -> Self {
        Self {
            cooldown_ms,
            was_near: false,
            last_fire_ms: None,
        }
    }

    /// Feed one sample
    pub fn update(&mut self, near: bool, now_ms: u32) -> TriggerDecision {
        let arrived = near && !self.was_near;
        self.was_near = near;
        if !arrived {
            return TriggerDecision::None;
        }

        let ready = match self.last_fire_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.cooldown_ms,
        };
        if ready {
            self.last_fire_ms = Some(now_ms);
            TriggerDecision::Fire
        } else {
            TriggerDecision::CooledDown
        }
    }
}

impl Default for ProximityTrigger {
    fn default() -> Self {
        Self::new(COOLDOWN_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_to_cm() {
        assert_eq!(echo_to_cm(0), 0);
        assert_eq!(echo_to_cm(580), 10);
        assert_eq!(echo_to_cm(ECHO_TIMEOUT_US), 517);
    }

    #[test]
    fn test_is_near() {
        assert!(!is_near(0));
        assert!(is_near(1));
        assert!(is_near(19));
        assert!(!is_near(20));
    }

    #[test]
    fn test_fires_on_arrival_only() {
        let mut trigger = ProximityTrigger::default();
        assert_eq!(trigger.update(true, 100), TriggerDecision::Fire);
        assert_eq!(trigger.update(true, 150), TriggerDecision::None);
        assert_eq!(trigger.update(false, 200), TriggerDecision::None);
    }

    #[test]
    fn test_cooldown() {
        let mut trigger = ProximityTrigger::default();
        assert_eq!(trigger.update(true, 0), TriggerDecision::Fire);
        trigger.update(false, 50);
        assert_eq!(trigger.update(true, 1000), TriggerDecision::CooledDown);
        trigger.update(false, 1050);
        assert_eq!(trigger.update(true, 2000), TriggerDecision::Fire);
    }

    #[test]
    fn test_cooldown_across_wraparound() {
        let mut trigger = ProximityTrigger::default();
        assert_eq!(trigger.update(true, u32::MAX - 500), TriggerDecision::Fire);
        trigger.update(false, u32::MAX - 400);
        assert_eq!(trigger.update(true, 1000), TriggerDecision::CooledDown);
        trigger.update(false, 1100);
        assert_eq!(trigger.update(true, 1600), TriggerDecision::Fire);
    }
}
