//! SD card session tracking
//!
//! Decides what a trigger has to do with the card before a clip can play:
//! nothing, a first mount, or a full re-initialisation after the card was
//! lost. SPI runs at [`SD_INIT_KHZ`] while the card initialises and at
//! [`SD_FAST_KHZ`] once a volume is open.

/// SD cards must be initialised at 400 kHz or less
pub const SD_INIT_KHZ: u32 = 400;

/// Bus speed for reading clips; one 512-byte block takes about 200 µs
pub const SD_FAST_KHZ: u32 = 20_000;

/// Card state as seen by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardState {
    /// Never mounted since boot
    Fresh,
    /// Volume opened, bus at full speed
    Mounted,
    /// A mount or read failed; the card must be initialised again
    Lost,
}

/// What to do with the card before playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardStep {
    /// Card is ready
    Play,
    /// Slow the bus down and mount
    Mount,
    /// Slow the bus down, forget the card's init state, then mount
    Reinit,
}

/// Tracks the card across mounts and failures
#[derive(Debug, Clone, Copy)]
pub struct CardSession {
    state: CardState,
}

impl Default for CardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSession {
    pub const fn new() -> Self {
        Self {
            state: CardState::Fresh,
        }
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.state == CardState::Mounted
    }

    /// Step needed before the next clip
    pub fn next_step(&self) -> CardStep {
        match self.state {
            CardState::Fresh => CardStep::Mount,
            CardState::Mounted => CardStep::Play,
            CardState::Lost => CardStep::Reinit,
        }
    }

    /// SPI clock for the current state: slow until a volume is open
    pub fn bus_khz(&self) -> u32 {
        match self.state {
            CardState::Mounted => SD_FAST_KHZ,
            CardState::Fresh | CardState::Lost => SD_INIT_KHZ,
        }
    }

    /// The volume opened; the bus may run at full speed
    pub fn mounted(&mut self) {
        self.state = CardState::Mounted;
    }

    /// A mount or playback failed
    pub fn failed(&mut self) {
        self.state = CardState::Lost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_trigger_mounts() {
        let session = CardSession::new();
        assert_eq!(session.state(), CardState::Fresh);
        assert_eq!(session.next_step(), CardStep::Mount);
        assert!(!session.is_mounted());
    }

    #[test]
    fn test_mounted_card_plays() {
        let mut session = CardSession::new();
        session.mounted();
        assert_eq!(session.next_step(), CardStep::Play);
        assert!(session.is_mounted());
    }

    #[test]
    fn test_playback_failure_reinitialises() {
        let mut session = CardSession::new();
        session.mounted();
        session.failed();
        assert_eq!(session.next_step(), CardStep::Reinit);
        assert!(!session.is_mounted());
    }

    #[test]
    fn test_bus_fast_only_while_mounted() {
        let mut session = CardSession::new();
        assert_eq!(session.bus_khz(), SD_INIT_KHZ);
        session.mounted();
        assert_eq!(session.bus_khz(), SD_FAST_KHZ);
        assert!(session.bus_khz() >= 4_000);
        session.failed();
        assert_eq!(session.bus_khz(), SD_INIT_KHZ);
    }

    #[test]
    fn test_failed_mount_keeps_reinitialising() {
        let mut session = CardSession::new();
        session.failed();
        assert_eq!(session.next_step(), CardStep::Reinit);
        session.failed();
        assert_eq!(session.next_step(), CardStep::Reinit);
        session.mounted();
        assert_eq!(session.next_step(), CardStep::Play);
    }
}
