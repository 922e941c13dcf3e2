//! DS positional gate servos
//!
//! The front gates hold each bun with a DS servo. Each gate has an open
//! and a closed angle; a "bounce" drops the bun by opening, pausing and
//! closing again.

use bunbot_core::state::Gate;
use bunbot_core::traits::{AngleServo, ServoError};
use bunbot_hal::ServoOutput;
use embedded_hal_async::delay::DelayNs;

use super::PositionalServo;

/// Time a gate stays at each end of a bounce
pub const BOUNCE_MOVE_MS: u32 = 500;

/// Open and closed angles for one gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatePresets {
    pub closed: i16,
    pub open: i16,
}

/// Top bun gate (servo OUT1)
pub const TOP_BUN: GatePresets = GatePresets {
    closed: 170,
    open: 80,
};

/// Bottom bun gate (servo OUT2)
pub const BOTTOM_BUN: GatePresets = GatePresets {
    closed: 90,
    open: 0,
};

impl GatePresets {
    /// Presets for a front gate
    pub const fn for_gate(gate: Gate) -> Self {
        match gate {
            Gate::One => TOP_BUN,
            Gate::Two => BOTTOM_BUN,
        }
    }
}

impl<S: ServoOutput> PositionalServo<S> {
    /// Move to the closed preset
    pub fn close(&mut self, presets: GatePresets) -> Result<(), ServoError> {
        self.set_angle(presets.closed)
    }

    /// Move to the open preset
    pub fn open(&mut self, presets: GatePresets) -> Result<(), ServoError> {
        self.set_angle(presets.open)
    }

    /// Open, wait `pause_ms`, then close
    pub async fn bounce<D: DelayNs>(
        &mut self,
        delay: &mut D,
        presets: GatePresets,
        pause_ms: u32,
    ) -> Result<(), ServoError> {
        self.hold(delay, presets.open, BOUNCE_MOVE_MS).await?;
        delay.delay_ms(pause_ms).await;
        self.hold(delay, presets.closed, BOUNCE_MOVE_MS).await
    }
}
