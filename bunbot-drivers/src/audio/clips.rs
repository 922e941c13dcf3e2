//! Clip library and playback trigger
//!
//! Clips are raw 8-bit unsigned samples at 16 kHz stored in the `audio`
//! directory of a FAT card. Each byte becomes one PWM duty on the speaker
//! pin.

use heapless::{String, Vec};

/// Directory holding the clips
pub const CLIP_DIR: &str = "AUDIO";

/// Most clips remembered from one directory scan
pub const MAX_CLIPS: usize = 32;

/// Playback sample rate
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Time between samples
pub const SAMPLE_PERIOD_US: u32 = 1_000_000 / SAMPLE_RATE_HZ;

/// Analog reading that starts a clip
pub const TRIGGER_THRESHOLD: u16 = 3100;

/// Minimum time between clips
pub const COOLDOWN_MS: u32 = 1500;

const CLIP_EXTENSIONS: [&str; 3] = ["wav", "raw", "pcm"];

/// An 8.3 file name such as `BURN.WAV`
pub type ClipName = String<12>;

/// Whether a file name looks like a playable clip
pub fn is_clip_name(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => CLIP_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
        _ => false,
    }
}

/// Clips found on the card
#[derive(Debug, Default)]
pub struct ClipLibrary {
    clips: Vec<ClipName, MAX_CLIPS>,
}

impl ClipLibrary {
    pub const fn new() -> Self {
        Self { clips: Vec::new() }
    }

    /// Forget all clips before a rescan
    pub fn clear(&mut self) {
        self.clips.clear();
    }

    /// Offer a directory entry
    ///
    /// Returns true if it was kept. Non-clips, names too long for 8.3 and
    /// entries beyond [`MAX_CLIPS`] are skipped.
    pub fn offer(&mut self, name: &str) -> bool {
        if !is_clip_name(name) {
            return false;
        }
        let Ok(owned) = ClipName::try_from(name) else {
            return false;
        };
        self.clips.push(owned).is_ok()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipName> {
        self.clips.iter()
    }

    /// Pick a clip from a random number
    pub fn pick(&self, random: u32) -> Option<&ClipName> {
        if self.clips.is_empty() {
            return None;
        }
        self.clips.get(random as usize % self.clips.len())
    }
}

/// Threshold trigger with a cooldown
#[derive(Debug, Clone, Copy)]
pub struct PlaybackTrigger {
    threshold: u16,
    cooldown_ms: u32,
    last_ms: Option<u32>,
}

impl PlaybackTrigger {
    pub const fn new(threshold: u16, cooldown_ms: u32) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_ms: None,
        }
    }

    /// Returns true when a clip should start
    pub fn update(&mut self, reading: u16, now_ms: u32) -> bool {
        if reading < self.threshold {
            return false;
        }
        let ready = match self.last_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) > self.cooldown_ms,
        };
        if ready {
            self.last_ms = Some(now_ms);
        }
        ready
    }
}

impl Default for PlaybackTrigger {
    fn default() -> Self {
        Self::new(TRIGGER_THRESHOLD, COOLDOWN_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_period() {
        assert_eq!(SAMPLE_PERIOD_US, 62);
    }

    #[test]
    fn test_clip_names() {
        assert!(is_clip_name("BURN.WAV"));
        assert!(is_clip_name("yell.raw"));
        assert!(is_clip_name("A.Pcm"));
        assert!(!is_clip_name("NOTES.TXT"));
        assert!(!is_clip_name("WAV"));
        assert!(!is_clip_name(".wav"));
    }

    #[test]
    fn test_library_filters_and_caps() {
        let mut lib = ClipLibrary::new();
        assert!(!lib.offer("README.TXT"));
        assert!(!lib.offer("WAY_TOO_LONG_NAME.WAV"));
        assert!(lib.offer("ONE.WAV"));
        assert_eq!(lib.len(), 1);

        lib.clear();
        for _ in 0..MAX_CLIPS {
            assert!(lib.offer("CLIP.RAW"));
        }
        assert!(!lib.offer("EXTRA.RAW"));
        assert_eq!(lib.len(), MAX_CLIPS);
    }

    #[test]
    fn test_pick() {
        let mut lib = ClipLibrary::new();
        assert_eq!(lib.pick(7), None);
        lib.offer("A.WAV");
        lib.offer("B.WAV");
        lib.offer("C.WAV");
        assert_eq!(lib.pick(0).map(|c| c.as_str()), Some("A.WAV"));
        assert_eq!(lib.pick(4).map(|c| c.as_str()), Some("B.WAV"));
        assert_eq!(lib.pick(u32::MAX).map(|c| c.as_str()), Some("A.WAV"));
    }

    #[test]
    fn test_trigger_threshold_and_cooldown() {
        let mut trigger = PlaybackTrigger::default();
        assert!(!trigger.update(3099, 0));
        assert!(trigger.update(3100, 10));
        assert!(!trigger.update(4000, 1510));
        assert!(trigger.update(4000, 1511));
    }
}
