//! SD card clip playback helpers

pub mod card;
pub mod clips;

pub use card::{CardSession, CardState, CardStep, SD_FAST_KHZ, SD_INIT_KHZ};
pub use clips::{
    is_clip_name, ClipLibrary, ClipName, PlaybackTrigger, CLIP_DIR, MAX_CLIPS, SAMPLE_PERIOD_US,
    SAMPLE_RATE_HZ,
};
