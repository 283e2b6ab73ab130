use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;

#[serde_inline_default]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// Frame boundary tolerances
pub struct SyncSettings {
    #[serde_inline_default(2)]
    /// Consecutive vsync lines needed before a frame end is believed
    pub vsync_debounce: u8,
    #[serde_inline_default(10)]
    /// Lines a frame may run short or long before it is considered ragged
    pub overflow_tolerance: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            vsync_debounce: 2,
            overflow_tolerance: 10,
        }
    }
}

#[serde_inline_default]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// Video standard detection thresholds
pub struct DetectionSettings {
    #[serde_inline_default(250)]
    /// Frames shorter than this are acquisition garbage
    pub min_lines: u32,
    #[serde_inline_default(325)]
    /// Frames longer than this are acquisition garbage
    pub max_lines: u32,
    #[serde_inline_default(4)]
    /// Valid frames averaged before deciding
    pub sample_frames: u32,
    #[serde_inline_default(290)]
    /// Average line counts at or above this are PAL
    pub pal_threshold: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_lines: 250,
            max_lines: 325,
            sample_frames: 4,
            pal_threshold: 290,
        }
    }
}
