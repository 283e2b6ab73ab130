//! Settings for the crtmon monitor
//!
//! Everything here is read once when a monitor is constructed

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use std::io::{Read, Write};

pub use graphics::{CropSettings, CrtMode, ScaleSettings};
pub use signal::{DetectionSettings, SyncSettings};

pub mod graphics;
pub mod signal;

/// Refresh rate of the on demand mode's timeout, in hertz
pub const ON_DEMAND_REFERENCE_RATE: f64 = 60.0;

#[serde_inline_default]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Monitor settings
///
/// The canonical on-disk representation for this config is RON
pub struct MonitorSettings {
    #[serde_inline_default(-1.0)]
    /// Presentation rate in hertz
    ///
    /// Negative values present whenever a frame completes instead of on a fixed period
    pub refresh_rate: f64,
    #[serde(default)]
    /// Default crop window
    pub crop: CropSettings,
    #[serde(default)]
    /// Default display scale
    pub scale: ScaleSettings,
    #[serde(default)]
    /// Vsync debounce and overflow tolerance
    pub sync: SyncSettings,
    #[serde(default)]
    /// Video standard detection thresholds
    pub detection: DetectionSettings,
    #[serde_inline_default(160)]
    /// How many presentations an on screen message survives
    pub osd_frames: u32,
    #[serde(default)]
    /// Ignore commands that would resize the display
    pub fixed_size: bool,
    #[serde(default)]
    /// Initial CRT mode
    pub crt_mode: CrtMode,
    #[serde(default)]
    /// Initial state of the renderer's smoothing filter
    pub filtering: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            refresh_rate: -1.0,
            crop: CropSettings::default(),
            scale: ScaleSettings::default(),
            sync: SyncSettings::default(),
            detection: DetectionSettings::default(),
            osd_frames: 160,
            fixed_size: false,
            crt_mode: CrtMode::default(),
            filtering: false,
        }
    }
}

impl MonitorSettings {
    /// Store the config
    pub fn save(&self, writer: impl Write) -> Result<(), ron::Error> {
        ron::Options::default().to_io_writer_pretty(writer, self, PrettyConfig::new())
    }

    /// Load the config
    pub fn load(reader: impl Read) -> Result<Self, ron::Error> {
        Ok(ron::de::from_reader(reader)?)
    }
}
