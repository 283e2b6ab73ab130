use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use strum::{Display, EnumIter};

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, EnumIter, Display, PartialEq, Eq, Hash, Default,
)]
/// CRT emulation mode the renderer is asked to apply
///
/// The monitor only cycles through these, what each one looks like is up to the renderer
pub enum CrtMode {
    #[default]
    #[strum(to_string = "CRT mode off")]
    Off,
    #[strum(to_string = "CRT mode 1")]
    Mode1,
    #[strum(to_string = "CRT mode 2")]
    Mode2,
    #[strum(to_string = "CRT mode 3")]
    Mode3,
    #[strum(to_string = "CRT mode 4")]
    Mode4,
}

impl CrtMode {
    /// The mode after this one, wrapping back to [`CrtMode::Off`]
    pub fn next(self) -> Self {
        match self {
            CrtMode::Off => CrtMode::Mode1,
            CrtMode::Mode1 => CrtMode::Mode2,
            CrtMode::Mode2 => CrtMode::Mode3,
            CrtMode::Mode3 => CrtMode::Mode4,
            CrtMode::Mode4 => CrtMode::Off,
        }
    }
}

#[serde_inline_default]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Crop window the monitor starts with and returns to on reset
///
/// Horizontal values are in pixels, vertical ones in percent of the signal height so they
/// survive a video standard switch
pub struct CropSettings {
    #[serde_inline_default(68)]
    /// Leftmost pixel shown
    pub origin_x: u32,
    #[serde_inline_default(12.4)]
    /// First line shown, in percent of the signal height
    pub origin_y_pct: f64,
    #[serde_inline_default(160)]
    /// Pixels shown per line
    pub width: u32,
    #[serde_inline_default(81.5)]
    /// Lines shown, in percent of the signal height
    pub height_pct: f64,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            origin_x: 68,
            origin_y_pct: 12.4,
            width: 160,
            height_pct: 81.5,
        }
    }
}

#[serde_inline_default]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Display scale defaults
pub struct ScaleSettings {
    #[serde_inline_default(4.0)]
    pub x: f32,
    #[serde_inline_default(2.0)]
    pub y: f32,
    #[serde_inline_default(2.0)]
    /// Horizontal to vertical ratio used when resizing uniformly
    pub aspect_x: f32,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            x: 4.0,
            y: 2.0,
            aspect_x: 2.0,
        }
    }
}
