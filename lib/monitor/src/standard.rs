use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Pixels per scanline, including horizontal blanking
const SCANLINE_LENGTH: u32 = 228;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    Display,
)]
/// Broadcast standards the monitor can lock to
pub enum VideoStandard {
    #[strum(to_string = "NTSC")]
    Ntsc,
    #[strum(to_string = "PAL")]
    Pal,
}

impl VideoStandard {
    pub const fn width(self) -> u32 {
        SCANLINE_LENGTH
    }

    pub const fn total_scanlines(self) -> u32 {
        match self {
            VideoStandard::Ntsc => 262,
            VideoStandard::Pal => 312,
        }
    }

    /// Nominal field rate in hertz
    pub const fn frame_rate(self) -> u32 {
        match self {
            VideoStandard::Ntsc => 60,
            VideoStandard::Pal => 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coordinate space every buffer and window lives in
///
/// Only ever built from a [`VideoStandard`], so width and height cannot drift apart from it
pub struct SignalGeometry {
    standard: VideoStandard,
}

impl SignalGeometry {
    pub const fn new(standard: VideoStandard) -> Self {
        Self { standard }
    }

    pub const fn standard(&self) -> VideoStandard {
        self.standard
    }

    pub const fn width(&self) -> u32 {
        self.standard.width()
    }

    pub const fn height(&self) -> u32 {
        self.standard.total_scanlines()
    }

    pub fn size(&self) -> Vector2<u32> {
        Vector2::new(self.width(), self.height())
    }
}

impl Default for SignalGeometry {
    fn default() -> Self {
        Self::new(VideoStandard::Ntsc)
    }
}
