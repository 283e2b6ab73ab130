use crate::standard::SignalGeometry;
use crtmon_config::{CropSettings, ScaleSettings};
use nalgebra::Vector2;

/// Narrowest window allowed, in pixels
pub const MIN_WIDTH: u32 = 10;
/// Shortest window allowed, in percent of the signal height
pub const MIN_HEIGHT_PCT: f64 = 10.0;

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn percent_of(percent: f64, total: u32) -> u32 {
    (percent / 100.0 * total as f64) as u32
}

#[derive(Debug, Clone, PartialEq)]
/// Part of the raw signal that ends up in the displayed frame
///
/// Horizontal values are kept in pixels and vertical ones in percent of the signal height,
/// the vertical pixel values are recomputed on every read. Every setter clamps so the window
/// always lies inside the signal
pub struct CropWindow {
    geometry: SignalGeometry,
    origin_x: u32,
    origin_y_pct: f64,
    width: u32,
    height_pct: f64,
}

impl CropWindow {
    pub fn new(geometry: SignalGeometry, defaults: &CropSettings) -> Self {
        let mut window = Self {
            geometry,
            origin_x: 0,
            origin_y_pct: 0.0,
            width: geometry.width(),
            height_pct: 100.0,
        };

        window.recenter_defaults(defaults);
        window
    }

    /// Resize, moving the origin back inside the signal if needed
    pub fn set_size(&mut self, width: i64, height_pct: f64) {
        self.width = width.clamp(MIN_WIDTH as i64, self.geometry.width() as i64) as u32;
        self.height_pct = clamp_f64(height_pct, MIN_HEIGHT_PCT, 100.0);

        self.set_origin(self.origin_x as i64, self.origin_y_pct);
    }

    /// Move the window, stopping at the signal edges
    pub fn set_origin(&mut self, x: i64, y_pct: f64) {
        let max_x = self.geometry.width() - self.width;
        self.origin_x = x.clamp(0, max_x as i64) as u32;

        let signal_height = self.geometry.height() as f64;
        let max_y_pct = (signal_height - self.height() as f64) / signal_height * 100.0;
        self.origin_y_pct = clamp_f64(y_pct, 0.0, max_y_pct);
    }

    pub fn recenter_defaults(&mut self, defaults: &CropSettings) {
        self.set_size(defaults.width as i64, defaults.height_pct);
        self.set_origin(defaults.origin_x as i64, defaults.origin_y_pct);
    }

    /// Adopt a new signal geometry, keeping the percentages
    pub fn set_geometry(&mut self, geometry: SignalGeometry) {
        self.geometry = geometry;
        self.set_size(self.width as i64, self.height_pct);
    }

    pub fn geometry(&self) -> SignalGeometry {
        self.geometry
    }

    pub fn origin_x(&self) -> u32 {
        self.origin_x
    }

    pub fn origin_y_pct(&self) -> f64 {
        self.origin_y_pct
    }

    pub fn origin_y(&self) -> u32 {
        percent_of(self.origin_y_pct, self.geometry.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height_pct(&self) -> f64 {
        self.height_pct
    }

    pub fn height(&self) -> u32 {
        percent_of(self.height_pct, self.geometry.height())
    }

    pub fn origin(&self) -> Vector2<u32> {
        Vector2::new(self.origin_x, self.origin_y())
    }

    pub fn size(&self) -> Vector2<u32> {
        Vector2::new(self.width, self.height())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// How much the renderer should stretch the frame on each axis, never below 1
pub struct DisplayScale {
    x: f32,
    y: f32,
}

impl DisplayScale {
    pub const MIN: f32 = 1.0;

    pub fn new(x: f32, y: f32) -> Self {
        let mut scale = Self {
            x: Self::MIN,
            y: Self::MIN,
        };

        scale.set(x, y);
        scale
    }

    pub fn from_settings(settings: &ScaleSettings) -> Self {
        Self::new(settings.x, settings.y)
    }

    /// Scale derived from a renderer provided horizontal scale, keeping the default aspect
    pub fn from_preferred_x(preferred_x: f32, settings: &ScaleSettings) -> Self {
        Self::new(preferred_x, preferred_x / settings.aspect_x)
    }

    pub fn set(&mut self, x: f32, y: f32) {
        // max throws NaN away
        self.x = x.max(Self::MIN);
        self.y = y.max(Self::MIN);
    }

    /// Set a whole vertical scale and derive the horizontal one from the aspect
    pub fn set_uniform(&mut self, y: f32, aspect_x: f32) {
        let y = y.trunc().max(Self::MIN);

        self.set(y * aspect_x, y);
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Size of a frame once scaled
    pub fn apply(&self, size: Vector2<u32>) -> Vector2<u32> {
        Vector2::new(
            (size.x as f32 * self.x) as u32,
            (size.y as f32 * self.y) as u32,
        )
    }
}
