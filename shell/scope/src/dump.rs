use crtmon_monitor::Frame;
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Write a frame out as a PNG
pub fn save_png(frame: &Frame, path: &Path) -> Result<(), image::ImageError> {
    let pixels = frame.pixels();
    let image = RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
        let pixel = pixels[(x as usize, y as usize)];

        Rgba([pixel.red, pixel.green, pixel.blue, pixel.alpha])
    });

    image.save(path)
}
