use crate::{error::MonitorError, window::CropWindow};
use nalgebra::{DMatrix, Vector2};
use palette::Srgba;
use std::sync::Arc;

/// One pixel as produced by the video chip
pub type Pixel = Srgba<u8>;

/// What an unwritten pixel looks like
pub const BLANK: Pixel = Srgba::new(0, 0, 0, 0xff);

/// Painted over the back buffer after every frame when debugging, so lines the producer
/// never drew stand out
pub const UNDRAWN_MARKER: Pixel = Srgba::new(0, 0xff, 0, 0xff);

#[derive(Debug, Clone, PartialEq)]
/// A finished, cropped frame
///
/// Indexed as `(x, y)`. Storage is column major, so every scanline is contiguous
pub struct Frame {
    pixels: DMatrix<Pixel>,
}

impl Frame {
    pub(crate) fn blank(size: Vector2<u32>) -> Self {
        Self {
            pixels: DMatrix::from_element(size.x as usize, size.y as usize, BLANK),
        }
    }

    pub(crate) fn allocate(size: Vector2<u32>) -> Result<Self, MonitorError> {
        Ok(Self {
            pixels: allocate(size)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.nrows() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.ncols() as u32
    }

    pub fn size(&self) -> Vector2<u32> {
        Vector2::new(self.width(), self.height())
    }

    pub fn pixels(&self) -> &DMatrix<Pixel> {
        &self.pixels
    }

    /// A single line of the frame, `None` past the last one
    pub fn scanline(&self, y: u32) -> Option<&[Pixel]> {
        let width = self.pixels.nrows();
        let start = y as usize * width;

        self.pixels.as_slice().get(start..start + width)
    }

    /// All pixels, line after line
    pub fn as_slice(&self) -> &[Pixel] {
        self.pixels.as_slice()
    }
}

/// Allocate a blank buffer, reporting allocator refusal instead of aborting
pub(crate) fn allocate(size: Vector2<u32>) -> Result<DMatrix<Pixel>, MonitorError> {
    let length = size.x as usize * size.y as usize;
    let mut pixels = Vec::new();

    pixels
        .try_reserve_exact(length)
        .map_err(|source| MonitorError::Allocation {
            width: size.x,
            height: size.y,
            source,
        })?;
    pixels.resize(length, BLANK);

    Ok(DMatrix::from_vec(size.x as usize, size.y as usize, pixels))
}

#[derive(Debug)]
/// The producer side of the frame storage
///
/// The front buffer is published as an [`Arc<Frame>`] that is never written again, swapping
/// builds the next front in a staging buffer first
pub(crate) struct DoubleBuffer {
    back: DMatrix<Pixel>,
    /// Previous front, recycled when no reader kept it
    staging: Option<DMatrix<Pixel>>,
}

impl DoubleBuffer {
    pub fn new(signal_size: Vector2<u32>) -> Result<Self, MonitorError> {
        Ok(Self {
            back: allocate(signal_size)?,
            staging: None,
        })
    }

    pub fn signal_size(&self) -> Vector2<u32> {
        Vector2::new(self.back.nrows() as u32, self.back.ncols() as u32)
    }

    /// Copy a row into the back buffer
    ///
    /// Short rows only cover their prefix, long rows are cut
    pub fn write_scanline(&mut self, line: u32, row: &[Pixel]) {
        let width = self.back.nrows();
        let start = line as usize * width;
        let length = row.len().min(width);

        self.back.as_mut_slice()[start..start + length].copy_from_slice(&row[..length]);
    }

    pub fn clear_back(&mut self) {
        self.back.fill(BLANK);
    }

    pub fn mark_back_undrawn(&mut self) {
        self.back.fill(UNDRAWN_MARKER);
    }

    /// Copy the windowed part of the back buffer into a fresh front and publish it
    pub fn swap(&mut self, window: &CropWindow, front: &mut Arc<Frame>) {
        let origin = window.origin();
        let size = window.size();
        let shape = (size.x as usize, size.y as usize);

        debug_assert_eq!(window.geometry().size(), self.signal_size());

        let mut staging = match self.staging.take() {
            Some(staging) if staging.shape() == shape => staging,
            _ => DMatrix::from_element(shape.0, shape.1, BLANK),
        };

        staging.copy_from(
            &self
                .back
                .view((origin.x as usize, origin.y as usize), shape),
        );

        let previous = std::mem::replace(front, Arc::new(Frame { pixels: staging }));

        // Only reuse the old front when no reader is holding it
        self.staging = Arc::try_unwrap(previous).ok().map(|frame| frame.pixels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::{SignalGeometry, VideoStandard};
    use crtmon_config::CropSettings;

    fn numbered_row(line: u32, width: u32) -> Vec<Pixel> {
        (0..width)
            .map(|x| Srgba::new(x as u8, line as u8, 0, 0xff))
            .collect()
    }

    #[test]
    fn swap_copies_the_window_only() {
        let geometry = SignalGeometry::new(VideoStandard::Ntsc);
        let mut buffer = DoubleBuffer::new(geometry.size()).unwrap();

        for line in 0..geometry.height() {
            buffer.write_scanline(line, &numbered_row(line, geometry.width()));
        }

        let mut window = CropWindow::new(geometry, &CropSettings::default());
        window.set_size(100, 50.0);
        window.set_origin(20, 10.0);

        let mut front = Arc::new(Frame::blank(window.size()));
        buffer.swap(&window, &mut front);

        assert_eq!(front.size(), window.size());

        let origin = window.origin();
        for y in 0..front.height() {
            let expected = numbered_row(origin.y + y, geometry.width());
            let start = origin.x as usize;

            assert_eq!(
                front.scanline(y),
                Some(&expected[start..start + front.width() as usize])
            );
        }

        assert_eq!(front.scanline(front.height()), None);
    }

    #[test]
    fn held_front_is_never_rewritten() {
        let geometry = SignalGeometry::new(VideoStandard::Ntsc);
        let mut buffer = DoubleBuffer::new(geometry.size()).unwrap();
        let window = CropWindow::new(geometry, &CropSettings::default());
        let mut front = Arc::new(Frame::blank(window.size()));

        for line in 0..geometry.height() {
            buffer.write_scanline(line, &vec![Srgba::new(1, 1, 1, 0xff); 228]);
        }
        buffer.swap(&window, &mut front);

        let reader = front.clone();
        let snapshot = (*reader).clone();

        // Half of the next frame written, then published
        for line in 0..geometry.height() / 2 {
            buffer.write_scanline(line, &vec![Srgba::new(2, 2, 2, 0xff); 228]);
        }
        assert_eq!(*reader, snapshot);

        buffer.swap(&window, &mut front);

        assert_eq!(*reader, snapshot);
        assert!(!Arc::ptr_eq(&reader, &front));
        assert_ne!(*front, snapshot);
    }

    #[test]
    fn unheld_front_is_recycled() {
        let geometry = SignalGeometry::new(VideoStandard::Pal);
        let mut buffer = DoubleBuffer::new(geometry.size()).unwrap();
        let window = CropWindow::new(geometry, &CropSettings::default());
        let mut front = Arc::new(Frame::blank(window.size()));

        buffer.swap(&window, &mut front);
        assert!(buffer.staging.is_some());
    }

    #[test]
    fn rows_are_cut_to_signal_width() {
        let mut buffer = DoubleBuffer::new(Vector2::new(4, 2)).unwrap();
        let red = Srgba::new(0xff, 0, 0, 0xff);

        buffer.write_scanline(1, &[red; 10]);
        buffer.write_scanline(0, &[red; 2]);

        assert_eq!(buffer.back[(3, 1)], red);
        assert_eq!(buffer.back[(1, 0)], red);
        assert_eq!(buffer.back[(2, 0)], BLANK);
    }
}
