use crtmon_monitor::{Monitor, MonitorDisplay, Pixel, VideoStandard};
use palette::Srgba;
use std::time::{Duration, Instant};

/// Trailing lines of every frame that carry vsync
const VSYNC_LINES: u32 = 2;

const BARS: [Pixel; 7] = [
    Srgba::new(0xbf, 0xbf, 0xbf, 0xff),
    Srgba::new(0xbf, 0xbf, 0x00, 0xff),
    Srgba::new(0x00, 0xbf, 0xbf, 0xff),
    Srgba::new(0x00, 0xbf, 0x00, 0xff),
    Srgba::new(0xbf, 0x00, 0xbf, 0xff),
    Srgba::new(0xbf, 0x00, 0x00, 0xff),
    Srgba::new(0x00, 0x00, 0xbf, 0xff),
];

const ROLLING_BAR: Pixel = Srgba::new(0xff, 0xff, 0xff, 0xff);

/// Color bars with a white line rolling down, paced like the real signal
pub struct TestPattern {
    standard: VideoStandard,
    row: Vec<Pixel>,
}

impl TestPattern {
    pub fn new(standard: VideoStandard) -> Self {
        Self {
            standard,
            row: Vec::with_capacity(standard.width() as usize),
        }
    }

    fn fill_scanline(&mut self, frame: u32, line: u32) {
        let width = self.standard.width();
        let rolling_line = (frame * 2) % self.standard.total_scanlines();

        self.row.clear();

        if line == rolling_line {
            self.row.resize(width as usize, ROLLING_BAR);
            return;
        }

        self.row.extend(
            (0..width).map(|x| BARS[(x * BARS.len() as u32 / width) as usize]),
        );
    }

    /// Feed `frames` frames, cutting the signal for `dropout` of them halfway through
    ///
    /// Returns how many frames the monitor completed
    pub fn run<D: MonitorDisplay>(
        &mut self,
        monitor: &Monitor<D>,
        frames: u32,
        dropout: u32,
    ) -> u32 {
        let period = Duration::from_secs_f64(1.0 / f64::from(self.standard.frame_rate()));
        let total_lines = self.standard.total_scanlines();
        let dropout_frames = frames / 2..frames / 2 + dropout;
        let mut completed = 0;

        for frame in 0..frames {
            let started = Instant::now();

            if dropout_frames.contains(&frame) {
                for _ in 0..total_lines {
                    monitor.submit_line(None, false);
                }
            } else {
                for line in 0..total_lines {
                    self.fill_scanline(frame, line);

                    let vsync = line + VSYNC_LINES >= total_lines;
                    if monitor.submit_line(Some(&self.row), vsync) {
                        completed += 1;
                    }
                }
            }

            if let Some(remaining) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_span_the_line() {
        let mut pattern = TestPattern::new(VideoStandard::Ntsc);

        pattern.fill_scanline(0, 10);
        assert_eq!(pattern.row.len(), 228);
        assert_eq!(pattern.row[0], BARS[0]);
        assert_eq!(pattern.row[227], BARS[6]);

        pattern.fill_scanline(5, 10);
        assert!(pattern.row.iter().all(|pixel| *pixel == ROLLING_BAR));
    }
}
