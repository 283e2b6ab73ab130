use crate::{
    buffer::{DoubleBuffer, Pixel},
    detector::VideoStandardDetector,
    error::MonitorError,
    standard::SignalGeometry,
};
use crossbeam::channel::Sender;
use crtmon_config::{MonitorSettings, SyncSettings};

/// Debug levels cycle through `0..DEBUG_LEVELS`
pub(crate) const DEBUG_LEVELS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where the producer is within the current frame
pub struct ScanPosition {
    pub line: u32,
    /// Vsync lines still needed before the frame end is believed
    pub vsync_countdown: u8,
}

impl ScanPosition {
    fn new(sync: &SyncSettings) -> Self {
        Self {
            line: 0,
            vsync_countdown: sync.vsync_debounce.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a frame is being closed
pub(crate) enum FrameEnd {
    Vsync,
    /// The signal ran past its expected length without a vsync, `line` is where it was cut
    Overflow { line: u32 },
}

#[derive(Debug)]
/// Everything guarded by the ingest lock
pub(crate) struct IngestState {
    pub geometry: SignalGeometry,
    pub buffer: DoubleBuffer,
    pub position: ScanPosition,
    pub detector: VideoStandardDetector,
    sync: SyncSettings,
    /// The producer's view of the signal, flipped on edges only
    pub signal_on: bool,
    pub debug_level: u8,
    /// Wakes an on demand scheduler, never blocks
    pub frame_ready: Sender<()>,
    pub frames_completed: u64,
    pub destroyed: bool,
}

impl IngestState {
    pub fn new(
        geometry: SignalGeometry,
        settings: &MonitorSettings,
        frame_ready: Sender<()>,
    ) -> Result<Self, MonitorError> {
        Ok(Self {
            geometry,
            buffer: DoubleBuffer::new(geometry.size())?,
            position: ScanPosition::new(&settings.sync),
            detector: VideoStandardDetector::new(settings.detection.clone()),
            sync: settings.sync.clone(),
            signal_on: false,
            debug_level: 0,
            frame_ready,
            frames_completed: 0,
            destroyed: false,
        })
    }

    pub fn reset_position(&mut self) {
        self.position = ScanPosition::new(&self.sync);
    }

    /// Adopt buffers for a new geometry, allocated by the caller
    pub fn set_geometry(&mut self, geometry: SignalGeometry, buffer: DoubleBuffer) {
        self.geometry = geometry;
        self.buffer = buffer;
        self.reset_position();
    }

    /// Store one scanline and decide whether it closes the frame
    pub fn accept_line(&mut self, row: &[Pixel], vsync: bool) -> Option<FrameEnd> {
        let height = self.geometry.height();
        let line = self.position.line;
        let mut frame_end = None;

        if line < height {
            self.buffer.write_scanline(line, row);
        } else if line > height + self.sync.overflow_tolerance {
            frame_end = Some(FrameEnd::Overflow { line });
        }

        self.position.line += 1;
        self.detector.count_line();

        if !vsync {
            self.position.vsync_countdown = self.sync.vsync_debounce.max(1);
            return frame_end;
        }

        // Once at zero it stays there until a line without vsync rearms it
        if self.position.vsync_countdown == 0 {
            return frame_end;
        }

        self.position.vsync_countdown -= 1;

        if self.position.vsync_countdown == 0 {
            if self.detector.detected().is_none() {
                self.detector.frame_boundary();
            }

            if self.position.line >= height.saturating_sub(self.sync.overflow_tolerance) {
                frame_end.get_or_insert(FrameEnd::Vsync);
            } else {
                tracing::debug!(
                    "Vsync after only {} lines, continuing frame",
                    self.position.line
                );
            }
        }

        frame_end
    }

    /// Back to line zero after the frame was handed over
    pub fn finish_frame(&mut self) {
        self.position.line = 0;
        self.frames_completed += 1;

        if self.debug_level > 0 {
            self.buffer.mark_back_undrawn();
        }

        // A token already waiting means the scheduler has not caught up, one is enough
        let _ = self.frame_ready.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::BLANK, standard::VideoStandard};
    use crossbeam::channel;

    fn ingest() -> IngestState {
        let (frame_ready, _) = channel::bounded(1);

        IngestState::new(
            SignalGeometry::new(VideoStandard::Ntsc),
            &MonitorSettings::default(),
            frame_ready,
        )
        .unwrap()
    }

    #[test]
    fn two_vsync_lines_close_a_full_frame() {
        let mut ingest = ingest();
        let row = [BLANK; 228];

        for _ in 0..262 {
            assert_eq!(ingest.accept_line(&row, false), None);
        }

        assert_eq!(ingest.accept_line(&row, true), None);
        assert_eq!(ingest.accept_line(&row, true), Some(FrameEnd::Vsync));

        // Further vsync lines do not end it again
        assert_eq!(ingest.accept_line(&row, true), None);
    }

    #[test]
    fn interrupted_vsync_does_not_count() {
        let mut ingest = ingest();
        let row = [BLANK; 228];

        for _ in 0..262 {
            ingest.accept_line(&row, false);
        }

        assert_eq!(ingest.accept_line(&row, true), None);
        assert_eq!(ingest.accept_line(&row, false), None);
        assert_eq!(ingest.accept_line(&row, true), None);
        assert_eq!(ingest.position.vsync_countdown, 1);
    }

    #[test]
    fn short_frame_keeps_accumulating() {
        let mut ingest = ingest();
        let row = [BLANK; 228];

        for _ in 0..100 {
            ingest.accept_line(&row, false);
        }
        ingest.accept_line(&row, true);

        assert_eq!(ingest.accept_line(&row, true), None);
        assert_eq!(ingest.position.line, 102);
    }

    #[test]
    fn missing_vsync_forces_frame_end() {
        let mut ingest = ingest();
        let row = [BLANK; 228];

        for _ in 0..273 {
            assert_eq!(ingest.accept_line(&row, false), None);
        }

        assert_eq!(
            ingest.accept_line(&row, false),
            Some(FrameEnd::Overflow { line: 273 })
        );
    }
}
