use crate::standard::VideoStandard;
use crtmon_config::DetectionSettings;

#[derive(Debug, Clone)]
/// Classifies the signal's standard from how many lines its frames have
///
/// Line counts are noisy right after the signal locks, so frames outside a plausible range
/// are dropped and the decision is made on the average of several frames
pub struct VideoStandardDetector {
    settings: DetectionSettings,
    candidate_lines_this_frame: u32,
    frames_observed: u32,
    total_lines_accumulated: u32,
    detected: Option<VideoStandard>,
}

impl VideoStandardDetector {
    pub fn new(settings: DetectionSettings) -> Self {
        Self {
            settings,
            candidate_lines_this_frame: 0,
            frames_observed: 0,
            total_lines_accumulated: 0,
            detected: None,
        }
    }

    /// Forget everything and start observing again
    pub fn restart(&mut self) {
        self.candidate_lines_this_frame = 0;
        self.frames_observed = 0;
        self.total_lines_accumulated = 0;
        self.detected = None;
    }

    pub fn detected(&self) -> Option<VideoStandard> {
        self.detected
    }

    pub fn frames_observed(&self) -> u32 {
        self.frames_observed
    }

    /// Count a scanline towards the current frame
    pub fn count_line(&mut self) {
        if self.detected.is_none() {
            self.candidate_lines_this_frame += 1;
        }
    }

    /// Close the current frame using the lines counted so far
    pub fn frame_boundary(&mut self) -> Option<VideoStandard> {
        let lines = std::mem::take(&mut self.candidate_lines_this_frame);

        self.on_frame_boundary(lines)
    }

    /// Feed one frame's line count
    ///
    /// Returns the standard when this frame is the one that settled it
    pub fn on_frame_boundary(&mut self, lines_this_frame: u32) -> Option<VideoStandard> {
        if self.detected.is_some() {
            return None;
        }

        if !(self.settings.min_lines..=self.settings.max_lines).contains(&lines_this_frame) {
            tracing::debug!(
                "Ignoring frame of {} lines for standard detection",
                lines_this_frame
            );

            return None;
        }

        self.total_lines_accumulated += lines_this_frame;
        self.frames_observed += 1;

        if self.frames_observed < self.settings.sample_frames.max(1) {
            return None;
        }

        let average_lines = self.total_lines_accumulated / self.frames_observed;
        let standard = if average_lines < self.settings.pal_threshold {
            VideoStandard::Ntsc
        } else {
            VideoStandard::Pal
        };

        tracing::info!(
            "Detected {} signal ({} lines per frame over {} frames)",
            standard,
            average_lines,
            self.frames_observed
        );

        self.detected = Some(standard);
        self.detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_after_four_frames() {
        let mut detector = VideoStandardDetector::new(DetectionSettings::default());

        assert_eq!(detector.on_frame_boundary(262), None);
        assert_eq!(detector.on_frame_boundary(263), None);
        assert_eq!(detector.on_frame_boundary(262), None);
        assert_eq!(
            detector.on_frame_boundary(263),
            Some(VideoStandard::Ntsc)
        );
        assert_eq!(detector.detected(), Some(VideoStandard::Ntsc));
    }

    #[test]
    fn outlier_does_not_count() {
        let mut detector = VideoStandardDetector::new(DetectionSettings::default());

        detector.on_frame_boundary(262);
        detector.on_frame_boundary(400);
        detector.on_frame_boundary(263);
        detector.on_frame_boundary(262);

        assert_eq!(detector.frames_observed(), 3);
        assert_eq!(detector.detected(), None);

        assert_eq!(
            detector.on_frame_boundary(263),
            Some(VideoStandard::Ntsc)
        );
    }

    #[test]
    fn pal_and_locked_until_restart() {
        let mut detector = VideoStandardDetector::new(DetectionSettings::default());

        for _ in 0..4 {
            detector.on_frame_boundary(312);
        }
        assert_eq!(detector.detected(), Some(VideoStandard::Pal));

        for _ in 0..4 {
            assert_eq!(detector.on_frame_boundary(262), None);
        }
        assert_eq!(detector.detected(), Some(VideoStandard::Pal));

        detector.restart();
        assert_eq!(detector.detected(), None);

        for _ in 0..4 {
            detector.on_frame_boundary(262);
        }
        assert_eq!(detector.detected(), Some(VideoStandard::Ntsc));
    }

    #[test]
    fn counted_lines_reset_per_frame() {
        let mut detector = VideoStandardDetector::new(DetectionSettings::default());

        for _ in 0..4 {
            for _ in 0..312 {
                detector.count_line();
            }
            detector.frame_boundary();
        }

        assert_eq!(detector.detected(), Some(VideoStandard::Pal));
    }
}
