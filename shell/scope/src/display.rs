use crtmon_monitor::{Frame, MonitorDisplay, Overlay};
use nalgebra::Vector2;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// How often a running tally is logged
const REPORT_INTERVAL: u64 = 120;

#[derive(Debug, Default)]
pub struct PresentationCounts {
    pub frames: AtomicU64,
    pub idle: AtomicU64,
}

#[derive(Debug)]
/// Renderer that only reports what it was asked to draw
pub struct LoggingDisplay {
    counts: Arc<PresentationCounts>,
    last_osd: Option<String>,
}

impl LoggingDisplay {
    pub fn new() -> (Self, Arc<PresentationCounts>) {
        let counts = Arc::new(PresentationCounts::default());

        (
            Self {
                counts: counts.clone(),
                last_osd: None,
            },
            counts,
        )
    }

    fn report_osd(&mut self, osd: Option<&str>) {
        if self.last_osd.as_deref() != osd {
            if let Some(message) = osd {
                tracing::info!("OSD: {}", message);
            }

            self.last_osd = osd.map(str::to_string);
        }
    }
}

impl MonitorDisplay for LoggingDisplay {
    fn present_frame(&mut self, frame: &Frame, overlay: Overlay<'_>) {
        self.report_osd(overlay.osd);

        let presented = self.counts.frames.fetch_add(1, Ordering::Relaxed) + 1;

        if presented % REPORT_INTERVAL == 0 {
            tracing::info!(
                "Presented {} frames of {}x{} ({}, filtering {})",
                presented,
                frame.width(),
                frame.height(),
                overlay.crt_mode,
                overlay.filtering
            );
        }
    }

    fn present_idle(&mut self, overlay: Overlay<'_>) {
        self.report_osd(overlay.osd);
        self.counts.idle.fetch_add(1, Ordering::Relaxed);

        tracing::debug!("No signal");
    }

    fn resize(&mut self, size: Vector2<u32>, minimum: Vector2<u32>) {
        tracing::info!(
            "Display is now {}x{}, at least {}x{}",
            size.x,
            size.y,
            minimum.x,
            minimum.y
        );
    }
}
