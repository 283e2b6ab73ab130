//! A virtual CRT for emulated video chips
//!
//! The producer pushes one scanline at a time as the chip generates it. The monitor finds the
//! frame boundaries in that free running stream, crops the visible window out of every
//! completed frame and hands it to a [`MonitorDisplay`] on a schedule of its own.
//!
//! Two locks split the work. The ingest lock covers the scan position, the back buffer and the
//! detector, the presentation lock covers the front buffer, the window and the renderer. When
//! both are needed ingest is always taken first.

use crate::{
    ingest::{FrameEnd, IngestState},
    presentation::PresentationState,
};
use crossbeam::channel;
use crtmon_config::MonitorSettings;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub use buffer::{BLANK, Frame, Pixel, UNDRAWN_MARKER};
pub use command::{MonitorCommand, ModeCommand, ScaleCommand, WindowCommand};
pub use crtmon_config as config;
pub use detector::VideoStandardDetector;
pub use display::{MonitorDisplay, Overlay};
pub use error::MonitorError;
pub use ingest::ScanPosition;
pub use scheduler::{RefreshMode, SchedulerState};
pub use standard::{SignalGeometry, VideoStandard};
pub use window::{CropWindow, DisplayScale};

mod buffer;
pub mod command;
mod detector;
mod display;
mod error;
mod ingest;
mod osd;
mod presentation;
mod scheduler;
mod standard;
pub mod window;


#[derive(Debug)]
struct Shared<D: MonitorDisplay> {
    settings: MonitorSettings,
    ingest: Mutex<IngestState>,
    presentation: Mutex<PresentationState<D>>,
}

impl<D: MonitorDisplay> Shared<D> {
    fn lock_ingest(&self) -> MutexGuard<'_, IngestState> {
        self.ingest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_presentation(&self) -> MutexGuard<'_, PresentationState<D>> {
        self.presentation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_both(
        &self,
    ) -> (
        MutexGuard<'_, IngestState>,
        MutexGuard<'_, PresentationState<D>>,
    ) {
        let ingest = self.lock_ingest();
        let presentation = self.lock_presentation();

        (ingest, presentation)
    }

    /// One hand-off to the renderer, false once destroyed
    fn refresh(&self) -> bool {
        let mut presentation = self.lock_presentation();

        if presentation.destroyed {
            return false;
        }

        presentation.present();
        true
    }

    /// A hand-off asked for by the scheduler
    ///
    /// A tick that raced a power off finds the monitor unpowered here and leaves the idle
    /// picture alone
    fn scheduled_refresh(&self) -> bool {
        let mut presentation = self.lock_presentation();

        if presentation.destroyed {
            return false;
        }

        if presentation.powered {
            presentation.present();
        }

        true
    }

    fn submit_line(&self, pixels: Option<&[Pixel]>, vsync: bool) -> bool {
        let mut ingest = self.lock_ingest();

        if ingest.destroyed {
            return false;
        }

        let Some(pixels) = pixels else {
            if ingest.signal_on {
                self.signal_lost(&mut ingest);
            }

            return false;
        };

        if !ingest.signal_on {
            self.signal_acquired(&mut ingest);
        }

        let Some(frame_end) = ingest.accept_line(pixels, vsync) else {
            return false;
        };

        if let FrameEnd::Overflow { line } = frame_end {
            if ingest.debug_level > 0 {
                tracing::warn!("No vsync by line {}, forcing the frame out", line);
            } else {
                tracing::debug!("No vsync by line {}, forcing the frame out", line);
            }
        }

        self.complete_frame(&mut ingest);
        true
    }

    /// Publish the back buffer's window as the new front
    fn complete_frame(&self, ingest: &mut IngestState) {
        let mut presentation = self.lock_presentation();
        let presentation = &mut *presentation;

        ingest
            .buffer
            .swap(&presentation.window, &mut presentation.front);
        ingest.finish_frame();

        tracing::trace!("Frame {} completed", ingest.frames_completed);
    }

    fn signal_acquired(&self, ingest: &mut IngestState) {
        ingest.signal_on = true;
        ingest.reset_position();

        self.lock_presentation().signal_on = true;

        tracing::info!("Video signal acquired");
    }

    /// Drop the partial frame and show the idle picture right away
    fn signal_lost(&self, ingest: &mut IngestState) {
        ingest.signal_on = false;
        ingest.reset_position();
        ingest.buffer.clear_back();
        ingest.detector.restart();

        let mut presentation = self.lock_presentation();
        presentation.signal_on = false;
        presentation.front = Arc::new(Frame::blank(presentation.window.size()));
        presentation.present_idle();

        tracing::info!("Video signal lost");
    }
}

#[derive(Debug)]
/// Virtual CRT monitor driving a renderer of type `D`
///
/// Every method takes `&self`, share it between the producer and control threads behind an
/// [`Arc`]
pub struct Monitor<D: MonitorDisplay> {
    shared: Arc<Shared<D>>,
    scheduler: scheduler::RefreshScheduler,
}

impl<D: MonitorDisplay> Monitor<D> {
    /// Build a powered off monitor expecting an NTSC signal
    pub fn new(settings: MonitorSettings, display: D) -> Result<Self, MonitorError> {
        let geometry = SignalGeometry::default();
        let (frame_ready, frame_ready_receiver) = channel::bounded(1);

        let mut presentation = PresentationState::new(geometry, &settings, display)?;
        presentation.recenter_defaults(&settings);
        presentation.present_idle();

        let ingest = IngestState::new(geometry, &settings, frame_ready)?;
        let mode = scheduler::RefreshMode::from_rate(settings.refresh_rate);

        let shared = Arc::new(Shared {
            settings,
            ingest: Mutex::new(ingest),
            presentation: Mutex::new(presentation),
        });

        let worker_shared: Weak<Shared<D>> = Arc::downgrade(&shared);
        let scheduler =
            scheduler::RefreshScheduler::spawn(mode, frame_ready_receiver, move || {
                worker_shared
                    .upgrade()
                    .is_some_and(|shared| shared.scheduled_refresh())
            })?;

        Ok(Self { shared, scheduler })
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.shared.settings
    }

    /// Feed one scanline
    ///
    /// `None` means there is no signal at all. Returns true when this line completed a frame
    pub fn submit_line(&self, pixels: Option<&[Pixel]>, vsync: bool) -> bool {
        self.shared.submit_line(pixels, vsync)
    }

    /// The most recently completed frame
    ///
    /// The returned frame is never modified, hold it as long as needed
    pub fn current_frame(&self) -> Arc<Frame> {
        self.shared.lock_presentation().front.clone()
    }

    /// Present right now, outside of the scheduler
    pub fn refresh(&self) -> bool {
        self.shared.refresh()
    }

    /// Switch the signal geometry, reallocating every buffer
    ///
    /// On failure the previous geometry stays in place
    pub fn set_standard(&self, standard: VideoStandard) -> Result<(), MonitorError> {
        let (mut ingest, mut presentation) = self.shared.lock_both();

        if ingest.destroyed {
            return Err(MonitorError::Destroyed);
        }

        if ingest.geometry.standard() == standard {
            return Ok(());
        }

        let geometry = SignalGeometry::new(standard);
        let buffer = buffer::DoubleBuffer::new(geometry.size())?;
        presentation.set_geometry(geometry, &self.shared.settings.scale)?;
        ingest.set_geometry(geometry, buffer);

        tracing::info!(
            "Signal geometry set to {} ({}x{})",
            standard,
            geometry.width(),
            geometry.height()
        );

        Ok(())
    }

    pub fn standard(&self) -> VideoStandard {
        self.shared.lock_ingest().geometry.standard()
    }

    /// What the detector settled on, `None` while it is still observing
    pub fn detected_standard(&self) -> Option<VideoStandard> {
        self.shared.lock_ingest().detector.detected()
    }

    pub fn restart_detection(&self) {
        let mut ingest = self.shared.lock_ingest();

        if ingest.destroyed {
            return;
        }

        ingest.detector.restart();
        tracing::info!("Video standard detection restarted");
    }

    pub fn scan_position(&self) -> ScanPosition {
        self.shared.lock_ingest().position
    }

    pub fn frames_completed(&self) -> u64 {
        self.shared.lock_ingest().frames_completed
    }

    pub fn crop_window(&self) -> CropWindow {
        self.shared.lock_presentation().window.clone()
    }

    pub fn display_scale(&self) -> DisplayScale {
        self.shared.lock_presentation().scale
    }

    /// Put a message on screen for the configured number of presentations
    pub fn show_osd(&self, message: impl Into<String>) {
        let frames = self.shared.settings.osd_frames;
        let mut presentation = self.shared.lock_presentation();

        if !presentation.destroyed {
            presentation.osd.show(message, frames);
        }
    }

    pub fn set_fixed_size(&self, fixed_size: bool) {
        let mut presentation = self.shared.lock_presentation();

        if !presentation.destroyed {
            presentation.fixed_size = fixed_size;
        }
    }

    /// Apply a control surface command
    pub fn control(&self, command: impl Into<MonitorCommand>) {
        let command = command.into();
        let settings = &self.shared.settings;

        match command {
            MonitorCommand::Window(command) => {
                let mut presentation = self.shared.lock_presentation();

                if self.ignored(&presentation, command.into()) {
                    return;
                }

                presentation.apply_window(command, settings);
            }
            MonitorCommand::Scale(command) => {
                let mut presentation = self.shared.lock_presentation();

                if self.ignored(&presentation, command.into()) {
                    return;
                }

                presentation.apply_scale(command, &settings.scale);
            }
            MonitorCommand::Mode(command) => self.apply_mode(command),
        }
    }

    fn ignored(&self, presentation: &PresentationState<D>, command: MonitorCommand) -> bool {
        if presentation.destroyed {
            return true;
        }

        if presentation.fixed_size && command.is_blocked_by_fixed_size() {
            tracing::debug!("Ignoring {:?} in fixed size mode", command);
            return true;
        }

        false
    }

    fn apply_mode(&self, command: ModeCommand) {
        let osd_frames = self.shared.settings.osd_frames;

        // Every arm checks for destruction under the lock it mutates with
        match command {
            ModeCommand::RestartDetection => self.restart_detection(),
            ModeCommand::CycleCrtMode => {
                let mut presentation = self.shared.lock_presentation();

                if presentation.destroyed {
                    return;
                }

                presentation.crt_mode = presentation.crt_mode.next();

                let message = presentation.crt_mode.to_string();
                presentation.osd.show(message, osd_frames);
            }
            ModeCommand::ToggleFiltering => {
                let mut presentation = self.shared.lock_presentation();

                if presentation.destroyed {
                    return;
                }

                presentation.filtering = !presentation.filtering;

                let message = if presentation.filtering {
                    "Filter ON"
                } else {
                    "Filter OFF"
                };
                presentation.osd.show(message, osd_frames);
            }
            ModeCommand::CycleDebugLevel => {
                let (mut ingest, mut presentation) = self.shared.lock_both();

                if ingest.destroyed {
                    return;
                }

                ingest.debug_level = (ingest.debug_level + 1) % ingest::DEBUG_LEVELS;

                if ingest.debug_level == 0 {
                    ingest.buffer.clear_back();
                }

                presentation
                    .osd
                    .show(format!("Debug level {}", ingest.debug_level), osd_frames);
                tracing::info!("Debug level {}", ingest.debug_level);
            }
        }
    }

    pub fn debug_level(&self) -> u8 {
        self.shared.lock_ingest().debug_level
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.scheduler.mode()
    }

    /// Show the idle picture and start presenting
    pub fn power_on(&self) {
        let mut presentation = self.shared.lock_presentation();

        if presentation.destroyed {
            return;
        }

        presentation.present_idle();
        presentation.powered = true;

        if self.scheduler.power_on() {
            tracing::info!("Monitor powered on");
        }
    }

    /// Stop presenting, leaving the idle picture up
    pub fn power_off(&self) {
        let mut presentation = self.shared.lock_presentation();

        if presentation.destroyed {
            return;
        }

        presentation.powered = false;

        if self.scheduler.power_off() {
            tracing::info!("Monitor powered off");
        }

        presentation.present_idle();
    }

    pub fn is_powered(&self) -> bool {
        self.shared.lock_presentation().powered
    }

    /// Tear down for good, stopping the scheduler thread
    ///
    /// Everything afterwards is a no-op
    pub fn destroy(&self) {
        {
            let (mut ingest, mut presentation) = self.shared.lock_both();

            if ingest.destroyed {
                return;
            }

            ingest.destroyed = true;
            presentation.destroyed = true;
        }

        self.scheduler.terminate();
        tracing::info!("Monitor destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.lock_ingest().destroyed
    }
}
