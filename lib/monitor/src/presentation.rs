use crate::{
    buffer::Frame,
    command::{HEIGHT_PCT_STEP, SCALE_STEP, ScaleCommand, WIDTH_STEP, WindowCommand},
    display::{MonitorDisplay, Overlay},
    error::MonitorError,
    osd::OnScreenDisplay,
    standard::SignalGeometry,
    window::{CropWindow, DisplayScale},
};
use crtmon_config::{CrtMode, MonitorSettings, ScaleSettings};
use nalgebra::Vector2;
use std::sync::Arc;

#[derive(Debug)]
/// Everything guarded by the presentation lock
pub(crate) struct PresentationState<D: MonitorDisplay> {
    pub display: D,
    pub front: Arc<Frame>,
    pub window: CropWindow,
    pub scale: DisplayScale,
    pub signal_on: bool,
    pub osd: OnScreenDisplay,
    pub crt_mode: CrtMode,
    pub filtering: bool,
    pub fixed_size: bool,
    /// Whether the scheduler's hand-offs reach the renderer
    pub powered: bool,
    pub destroyed: bool,
}

impl<D: MonitorDisplay> PresentationState<D> {
    pub fn new(
        geometry: SignalGeometry,
        settings: &MonitorSettings,
        display: D,
    ) -> Result<Self, MonitorError> {
        let window = CropWindow::new(geometry, &settings.crop);

        Ok(Self {
            display,
            front: Arc::new(Frame::allocate(window.size())?),
            window,
            scale: DisplayScale::from_settings(&settings.scale),
            signal_on: false,
            osd: OnScreenDisplay::default(),
            crt_mode: settings.crt_mode,
            filtering: settings.filtering,
            fixed_size: settings.fixed_size,
            powered: false,
            destroyed: false,
        })
    }

    /// Hand the current front, or the idle picture without a signal, to the renderer
    pub fn present(&mut self) {
        if !self.signal_on {
            self.present_idle();
            return;
        }

        let overlay = Overlay {
            osd: self.osd.next_presentation(),
            crt_mode: self.crt_mode,
            filtering: self.filtering,
            scale: self.scale,
        };

        self.display.present_frame(&self.front, overlay);
    }

    pub fn present_idle(&mut self) {
        let overlay = Overlay {
            osd: self.osd.next_presentation(),
            crt_mode: self.crt_mode,
            filtering: self.filtering,
            scale: self.scale,
        };

        self.display.present_idle(overlay);
    }

    /// Tell the renderer the size it should now be showing
    pub fn notify_resize(&mut self, defaults: &ScaleSettings) {
        let window_size = self.window.size();
        let size = self.scale.apply(window_size);
        // Never smaller than the window at the default aspect with a vertical scale of one
        let minimum = Vector2::new(
            (window_size.x as f32 * defaults.x / defaults.y) as u32,
            window_size.y,
        );

        self.display.resize(size, minimum);
    }

    /// Default window, and the renderer's preferred scale if it has one
    pub fn recenter_defaults(&mut self, settings: &MonitorSettings) {
        self.window.recenter_defaults(&settings.crop);
        self.reset_scale(&settings.scale);
    }

    fn reset_scale(&mut self, defaults: &ScaleSettings) {
        self.scale = match self.display.preferred_scale_x(self.window.size()) {
            Some(preferred_x) => DisplayScale::from_preferred_x(preferred_x, defaults),
            None => DisplayScale::from_settings(defaults),
        };

        self.notify_resize(defaults);
    }

    /// Switch the window to another geometry with a front buffer to match
    pub fn set_geometry(
        &mut self,
        geometry: SignalGeometry,
        defaults: &ScaleSettings,
    ) -> Result<(), MonitorError> {
        let mut window = self.window.clone();
        window.set_geometry(geometry);
        let front = Frame::allocate(window.size())?;

        self.window = window;
        self.front = Arc::new(front);
        self.notify_resize(defaults);

        Ok(())
    }

    pub fn apply_window(&mut self, command: WindowCommand, settings: &MonitorSettings) {
        let width = i64::from(self.window.width());
        let height_pct = self.window.height_pct();
        let x = i64::from(self.window.origin_x());
        let y_pct = self.window.origin_y_pct();

        match command {
            WindowCommand::GrowWidth => self.window.set_size(width + WIDTH_STEP, height_pct),
            WindowCommand::ShrinkWidth => self.window.set_size(width - WIDTH_STEP, height_pct),
            WindowCommand::GrowHeight => self.window.set_size(width, height_pct + HEIGHT_PCT_STEP),
            WindowCommand::ShrinkHeight => {
                self.window.set_size(width, height_pct - HEIGHT_PCT_STEP)
            }
            WindowCommand::MoveLeft => self.window.set_origin(x - WIDTH_STEP, y_pct),
            WindowCommand::MoveRight => self.window.set_origin(x + WIDTH_STEP, y_pct),
            WindowCommand::MoveUp => self.window.set_origin(x, y_pct - HEIGHT_PCT_STEP),
            WindowCommand::MoveDown => self.window.set_origin(x, y_pct + HEIGHT_PCT_STEP),
            WindowCommand::Reset => {
                self.recenter_defaults(settings);
                return;
            }
        }

        tracing::debug!(
            "Crop window now {}x{} at ({}, {})",
            self.window.width(),
            self.window.height(),
            self.window.origin_x(),
            self.window.origin_y()
        );

        self.notify_resize(&settings.scale);
    }

    pub fn apply_scale(&mut self, command: ScaleCommand, defaults: &ScaleSettings) {
        let (x, y) = (self.scale.x(), self.scale.y());

        match command {
            ScaleCommand::GrowX => self.scale.set(x + SCALE_STEP, y),
            ScaleCommand::ShrinkX => self.scale.set(x - SCALE_STEP, y),
            ScaleCommand::GrowY => self.scale.set(x, y + SCALE_STEP),
            ScaleCommand::ShrinkY => self.scale.set(x, y - SCALE_STEP),
            ScaleCommand::GrowUniform => self.scale.set_uniform(y + 1.0, defaults.aspect_x),
            ScaleCommand::ShrinkUniform => self.scale.set_uniform(y - 1.0, defaults.aspect_x),
            ScaleCommand::Reset => {
                self.reset_scale(defaults);
                return;
            }
        }

        tracing::debug!("Display scale now {}x{}", self.scale.x(), self.scale.y());

        self.notify_resize(defaults);
    }
}
