use crate::{buffer::Frame, window::DisplayScale};
use crtmon_config::CrtMode;
use nalgebra::Vector2;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy)]
/// Everything the renderer should draw on top of or apply to a presentation
pub struct Overlay<'a> {
    /// On screen message still up, if any
    pub osd: Option<&'a str>,
    pub crt_mode: CrtMode,
    /// Smooth scaling requested
    pub filtering: bool,
    pub scale: DisplayScale,
}

/// The renderer the monitor hands frames to
///
/// Every call is made with the presentation lock held, implementations must not call back
/// into the monitor
pub trait MonitorDisplay: Debug + Send + 'static {
    /// Draw a finished frame
    fn present_frame(&mut self, frame: &Frame, overlay: Overlay<'_>);

    /// Draw the placeholder shown while there is no signal
    fn present_idle(&mut self, overlay: Overlay<'_>);

    /// The scaled frame size changed
    fn resize(&mut self, _size: Vector2<u32>, _minimum: Vector2<u32>) {}

    /// Horizontal scale the renderer would like to open with for a frame of this size
    fn preferred_scale_x(&self, _frame_size: Vector2<u32>) -> Option<f32> {
        None
    }
}
