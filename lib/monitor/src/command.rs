use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Pixels the window grows, shrinks or moves per horizontal step
pub const WIDTH_STEP: i64 = 1;
/// Percent of the signal height per vertical step
pub const HEIGHT_PCT_STEP: f64 = 0.5;
/// Scale change per step on a single axis
pub const SCALE_STEP: f32 = 0.5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Discrete requests from a control surface
///
/// Every command clamps silently, none of them can fail
pub enum MonitorCommand {
    Window(WindowCommand),
    Scale(ScaleCommand),
    Mode(ModeCommand),
}

impl MonitorCommand {
    /// Whether fixed size mode swallows this command
    pub fn is_blocked_by_fixed_size(&self) -> bool {
        match self {
            MonitorCommand::Window(command) => command.is_blocked_by_fixed_size(),
            MonitorCommand::Scale(_) => true,
            MonitorCommand::Mode(_) => false,
        }
    }
}

impl From<WindowCommand> for MonitorCommand {
    fn from(command: WindowCommand) -> Self {
        MonitorCommand::Window(command)
    }
}

impl From<ScaleCommand> for MonitorCommand {
    fn from(command: ScaleCommand) -> Self {
        MonitorCommand::Scale(command)
    }
}

impl From<ModeCommand> for MonitorCommand {
    fn from(command: ModeCommand) -> Self {
        MonitorCommand::Mode(command)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
/// Crop window adjustments
pub enum WindowCommand {
    GrowWidth,
    ShrinkWidth,
    GrowHeight,
    ShrinkHeight,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Restore the default window and scale
    Reset,
}

impl WindowCommand {
    pub fn is_blocked_by_fixed_size(&self) -> bool {
        matches!(
            self,
            WindowCommand::GrowWidth
                | WindowCommand::ShrinkWidth
                | WindowCommand::GrowHeight
                | WindowCommand::ShrinkHeight
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
/// Display scale adjustments
pub enum ScaleCommand {
    GrowX,
    ShrinkX,
    GrowY,
    ShrinkY,
    /// Next whole vertical scale, horizontal follows the default aspect
    GrowUniform,
    /// Previous whole vertical scale, horizontal follows the default aspect
    ShrinkUniform,
    Reset,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
/// Monitor behavior toggles
pub enum ModeCommand {
    /// Throw away what the detector learned, for example after a cartridge swap
    RestartDetection,
    CycleCrtMode,
    ToggleFiltering,
    CycleDebugLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn fixed_size_blocks_resizing_only() {
        let blocked: Vec<_> = WindowCommand::iter()
            .filter(WindowCommand::is_blocked_by_fixed_size)
            .collect();

        assert_eq!(
            blocked,
            [
                WindowCommand::GrowWidth,
                WindowCommand::ShrinkWidth,
                WindowCommand::GrowHeight,
                WindowCommand::ShrinkHeight
            ]
        );

        assert!(
            ScaleCommand::iter()
                .all(|command| MonitorCommand::from(command).is_blocked_by_fixed_size())
        );
        assert!(
            !ModeCommand::iter()
                .any(|command| MonitorCommand::from(command).is_blocked_by_fixed_size())
        );
    }
}
