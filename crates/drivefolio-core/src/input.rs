//! Per-tick driver input.

/// Held controls sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveControls {
    pub accelerate: bool,
    pub reverse: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub brake: bool,
}

impl DriveControls {
    /// Signed turn intensity: +1 left, -1 right, 0 when neutral or both held.
    pub fn turn_intensity(&self) -> f32 {
        f32::from(u8::from(self.turn_left)) - f32::from(u8::from(self.turn_right))
    }

    /// Whether a forward or reverse control is held.
    pub fn has_drive_input(&self) -> bool {
        self.accelerate || self.reverse
    }
}

/// One-shot commands applied at the start of a tick, before dynamics runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveCommand {
    /// Restore the spawn pose and zero all motion.
    Reset,
    /// Request a timed boost.
    Boost,
}

/// Everything the host hands the core for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub controls: DriveControls,
    pub commands: Vec<DriveCommand>,
}

impl FrameInput {
    pub fn new(controls: DriveControls) -> Self {
        Self {
            controls,
            commands: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: DriveCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Whether a reset was requested this frame.
    pub fn reset_requested(&self) -> bool {
        self.commands.contains(&DriveCommand::Reset)
    }

    /// Whether a boost was requested this frame.
    pub fn boost_requested(&self) -> bool {
        self.commands.contains(&DriveCommand::Boost)
    }
}
