//! Input action definitions and sampling.
//!
//! Keys are mapped to [`DriveAction`]s with `leafwing-input-manager`. Each
//! frame the held actions are folded into [`DriveControls`] and one-shot
//! presses are queued as [`DriveCommand`]s for the next fixed tick.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use drivefolio_core::{DriveCommand, DriveControls, FrameInput};
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

// ============================================================================
// Actions
// ============================================================================

/// Actions for driving the car.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    /// Throttle (W / Up).
    Accelerate,
    /// Reverse (S / Down).
    Reverse,
    /// Steer left (A / Left).
    TurnLeft,
    /// Steer right (D / Right).
    TurnRight,
    /// Handbrake (Space).
    Brake,
    /// Timed boost (Shift).
    Boost,
    /// Return to spawn (R).
    Reset,
    /// Toggle HUD visibility (Q).
    ToggleUi,
}

/// Actions that come from the keyboard and should yield to egui text input.
const DRIVING_ACTIONS: &[DriveAction] = &[
    DriveAction::Accelerate,
    DriveAction::Reverse,
    DriveAction::TurnLeft,
    DriveAction::TurnRight,
    DriveAction::Brake,
    DriveAction::Boost,
    DriveAction::Reset,
];

/// Create the default input map for driving.
pub fn default_drive_input_map() -> InputMap<DriveAction> {
    InputMap::default()
        .with(DriveAction::Accelerate, KeyCode::KeyW)
        .with(DriveAction::Accelerate, KeyCode::ArrowUp)
        .with(DriveAction::Reverse, KeyCode::KeyS)
        .with(DriveAction::Reverse, KeyCode::ArrowDown)
        .with(DriveAction::TurnLeft, KeyCode::KeyA)
        .with(DriveAction::TurnLeft, KeyCode::ArrowLeft)
        .with(DriveAction::TurnRight, KeyCode::KeyD)
        .with(DriveAction::TurnRight, KeyCode::ArrowRight)
        .with(DriveAction::Brake, KeyCode::Space)
        .with(DriveAction::Boost, KeyCode::ShiftLeft)
        .with(DriveAction::Boost, KeyCode::ShiftRight)
        .with(DriveAction::Reset, KeyCode::KeyR)
        .with(DriveAction::ToggleUi, KeyCode::KeyQ)
}

// ============================================================================
// Sampled input
// ============================================================================

/// Input gathered on render frames, consumed by the fixed-rate drive system.
#[derive(Resource, Default)]
pub struct PendingDriveInput {
    /// Controls held as of the latest frame.
    pub controls: DriveControls,
    /// Commands pressed since the last fixed tick.
    commands: Vec<DriveCommand>,
}

impl PendingDriveInput {
    /// Input for the next fixed tick. Queued commands are handed out once.
    pub fn take_frame_input(&mut self) -> FrameInput {
        FrameInput {
            controls: self.controls,
            commands: std::mem::take(&mut self.commands),
        }
    }

    fn queue(&mut self, command: DriveCommand) {
        if !self.commands.contains(&command) {
            self.commands.push(command);
        }
    }
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers drive actions and samples them each frame.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .init_resource::<PendingDriveInput>()
            .add_systems(
                PreUpdate,
                (manage_input_focus, sample_drive_input)
                    .chain()
                    .after(InputManagerSystem::Update),
            );
    }
}

/// Disable driving keys while egui has keyboard focus. `ToggleUi` stays available.
fn manage_input_focus(
    mut action_query: Query<&mut ActionState<DriveAction>>,
    mut contexts: EguiContexts,
) {
    let egui_wants_kb = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.wants_keyboard_input());

    for mut action_state in &mut action_query {
        for action in DRIVING_ACTIONS {
            if egui_wants_kb {
                action_state.disable_action(action);
            } else {
                action_state.enable_action(action);
            }
        }
    }
}

/// Fold the current action state into [`PendingDriveInput`].
fn sample_drive_input(
    action_query: Query<&ActionState<DriveAction>>,
    mut pending: ResMut<PendingDriveInput>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    pending.controls = DriveControls {
        accelerate: action_state.pressed(&DriveAction::Accelerate),
        reverse: action_state.pressed(&DriveAction::Reverse),
        turn_left: action_state.pressed(&DriveAction::TurnLeft),
        turn_right: action_state.pressed(&DriveAction::TurnRight),
        brake: action_state.pressed(&DriveAction::Brake),
    };

    if action_state.just_pressed(&DriveAction::Reset) {
        pending.queue(DriveCommand::Reset);
    }
    if action_state.just_pressed(&DriveAction::Boost) {
        pending.queue(DriveCommand::Boost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_handed_out_once() {
        let mut pending = PendingDriveInput::default();
        pending.controls.accelerate = true;
        pending.queue(DriveCommand::Boost);
        pending.queue(DriveCommand::Boost);

        let first = pending.take_frame_input();
        assert_eq!(first.commands, vec![DriveCommand::Boost]);
        assert!(first.controls.accelerate);

        let second = pending.take_frame_input();
        assert!(second.commands.is_empty());
        assert!(second.controls.accelerate);
    }
}
