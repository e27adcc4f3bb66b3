//! Car control on top of Avian physics.
//!
//! The drive controller lives in the [`DriveRig`] resource. Each fixed tick it
//! writes velocities into the car's Avian components before the solver runs,
//! and reads the solved pose back afterwards for zone detection and readouts.

use avian3d::prelude::*;
use bevy::prelude::*;
use drivefolio_core::{
    DriveController, DriveReadout, RigidBodyHandle, VehicleTransform,
    telemetry::{
        FileTelemetryOutput, TelemetryOutput, TelemetrySnapshot, emit_telemetry_to,
        reset_telemetry_to,
    },
};

use crate::{input::PendingDriveInput, ui::ZonePanel};

/// Plugin for car control.
pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LatestReadout>()
            .add_systems(FixedUpdate, drive_car)
            .add_systems(
                FixedPostUpdate,
                (observe_car, emit_car_telemetry.run_if(resource_exists::<DriveTelemetry>))
                    .chain()
                    .after(PhysicsSystems::Last),
            );
    }
}

// ============================================================================
// Resources and components
// ============================================================================

/// Marker for the player's car.
#[derive(Component)]
pub struct Car;

/// The drive controller, reporting zones to the UI panel.
#[derive(Resource, Deref, DerefMut)]
pub struct DriveRig(pub DriveController<ZonePanel>);

/// Readout from the latest fixed tick, for the HUD.
#[derive(Resource, Default)]
pub struct LatestReadout(pub DriveReadout);

/// Telemetry destination, present only when telemetry was requested at launch.
#[derive(Resource)]
pub struct DriveTelemetry {
    output: Box<dyn TelemetryOutput>,
    elapsed: f32,
}

impl DriveTelemetry {
    /// Start a CSV file at `path`, truncating any previous run.
    pub fn create(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        tracing::info!("Writing drive telemetry to {}", path.display());
        let mut output: Box<dyn TelemetryOutput> = Box::new(FileTelemetryOutput::new(path));
        reset_telemetry_to(output.as_mut());
        Self {
            output,
            elapsed: 0.0,
        }
    }
}

// ============================================================================
// Avian adapter
// ============================================================================

/// The car's Avian components seen as a [`RigidBodyHandle`].
struct AvianBody<'w> {
    position: Mut<'w, Position>,
    rotation: Mut<'w, Rotation>,
    linear: Mut<'w, LinearVelocity>,
    angular: Mut<'w, AngularVelocity>,
}

impl RigidBodyHandle for AvianBody<'_> {
    fn position(&self) -> Vec3 {
        self.position.0
    }

    fn rotation(&self) -> Quat {
        self.rotation.0
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear.0
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular.0
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear.0 = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular.0 = velocity;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation.0 = rotation;
    }

    fn teleport(&mut self, position: Vec3, rotation: Quat) {
        self.position.0 = position;
        self.rotation.0 = rotation;
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Run commands and dynamics, then write velocities for the coming physics step.
#[allow(clippy::type_complexity)]
fn drive_car(
    time: Res<Time<Fixed>>,
    mut rig: ResMut<DriveRig>,
    mut pending: ResMut<PendingDriveInput>,
    mut car: Query<
        (
            &mut Position,
            &mut Rotation,
            &mut LinearVelocity,
            &mut AngularVelocity,
        ),
        With<Car>,
    >,
) {
    let Ok((position, rotation, linear, angular)) = car.single_mut() else {
        return;
    };
    let mut body = AvianBody {
        position,
        rotation,
        linear,
        angular,
    };

    let input = pending.take_frame_input();
    rig.drive(&mut body, &input, time.delta_secs());
}

/// Read the solved pose, update zones and publish the readout.
fn observe_car(
    mut rig: ResMut<DriveRig>,
    mut readout: ResMut<LatestReadout>,
    car: Query<(&Position, &Rotation), With<Car>>,
) {
    let Ok((position, rotation)) = car.single() else {
        return;
    };
    let transform = VehicleTransform {
        position: position.0,
        rotation: rotation.0,
    };

    rig.track_zones(&transform);
    readout.0 = rig.readout(&transform);
}

/// Append one telemetry row for the tick.
fn emit_car_telemetry(
    time: Res<Time<Fixed>>,
    rig: Res<DriveRig>,
    pending: Res<PendingDriveInput>,
    mut telemetry: ResMut<DriveTelemetry>,
    car: Query<(&Position, &Rotation, &LinearVelocity, &AngularVelocity), With<Car>>,
) {
    let Ok((position, rotation, linear, angular)) = car.single() else {
        return;
    };

    let dt = time.delta_secs();
    telemetry.elapsed += dt;
    let snapshot = TelemetrySnapshot {
        elapsed: telemetry.elapsed,
        dt,
        controls: pending.controls,
        output: *rig.last_output(),
        state: *rig.dynamics().state(),
        transform: VehicleTransform {
            position: position.0,
            rotation: rotation.0,
        },
        linear_vel: linear.0,
        angular_vel: angular.0,
        zone: rig.zones().current().map(|zone| zone.name.as_str()),
    };
    emit_telemetry_to(&snapshot, telemetry.output.as_mut());
}
