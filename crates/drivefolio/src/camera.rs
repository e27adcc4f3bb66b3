//! Chase camera.
//!
//! Third-person camera that trails the car. Smoothing runs on render frames
//! so the camera stays fluid regardless of the physics rate.

use avian3d::prelude::*;
use bevy::prelude::*;
use drivefolio_core::VehicleTransform;

use crate::vehicle::{Car, DriveRig};

/// Plugin for the chase camera.
pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, follow_car.before(TransformSystems::Propagate));
    }
}

/// Marker for the camera that follows the car.
#[derive(Component)]
pub struct ChaseCamera;

/// Ease the camera toward its spot behind the car and look ahead of it.
fn follow_car(
    time: Res<Time>,
    mut rig: ResMut<DriveRig>,
    car: Query<(&Position, &Rotation), With<Car>>,
    mut camera: Query<&mut Transform, (With<ChaseCamera>, Without<Car>)>,
) {
    let Ok((position, rotation)) = car.single() else {
        return;
    };
    let Ok(mut camera_transform) = camera.single_mut() else {
        return;
    };

    let vehicle = VehicleTransform {
        position: position.0,
        rotation: rotation.0,
    };
    let state = rig.follow_camera(&vehicle, time.delta_secs());

    *camera_transform =
        Transform::from_translation(state.position).looking_to(state.look_direction(), Vec3::Y);
}
