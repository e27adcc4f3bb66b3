//! World setup: physics, ground, zone markers, lights, car and camera.

use std::time::Duration;

use avian3d::prelude::*;
use bevy::{light::light_consts::lux, prelude::*};
use drivefolio_core::{DriveConfig, VehicleTransform, flat};

use crate::{
    camera::ChaseCamera,
    input::default_drive_input_map,
    vehicle::Car,
};

/// Car body dimensions (width, height, length) in meters.
const CAR_SIZE: Vec3 = Vec3::new(2.0, 2.0 * flat::REST_HEIGHT, 4.0);

/// Car mass in kilograms.
const CAR_MASS: f32 = 150.0;

/// Side length of the ground slab in meters.
const GROUND_SIZE: f32 = 200.0;

/// Height of the translucent zone marker discs.
const ZONE_MARKER_HEIGHT: f32 = 0.1;

/// Drive settings loaded at launch.
#[derive(Resource, Deref)]
pub struct DriveSettings(pub DriveConfig);

/// Plugin for the physics world and scene.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default())
            .insert_resource(Gravity(Vec3::NEG_Y * flat::GRAVITY))
            .insert_resource(ClearColor(Color::srgb(0.53, 0.81, 0.92)))
            .add_systems(Startup, (configure_clock, setup_scene));
    }
}

/// Match the fixed timestep and frame catch-up limit to the clock settings.
fn configure_clock(
    settings: Res<DriveSettings>,
    mut fixed: ResMut<Time<Fixed>>,
    mut virtual_time: ResMut<Time<Virtual>>,
) {
    let clock = &settings.clock;
    fixed.set_timestep_seconds(f64::from(clock.fixed_step));
    // Never run more than `max_substeps` fixed steps for one frame.
    virtual_time.set_max_delta(Duration::from_secs_f32(
        clock.fixed_step * clock.max_substeps as f32,
    ));
    tracing::info!(
        "Physics at {:.1} Hz, at most {} step(s) per frame",
        1.0 / clock.fixed_step,
        clock.max_substeps
    );
}

/// Spawn the ground, zone markers, lights, car and camera.
fn setup_scene(
    mut commands: Commands,
    settings: Res<DriveSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Ground slab with its top face at y = 0.
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, 1.0, GROUND_SIZE),
        Mesh3d(meshes.add(Cuboid::new(GROUND_SIZE, 1.0, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.6, 0.3),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    // Zone markers: visual only, detection happens in the drive controller.
    for zone in &settings.zones {
        commands.spawn((
            Name::new(format!("Zone: {}", zone.name)),
            Mesh3d(meshes.add(Cylinder::new(zone.radius, ZONE_MARKER_HEIGHT))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(1.0, 0.85, 0.3, 0.35),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::from_xyz(zone.center.x, ZONE_MARKER_HEIGHT / 2.0, zone.center.y),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(30.0, 50.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // The car. Velocities are written by the drive controller each fixed tick.
    let spawn = VehicleTransform::from(&settings.spawn);
    commands.spawn((
        Name::new("Car"),
        Car,
        RigidBody::Dynamic,
        Collider::cuboid(CAR_SIZE.x, CAR_SIZE.y, CAR_SIZE.z),
        Mass(CAR_MASS),
        Position(spawn.position),
        Rotation(spawn.rotation),
        Transform::from_translation(spawn.position).with_rotation(spawn.rotation),
        LinearVelocity::default(),
        AngularVelocity::default(),
        Mesh3d(meshes.add(Cuboid::from_size(CAR_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.15, 0.15),
            metallic: 0.3,
            perceptual_roughness: 0.4,
            ..default()
        })),
        default_drive_input_map(),
    ));

    let camera = &settings.camera;
    commands.spawn((
        Camera3d::default(),
        ChaseCamera,
        Transform::from_translation(camera.initial_position).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    tracing::info!(
        "Scene setup complete with {} zone(s) - use WASD to drive",
        settings.zones.len()
    );
}
