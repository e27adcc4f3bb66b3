//! Physics bridge.
//!
//! Translates dynamics output into writes on a rigid body owned by an external
//! physics engine, and reads the body's transform back after the engine steps.
//! The bridge never creates, steps or destroys the body.

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::{
    clock::per_tick,
    config::SpawnPose,
    dynamics::DynamicsOutput,
};

/// World transform of the vehicle as reported by the physics engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl VehicleTransform {
    /// Heading about world up (radians, 0 faces -Z, positive turns left).
    pub fn yaw(&self) -> f32 {
        self.rotation.to_euler(EulerRot::YXZ).0
    }

    /// Forward direction (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Position projected onto the ground plane (x, z).
    pub fn ground_point(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

impl From<&SpawnPose> for VehicleTransform {
    fn from(spawn: &SpawnPose) -> Self {
        Self {
            position: spawn.position,
            rotation: Quat::from_rotation_y(spawn.yaw),
        }
    }
}

/// Access to a rigid body owned by the physics engine.
pub trait RigidBodyHandle {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn linear_velocity(&self) -> Vec3;
    fn angular_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
    /// Move the body without sweeping through the world.
    fn teleport(&mut self, position: Vec3, rotation: Quat);
}

/// A physics world that owns the vehicle body and can be stepped.
pub trait PhysicsWorld {
    type Body: RigidBodyHandle;

    fn vehicle(&self) -> &Self::Body;
    fn vehicle_mut(&mut self) -> &mut Self::Body;
    /// Advance the simulation by one fixed step.
    fn step(&mut self, dt: f32);
}

/// Writes dynamics output into a rigid body and reads its transform back.
#[derive(Clone, Debug)]
pub struct PhysicsBridge {
    upright_damping: f32,
    spawn: VehicleTransform,
}

impl PhysicsBridge {
    pub fn new(upright_damping: f32, spawn: &SpawnPose) -> Self {
        Self {
            upright_damping,
            spawn: VehicleTransform::from(spawn),
        }
    }

    /// Canonical spawn transform restored by [`PhysicsBridge::reset`].
    pub fn spawn(&self) -> VehicleTransform {
        self.spawn
    }

    /// Apply one tick of dynamics output to `body`.
    ///
    /// Yaw is applied as an incremental rotation about world up. Horizontal
    /// velocity is set along the new heading, keeping `slip` of the previous
    /// horizontal velocity per nominal tick. Vertical velocity belongs to the
    /// engine. Pitch and roll spin is damped toward zero; yaw spin is cleared
    /// because heading is controlled here.
    pub fn apply<B: RigidBodyHandle + ?Sized>(
        &self,
        body: &mut B,
        output: &DynamicsOutput,
        dt: f32,
    ) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let rotation = (Quat::from_rotation_y(output.yaw_delta) * body.rotation()).normalize();
        body.set_rotation(rotation);

        let forward = (rotation * Vec3::NEG_Z).with_y(0.0).normalize_or_zero();
        let target = forward * output.speed;
        let current = body.linear_velocity();
        let current_horizontal = current.with_y(0.0);
        let retain = per_tick(output.slip.clamp(0.0, 1.0), dt);
        let horizontal = target + (current_horizontal - target) * retain;
        body.set_linear_velocity(Vec3::new(horizontal.x, current.y, horizontal.z));

        let angular = body.angular_velocity();
        let damping = per_tick(self.upright_damping, dt);
        body.set_angular_velocity(Vec3::new(angular.x * damping, 0.0, angular.z * damping));
    }

    /// Read the body's transform after the engine has stepped.
    pub fn read<B: RigidBodyHandle + ?Sized>(&self, body: &B) -> VehicleTransform {
        VehicleTransform {
            position: body.position(),
            rotation: body.rotation(),
        }
    }

    /// Restore the spawn pose and stop all motion.
    pub fn reset<B: RigidBodyHandle + ?Sized>(&self, body: &mut B) {
        body.set_linear_velocity(Vec3::ZERO);
        body.set_angular_velocity(Vec3::ZERO);
        body.teleport(self.spawn.position, self.spawn.rotation);
    }
}
