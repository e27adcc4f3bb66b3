//! Flat-ground physics for headless runs.
//!
//! A single body over an infinite plane at y = 0 with gravity. There are no
//! collisions beyond the ground contact, which is enough to exercise the
//! control loop without a real engine.

use glam::{Quat, Vec3};

use crate::bridge::{PhysicsWorld, RigidBodyHandle};

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.82;

/// Height of the body centre when resting on the ground (half the car's height).
pub const REST_HEIGHT: f32 = 0.4;

/// Rigid body state integrated by [`FlatGroundWorld`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatGroundBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Default for FlatGroundBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

impl RigidBodyHandle for FlatGroundBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn teleport(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }
}

/// Minimal world: gravity plus a ground plane.
#[derive(Clone, Debug)]
pub struct FlatGroundWorld {
    body: FlatGroundBody,
    gravity: f32,
    rest_height: f32,
    time: f32,
}

impl Default for FlatGroundWorld {
    fn default() -> Self {
        Self::new(GRAVITY, REST_HEIGHT)
    }
}

impl FlatGroundWorld {
    pub fn new(gravity: f32, rest_height: f32) -> Self {
        Self {
            body: FlatGroundBody::default(),
            gravity,
            rest_height,
            time: 0.0,
        }
    }

    /// Whether the body is resting on the ground.
    pub fn grounded(&self) -> bool {
        self.body.position.y <= self.rest_height + 1e-4
    }

    /// Simulated time (seconds).
    pub fn time(&self) -> f32 {
        self.time
    }
}

impl PhysicsWorld for FlatGroundWorld {
    type Body = FlatGroundBody;

    fn vehicle(&self) -> &FlatGroundBody {
        &self.body
    }

    fn vehicle_mut(&mut self) -> &mut FlatGroundBody {
        &mut self.body
    }

    fn step(&mut self, dt: f32) {
        let body = &mut self.body;

        // Semi-implicit Euler.
        body.linear_velocity.y -= self.gravity * dt;
        body.position += body.linear_velocity * dt;

        if body.position.y <= self.rest_height {
            body.position.y = self.rest_height;
            body.linear_velocity.y = body.linear_velocity.y.max(0.0);
        }

        let spin = body.angular_velocity * dt;
        if spin != Vec3::ZERO {
            body.rotation = (Quat::from_scaled_axis(spin) * body.rotation).normalize();
        }

        self.time += dt;
    }
}
