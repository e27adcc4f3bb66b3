//! Chase camera.
//!
//! Third-person camera that trails the vehicle. The desired pose is a rigid
//! function of the vehicle transform; the actual pose eases toward it each
//! tick so the camera lags behind turns and speed changes.

use glam::{Quat, Vec3};

use crate::{
    bridge::VehicleTransform,
    clock::per_tick,
    config::CameraRig,
};

/// Camera pose handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
}

impl CameraState {
    /// Normalized direction from the camera to its target.
    pub fn look_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }
}

/// Smoothed chase camera.
#[derive(Clone, Debug)]
pub struct ChaseCamera {
    rig: CameraRig,
    state: Option<CameraState>,
}

impl ChaseCamera {
    pub fn new(rig: CameraRig) -> Self {
        Self { rig, state: None }
    }

    /// Current pose, or the rig's resting pose before the first update.
    pub fn state(&self) -> CameraState {
        self.state.unwrap_or(CameraState {
            position: self.rig.initial_position,
            target: Vec3::ZERO,
        })
    }

    /// Pose the camera wants for `vehicle`, ignoring smoothing.
    pub fn desired(&self, vehicle: &VehicleTransform) -> CameraState {
        let heading = Quat::from_rotation_y(vehicle.yaw());
        CameraState {
            position: vehicle.position + heading * self.rig.offset,
            target: vehicle.position + heading * self.rig.look_offset,
        }
    }

    /// Ease toward the desired pose for `vehicle` over `dt` seconds.
    ///
    /// The first update after construction or [`ChaseCamera::snap_next`]
    /// jumps straight to the desired pose.
    pub fn update(&mut self, vehicle: &VehicleTransform, dt: f32) -> CameraState {
        let desired = self.desired(vehicle);
        let next = match self.state {
            None => desired,
            Some(current) if dt.is_finite() && dt > 0.0 => {
                // Fraction of the gap closed this tick.
                let t = 1.0 - per_tick(1.0 - self.rig.smoothing, dt);
                CameraState {
                    position: current.position.lerp(desired.position, t),
                    target: current.target.lerp(desired.target, t),
                }
            }
            Some(current) => current,
        };
        self.state = Some(next);
        next
    }

    /// Make the next update jump to its desired pose (after a reset).
    pub fn snap_next(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::clock::NOMINAL_TICK;

    fn at(position: Vec3, yaw: f32) -> VehicleTransform {
        VehicleTransform {
            position,
            rotation: Quat::from_rotation_y(yaw),
        }
    }

    #[test]
    fn test_desired_pose_behind_and_above() {
        let camera = ChaseCamera::new(CameraRig::default());
        let desired = camera.desired(&at(Vec3::new(1.0, 2.0, 3.0), 0.0));
        assert!(
            desired
                .position
                .abs_diff_eq(Vec3::new(1.0, 10.0, 18.0), 1e-5)
        );
        assert!(desired.target.abs_diff_eq(Vec3::new(1.0, 4.0, -2.0), 1e-5));
    }

    #[test]
    fn test_offset_rotates_with_yaw() {
        let camera = ChaseCamera::new(CameraRig::default());
        // Facing +Z, the camera sits on the -Z side.
        let desired = camera.desired(&at(Vec3::ZERO, PI));
        assert!(
            desired
                .position
                .abs_diff_eq(Vec3::new(0.0, 8.0, -15.0), 1e-4)
        );
    }

    #[test]
    fn test_offset_ignores_pitch_and_roll() {
        let camera = ChaseCamera::new(CameraRig::default());
        let tilted = VehicleTransform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_x(0.3) * Quat::from_rotation_z(0.2),
        };
        let level = camera.desired(&at(Vec3::ZERO, 0.0));
        let desired = camera.desired(&tilted);
        assert!(desired.position.abs_diff_eq(level.position, 1e-4));
    }

    #[test]
    fn test_first_update_snaps() {
        let mut camera = ChaseCamera::new(CameraRig::default());
        let vehicle = at(Vec3::new(5.0, 0.0, 5.0), 0.0);
        let state = camera.update(&vehicle, NOMINAL_TICK);
        assert_eq!(state, camera.desired(&vehicle));
    }

    #[test]
    fn test_smoothing_closes_tenth_of_gap_per_tick() {
        let mut camera = ChaseCamera::new(CameraRig::default());
        camera.update(&at(Vec3::ZERO, 0.0), NOMINAL_TICK);
        let state = camera.update(&at(Vec3::new(10.0, 0.0, 0.0), 0.0), NOMINAL_TICK);
        assert!((state.position.x - 1.0).abs() < 1e-4);
        assert!((state.target.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_dt_holds_pose() {
        let mut camera = ChaseCamera::new(CameraRig::default());
        let first = camera.update(&at(Vec3::ZERO, 0.0), NOMINAL_TICK);
        let held = camera.update(&at(Vec3::new(50.0, 0.0, 0.0), 0.0), 0.0);
        assert_eq!(first, held);
    }

    #[test]
    fn test_converges_on_stationary_vehicle() {
        let mut camera = ChaseCamera::new(CameraRig::default());
        camera.update(&at(Vec3::ZERO, 0.0), NOMINAL_TICK);
        let vehicle = at(Vec3::new(30.0, 0.0, -30.0), 1.0);
        let mut state = camera.state();
        for _ in 0..600 {
            state = camera.update(&vehicle, NOMINAL_TICK);
        }
        assert!(state.position.abs_diff_eq(camera.desired(&vehicle).position, 1e-3));
    }

    #[test]
    fn test_snap_next_after_reset() {
        let mut camera = ChaseCamera::new(CameraRig::default());
        camera.update(&at(Vec3::new(100.0, 0.0, 0.0), 0.0), NOMINAL_TICK);
        camera.snap_next();
        let spawn = at(Vec3::ZERO, 0.0);
        assert_eq!(camera.update(&spawn, NOMINAL_TICK), camera.desired(&spawn));
    }
}
