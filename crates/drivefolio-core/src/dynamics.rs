//! Arcade vehicle dynamics.
//!
//! Pure speed/heading model with no engine dependencies. The physics body owns
//! the authoritative transform; this module only decides how fast the car
//! should be going along its heading and how quickly that heading turns.

use crate::{
    clock::per_tick,
    config::{BoostParams, DynamicsParams},
    input::DriveControls,
};

/// Boost timers are considered expired within this margin, so that summing
/// binary-inexact deltas still ends the boost on the expected tick.
const TIMER_EPSILON: f32 = 1e-4;

/// Mutable state owned by [`VehicleDynamics`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleState {
    /// Signed speed along the heading (m/s, positive = forward).
    pub speed: f32,
    /// Whether a boost is running.
    pub boost_active: bool,
    /// Time left on the running boost (seconds).
    pub boost_remaining: f32,
    /// Time left before another boost may start (seconds).
    pub boost_cooldown_remaining: f32,
}

/// Result of one dynamics step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DynamicsOutput {
    /// Speed after this step.
    pub speed: f32,
    /// Yaw rate (rad/s, positive = left).
    pub yaw_rate: f32,
    /// Heading change to apply this step (radians).
    pub yaw_delta: f32,
    /// Whether the car is drifting (drives particles and tyre audio).
    pub drifting: bool,
    /// Fraction of the previous horizontal velocity to keep per nominal tick.
    pub slip: f32,
}

/// Speed/heading integrator with timed boost.
#[derive(Clone, Debug)]
pub struct VehicleDynamics {
    params: DynamicsParams,
    boost: BoostParams,
    state: VehicleState,
}

impl VehicleDynamics {
    pub fn new(params: DynamicsParams, boost: BoostParams) -> Self {
        Self {
            params,
            boost,
            state: VehicleState::default(),
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn params(&self) -> &DynamicsParams {
        &self.params
    }

    /// Top forward speed for the current boost state.
    pub fn effective_max_speed(&self) -> f32 {
        if self.state.boost_active {
            self.params.max_speed * self.boost.max_speed_multiplier
        } else {
            self.params.max_speed
        }
    }

    /// Start a boost if none is running and the cooldown has elapsed.
    ///
    /// Returns whether the boost started. Rejected requests leave all timers untouched.
    pub fn try_boost(&mut self) -> bool {
        if self.state.boost_active || self.state.boost_cooldown_remaining > 0.0 {
            tracing::debug!(
                "Boost rejected (active: {}, cooldown: {:.2}s)",
                self.state.boost_active,
                self.state.boost_cooldown_remaining
            );
            return false;
        }

        self.state.boost_active = true;
        self.state.boost_remaining = self.boost.duration;
        tracing::debug!("Boost started for {:.2}s", self.boost.duration);
        true
    }

    /// Zero speed and clear all boost timers.
    pub fn reset(&mut self) {
        self.state = VehicleState::default();
    }

    /// Turn authority at `speed`: 1.0 at standstill falling linearly to
    /// `min_turn_effectiveness` at `max_speed` and beyond.
    pub fn turn_effectiveness(&self, speed: f32) -> f32 {
        let p = &self.params;
        let speed_ratio = (speed.abs() / p.max_speed).clamp(0.0, 1.0);
        1.0 - speed_ratio * (1.0 - p.min_turn_effectiveness)
    }

    /// Advance one tick.
    ///
    /// A non-positive or non-finite `dt` leaves the state untouched and
    /// reports zero rotation.
    pub fn step(&mut self, controls: &DriveControls, dt: f32) -> DynamicsOutput {
        if !dt.is_finite() || dt <= 0.0 {
            return DynamicsOutput {
                speed: self.state.speed,
                ..Default::default()
            };
        }

        self.update_boost_timers(dt);

        let p = &self.params;
        let max_speed = self.effective_max_speed();
        // Boost only lifts the forward limit.
        let reverse_limit = p.max_speed * p.reverse_ratio;
        let acceleration = if self.state.boost_active {
            p.acceleration * self.boost.acceleration_multiplier
        } else {
            p.acceleration
        };

        // Target speed.
        let mut target = if controls.accelerate {
            max_speed
        } else if controls.reverse {
            -reverse_limit
        } else {
            0.0
        };
        if controls.brake {
            target *= p.brake_target_factor;
        }

        // Integrate toward target.
        let speed = self.state.speed;
        let mut new_speed = if !controls.has_drive_input() {
            move_toward(speed, 0.0, p.deceleration * p.idle_friction_ratio * dt)
        } else if is_speeding_up(speed, target) {
            move_toward(speed, target, acceleration * dt)
        } else {
            move_toward(speed, target, p.deceleration * dt)
        };

        if controls.brake {
            new_speed *= per_tick(p.brake_decay, dt);
        }
        if target == 0.0 && new_speed.abs() < p.stop_epsilon {
            new_speed = 0.0;
        }
        new_speed = new_speed.clamp(-reverse_limit, max_speed);
        self.state.speed = new_speed;

        // Steering.
        let intensity = controls.turn_intensity();
        let yaw_rate = p.turn_speed * intensity * self.turn_effectiveness(new_speed);

        // Drift and slip.
        let sliding = intensity.abs() > p.drift_turn_threshold
            && new_speed.abs() > p.drift_speed_ratio * p.max_speed;
        let drifting = sliding && !controls.brake;
        let slip = match (sliding, controls.brake) {
            (false, _) => 0.0,
            (true, false) => p.drift_slip,
            (true, true) => p.drift_slip * p.brake_slip_scale,
        };

        DynamicsOutput {
            speed: new_speed,
            yaw_rate,
            yaw_delta: yaw_rate * dt,
            drifting,
            slip,
        }
    }

    /// Count down the running boost, then the cooldown that follows it.
    fn update_boost_timers(&mut self, dt: f32) {
        let state = &mut self.state;
        if state.boost_active {
            state.boost_remaining -= dt;
            if state.boost_remaining <= TIMER_EPSILON {
                // Carry any overshoot into the cooldown so the total stays exact.
                let overshoot = (-state.boost_remaining).max(0.0);
                state.boost_active = false;
                state.boost_remaining = 0.0;
                state.boost_cooldown_remaining = (self.boost.cooldown - overshoot).max(0.0);
                tracing::debug!("Boost ended, cooldown {:.2}s", self.boost.cooldown);
            }
        } else if state.boost_cooldown_remaining > 0.0 {
            state.boost_cooldown_remaining -= dt;
            if state.boost_cooldown_remaining <= TIMER_EPSILON {
                state.boost_cooldown_remaining = 0.0;
            }
        }
    }
}

/// Whether moving from `speed` to `target` grows speed in the target's direction.
fn is_speeding_up(speed: f32, target: f32) -> bool {
    target.abs() > speed.abs() && (speed == 0.0 || speed.signum() == target.signum())
}

/// Move a value toward a target by a maximum delta.
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::clock::NOMINAL_TICK;

    fn dynamics() -> VehicleDynamics {
        VehicleDynamics::new(DynamicsParams::default(), BoostParams::default())
    }

    fn accelerate() -> DriveControls {
        DriveControls {
            accelerate: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_acceleration_from_rest() {
        let mut d = dynamics();
        let out = d.step(&accelerate(), 1.0);
        assert_eq!(out.speed, 30.0);
        d.step(&accelerate(), 1.0);
        let out = d.step(&accelerate(), 1.0);
        assert_eq!(out.speed, 80.0);
    }

    #[test]
    fn test_reverse_is_limited_to_half_max() {
        let mut d = dynamics();
        let controls = DriveControls {
            reverse: true,
            ..Default::default()
        };
        for _ in 0..10 {
            d.step(&controls, 1.0);
        }
        assert_eq!(d.state().speed, -40.0);
    }

    #[test]
    fn test_coasting_reaches_exact_zero() {
        let mut d = dynamics();
        for _ in 0..5 {
            d.step(&accelerate(), 1.0);
        }
        let idle = DriveControls::default();
        let mut ticks = 0;
        while d.state().speed != 0.0 {
            d.step(&idle, 1.0 / 60.0);
            ticks += 1;
            assert!(ticks < 600, "speed never settled: {}", d.state().speed);
        }
        assert_eq!(d.state().speed, 0.0);
    }

    #[test]
    fn test_brake_slows_faster_than_coasting() {
        let mut coasting = dynamics();
        let mut braking = dynamics();
        for _ in 0..3 {
            coasting.step(&accelerate(), 1.0);
            braking.step(&accelerate(), 1.0);
        }
        let brake = DriveControls {
            brake: true,
            ..Default::default()
        };
        for _ in 0..30 {
            coasting.step(&DriveControls::default(), 1.0 / 60.0);
            braking.step(&brake, 1.0 / 60.0);
        }
        assert!(braking.state().speed < coasting.state().speed);
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut d = dynamics();
        d.step(&accelerate(), 1.0);
        assert!(d.try_boost());
        let before = d.state().clone();
        let controls = DriveControls {
            accelerate: true,
            turn_left: true,
            ..Default::default()
        };
        for dt in [0.0, -1.0, f32::NAN] {
            let out = d.step(&controls, dt);
            assert_eq!(out.yaw_delta, 0.0);
            assert_eq!(out.speed, before.speed);
        }
        assert_eq!(d.state(), &before);
    }

    #[test]
    fn test_boost_raises_speed_cap() {
        let mut d = dynamics();
        for _ in 0..3 {
            d.step(&accelerate(), 1.0);
        }
        assert!(d.try_boost());
        assert_eq!(d.effective_max_speed(), 120.0);
        let out = d.step(&accelerate(), 0.5);
        // Boosted acceleration is 60 m/s².
        assert_eq!(out.speed, 110.0);
    }

    #[test]
    fn test_boost_lifecycle() {
        let mut d = dynamics();
        let idle = DriveControls::default();
        assert!(d.try_boost());
        assert!(d.state().boost_active);

        // 2 s of boost in quarter-second ticks.
        for i in 0..8 {
            assert!(d.state().boost_active, "ended early at tick {i}");
            d.step(&idle, 0.25);
        }
        assert!(!d.state().boost_active);
        assert_eq!(d.state().boost_cooldown_remaining, 3.0);

        // Cooldown decreases monotonically to zero over 3 s.
        let mut last = d.state().boost_cooldown_remaining;
        for _ in 0..12 {
            d.step(&idle, 0.25);
            let now = d.state().boost_cooldown_remaining;
            assert!(now < last || now == 0.0);
            last = now;
        }
        assert_eq!(d.state().boost_cooldown_remaining, 0.0);
        assert!(d.try_boost());
    }

    #[test]
    fn test_boost_ends_on_exact_tick_at_nominal_rate() {
        let mut d = dynamics();
        let idle = DriveControls::default();
        assert!(d.try_boost());

        for _ in 0..119 {
            d.step(&idle, NOMINAL_TICK);
        }
        assert!(d.state().boost_active, "boost ended before 2 s");
        d.step(&idle, NOMINAL_TICK);
        assert!(!d.state().boost_active, "boost outlasted 2 s");
        assert!((d.state().boost_cooldown_remaining - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_boost_does_not_raise_reverse_limit() {
        let mut d = dynamics();
        let reverse = DriveControls {
            reverse: true,
            ..Default::default()
        };
        for _ in 0..3 {
            d.step(&reverse, 1.0);
        }
        assert_eq!(d.state().speed, -40.0);

        assert!(d.try_boost());
        let out = d.step(&reverse, 0.5);
        assert_eq!(out.speed, -40.0);
        assert_eq!(d.state().speed, -40.0);
    }

    #[test]
    fn test_boost_rejected_during_cooldown() {
        let mut d = dynamics();
        assert!(d.try_boost());
        d.step(&DriveControls::default(), 2.0);
        let cooling = d.state().clone();
        assert!(cooling.boost_cooldown_remaining > 0.0);

        assert!(!d.try_boost());
        assert_eq!(d.state(), &cooling);
    }

    #[test]
    fn test_boost_rejected_while_active() {
        let mut d = dynamics();
        assert!(d.try_boost());
        d.step(&DriveControls::default(), 0.5);
        let running = d.state().clone();
        assert!(!d.try_boost());
        assert_eq!(d.state(), &running);
    }

    #[test]
    fn test_speed_clamped_when_boost_ends() {
        let mut d = dynamics();
        assert!(d.try_boost());
        for _ in 0..3 {
            d.step(&accelerate(), 0.5);
        }
        assert!(d.state().speed > 80.0);
        d.step(&accelerate(), 0.5);
        assert!(!d.state().boost_active);
        assert!(d.state().speed <= 80.0);
    }

    #[test]
    fn test_turn_effectiveness_falls_with_speed() {
        let d = dynamics();
        assert_eq!(d.turn_effectiveness(0.0), 1.0);
        assert_eq!(d.turn_effectiveness(80.0), 0.5);
        assert_eq!(d.turn_effectiveness(-80.0), 0.5);
        assert_eq!(d.turn_effectiveness(200.0), 0.5);
    }

    #[test]
    fn test_yaw_at_rest_exceeds_yaw_at_top_speed() {
        let turn = DriveControls {
            turn_left: true,
            ..Default::default()
        };
        let mut resting = dynamics();
        let at_rest = resting.step(&turn, 0.1);

        let mut fast = dynamics();
        for _ in 0..5 {
            fast.step(&accelerate(), 1.0);
        }
        let at_top = fast.step(
            &DriveControls {
                accelerate: true,
                turn_left: true,
                ..Default::default()
            },
            0.1,
        );

        assert!(at_rest.yaw_delta > 0.0);
        assert!(at_rest.yaw_delta >= at_top.yaw_delta);
    }

    #[test]
    fn test_turn_direction() {
        let mut d = dynamics();
        let left = d.step(
            &DriveControls {
                turn_left: true,
                ..Default::default()
            },
            0.1,
        );
        let right = d.step(
            &DriveControls {
                turn_right: true,
                ..Default::default()
            },
            0.1,
        );
        assert!(left.yaw_rate > 0.0);
        assert!(right.yaw_rate < 0.0);
    }

    #[test]
    fn test_drift_requires_speed_turn_and_no_brake() {
        let mut d = dynamics();
        let hard_left = DriveControls {
            accelerate: true,
            turn_left: true,
            ..Default::default()
        };

        // Slow: no drift.
        let out = d.step(&hard_left, 0.5);
        assert!(!out.drifting);
        assert_eq!(out.slip, 0.0);

        // Fast: drift.
        for _ in 0..3 {
            d.step(&accelerate(), 1.0);
        }
        let out = d.step(&hard_left, 1.0 / 60.0);
        assert!(out.drifting);
        assert_eq!(out.slip, 0.9);

        // Braking: no drift flag, reduced slip.
        let out = d.step(
            &DriveControls {
                brake: true,
                ..hard_left
            },
            1.0 / 60.0,
        );
        assert!(!out.drifting);
        assert!((out.slip - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut d = dynamics();
        d.step(&accelerate(), 1.0);
        d.try_boost();
        d.reset();
        assert_eq!(d.state(), &VehicleState::default());
    }

    #[test]
    fn test_move_toward() {
        assert_eq!(move_toward(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_toward(9.0, 10.0, 3.0), 10.0);
        assert_eq!(move_toward(0.0, -10.0, 3.0), -3.0);
    }

    fn arb_controls() -> impl Strategy<Value = DriveControls> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(accelerate, reverse, turn_left, turn_right, brake)| DriveControls {
                    accelerate,
                    reverse,
                    turn_left,
                    turn_right,
                    brake,
                },
            )
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_effective_max(
            steps in prop::collection::vec((arb_controls(), 0.0f32..2.0, any::<bool>()), 1..60)
        ) {
            let mut d = dynamics();
            for (controls, dt, boost) in steps {
                if boost {
                    d.try_boost();
                }
                let out = d.step(&controls, dt);
                let max = d.effective_max_speed();
                prop_assert!(out.speed.is_finite());
                prop_assert!(out.speed <= max);
                prop_assert!(out.speed >= -DynamicsParams::default().max_speed * 0.5);
                prop_assert!(d.state().boost_cooldown_remaining >= 0.0);
            }
        }

        #[test]
        fn prop_turn_effectiveness_non_increasing(a in 0.0f32..80.0, b in 0.0f32..80.0) {
            let d = dynamics();
            let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(d.turn_effectiveness(slow) >= d.turn_effectiveness(fast));
        }
    }
}
