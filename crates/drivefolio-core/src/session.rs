//! Per-frame control loop.
//!
//! [`DriveController`] runs the fixed order input → dynamics → bridge write,
//! and after the physics engine has stepped, bridge read → zones → camera.
//! It never steps the engine itself, so an engine with its own schedule (the
//! Bevy client) can call the two halves from different systems.
//!
//! [`DriveSession`] pairs a controller with a [`PhysicsWorld`] it steps on a
//! fixed schedule, for headless use.

use crate::{
    bridge::{PhysicsBridge, PhysicsWorld, RigidBodyHandle, VehicleTransform},
    camera::{CameraState, ChaseCamera},
    clock::{FrameClock, FrameDelta, StepSchedule},
    config::DriveConfig,
    dynamics::{DynamicsOutput, VehicleDynamics},
    error::{Error, Result},
    hud::DriveReadout,
    input::FrameInput,
    zone::{ZoneDetector, ZoneSink, ZoneTransition},
};

/// Result of the pre-physics half of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveStep {
    /// Sanitized frame delta.
    pub delta: FrameDelta,
    /// What dynamics asked the bridge to write.
    pub output: DynamicsOutput,
}

/// Result of the post-physics half of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub transform: VehicleTransform,
    pub camera: CameraState,
    pub zone_transition: Option<ZoneTransition>,
    pub readout: DriveReadout,
}

/// Dynamics, bridge, zone detector and camera wired together.
pub struct DriveController<S> {
    clock: FrameClock,
    dynamics: VehicleDynamics,
    bridge: PhysicsBridge,
    zones: ZoneDetector<S>,
    camera: ChaseCamera,
    last_output: DynamicsOutput,
}

impl<S: ZoneSink> DriveController<S> {
    /// Validate `config` and build a controller reporting zones to `sink`.
    pub fn new(config: DriveConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let DriveConfig {
            dynamics,
            boost,
            camera,
            clock,
            spawn,
            zones,
        } = config;

        Ok(Self {
            clock: FrameClock::new(&clock),
            bridge: PhysicsBridge::new(dynamics.upright_damping, &spawn),
            dynamics: VehicleDynamics::new(dynamics, boost),
            zones: ZoneDetector::new(zones, sink),
            camera: ChaseCamera::new(camera),
            last_output: DynamicsOutput::default(),
        })
    }

    pub fn dynamics(&self) -> &VehicleDynamics {
        &self.dynamics
    }

    pub fn bridge(&self) -> &PhysicsBridge {
        &self.bridge
    }

    pub fn zones(&self) -> &ZoneDetector<S> {
        &self.zones
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        self.zones.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.zones.sink_mut()
    }

    /// Dynamics output from the most recent frame.
    pub fn last_output(&self) -> &DynamicsOutput {
        &self.last_output
    }

    /// Run commands and dynamics for one frame and write the result into `body`.
    ///
    /// Commands apply even when the frame delta is unusable; integration does not.
    pub fn drive<B: RigidBodyHandle + ?Sized>(
        &mut self,
        body: &mut B,
        input: &FrameInput,
        raw_dt: f32,
    ) -> DriveStep {
        let delta = self.clock.sanitize(raw_dt);

        if input.reset_requested() {
            self.reset(body);
        }
        if input.boost_requested() {
            self.dynamics.try_boost();
        }

        let dt = delta.seconds().unwrap_or(0.0);
        let output = self.dynamics.step(&input.controls, dt);
        self.bridge.apply(body, &output, dt);
        self.last_output = output;

        DriveStep { delta, output }
    }

    /// Restore the spawn pose, stop the car and clear boost state.
    pub fn reset<B: RigidBodyHandle + ?Sized>(&mut self, body: &mut B) {
        self.dynamics.reset();
        self.bridge.reset(body);
        self.camera.snap_next();
        self.last_output = DynamicsOutput::default();
        tracing::info!("Vehicle reset to spawn at {}", self.bridge.spawn().position);
    }

    /// Read `body` after the engine has stepped, then update zones and camera.
    pub fn observe<B: RigidBodyHandle + ?Sized>(&mut self, body: &B, dt: f32) -> Observation {
        let transform = self.bridge.read(body);
        let zone_transition = self.track_zones(&transform);
        let camera = self.follow_camera(&transform, dt);
        Observation {
            transform,
            camera,
            zone_transition,
            readout: self.readout(&transform),
        }
    }

    /// Zone detection step on its own.
    pub fn track_zones(&mut self, transform: &VehicleTransform) -> Option<ZoneTransition> {
        self.zones.update(transform.ground_point())
    }

    /// Camera step on its own, for hosts that render at a different rate.
    pub fn follow_camera(&mut self, transform: &VehicleTransform, dt: f32) -> CameraState {
        self.camera.update(transform, dt)
    }

    /// Readout for audio and UI at `transform`.
    pub fn readout(&self, transform: &VehicleTransform) -> DriveReadout {
        let state = self.dynamics.state();
        DriveReadout {
            speed: state.speed,
            drifting: self.last_output.drifting,
            boost_active: state.boost_active,
            boost_cooldown_remaining: state.boost_cooldown_remaining,
            position: transform.position,
            yaw: transform.yaw(),
        }
    }
}

/// Everything one [`DriveSession::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub step: DriveStep,
    /// Fixed physics steps run this frame.
    pub physics_steps: u32,
    pub observation: Observation,
}

/// A controller that also owns and steps its physics world.
pub struct DriveSession<W, S> {
    controller: DriveController<S>,
    world: W,
    schedule: StepSchedule,
}

impl<W: PhysicsWorld, S: ZoneSink> DriveSession<W, S> {
    pub fn builder() -> DriveSessionBuilder<W, S> {
        DriveSessionBuilder::new()
    }

    pub fn controller(&self) -> &DriveController<S> {
        &self.controller
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Run one frame: drive, step physics on the fixed schedule, observe.
    pub fn tick(&mut self, input: &FrameInput, raw_dt: f32) -> FrameReport {
        let step = self
            .controller
            .drive(self.world.vehicle_mut(), input, raw_dt);

        let (dt, physics_steps) = match step.delta {
            FrameDelta::Step(dt) => (dt, self.schedule.advance(dt)),
            FrameDelta::Skip => (0.0, 0),
        };
        let fixed_step = self.schedule.fixed_step();
        for _ in 0..physics_steps {
            self.world.step(fixed_step);
        }

        let observation = self.controller.observe(self.world.vehicle(), dt);
        FrameReport {
            step,
            physics_steps,
            observation,
        }
    }
}

/// Two-phase construction for [`DriveSession`].
pub struct DriveSessionBuilder<W, S> {
    config: DriveConfig,
    world: Option<W>,
    sink: Option<S>,
}

impl<W, S> Default for DriveSessionBuilder<W, S> {
    fn default() -> Self {
        Self {
            config: DriveConfig::default(),
            world: None,
            sink: None,
        }
    }
}

impl<W: PhysicsWorld, S: ZoneSink> DriveSessionBuilder<W, S> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: DriveConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn world(mut self, world: W) -> Self {
        self.world = Some(world);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Wire the session and place the vehicle at its spawn pose.
    pub fn build(self) -> Result<DriveSession<W, S>> {
        let mut world = self.world.ok_or(Error::MissingCollaborator {
            name: "physics world",
        })?;
        let sink = self
            .sink
            .ok_or(Error::MissingCollaborator { name: "zone sink" })?;

        let schedule = StepSchedule::new(&self.config.clock);
        let zone_count = self.config.zones.len();
        let mut controller = DriveController::new(self.config, sink)?;
        controller.reset(world.vehicle_mut());

        tracing::info!(
            "Drive session ready with {} zone(s), fixed step {:.4}s",
            zone_count,
            schedule.fixed_step()
        );

        Ok(DriveSession {
            controller,
            world,
            schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        clock::NOMINAL_TICK,
        flat::FlatGroundWorld,
        input::{DriveCommand, DriveControls},
        zone::NullZoneSink,
    };

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl ZoneSink for RecordingSink {
        fn show_zone_info(&mut self, name: &str, _description: &str, _action: &str) {
            self.calls.push(format!("show {name}"));
        }

        fn hide_zone_info(&mut self) {
            self.calls.push("hide".to_string());
        }
    }

    fn session() -> DriveSession<FlatGroundWorld, RecordingSink> {
        DriveSession::builder()
            .world(FlatGroundWorld::default())
            .sink(RecordingSink::default())
            .build()
            .unwrap()
    }

    fn accelerate() -> FrameInput {
        FrameInput::new(DriveControls {
            accelerate: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_build_requires_world() {
        let result = DriveSessionBuilder::<FlatGroundWorld, NullZoneSink>::new()
            .sink(NullZoneSink)
            .build();
        assert!(matches!(
            result,
            Err(Error::MissingCollaborator {
                name: "physics world"
            })
        ));
    }

    #[test]
    fn test_build_requires_sink() {
        let result = DriveSessionBuilder::<FlatGroundWorld, NullZoneSink>::new()
            .world(FlatGroundWorld::default())
            .build();
        assert!(matches!(
            result,
            Err(Error::MissingCollaborator { name: "zone sink" })
        ));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = DriveConfig::default();
        config.dynamics.max_speed = -1.0;
        let result = DriveSession::builder()
            .config(config)
            .world(FlatGroundWorld::default())
            .sink(NullZoneSink)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_build_places_vehicle_at_spawn() {
        let session = session();
        assert_eq!(session.world().vehicle().position(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_reset_restores_spawn_and_stops() {
        let mut session = session();
        for _ in 0..120 {
            session.tick(&accelerate(), NOMINAL_TICK);
        }
        assert!(session.controller().dynamics().state().speed > 50.0);

        let report = session.tick(
            &FrameInput::default().with_command(DriveCommand::Reset),
            NOMINAL_TICK,
        );
        let state = session.controller().dynamics().state();
        assert_eq!(state.speed, 0.0);
        assert!(!state.boost_active);
        assert_eq!(state.boost_cooldown_remaining, 0.0);
        // One fixed step of gravity ran after the teleport.
        let position = report.observation.transform.position;
        assert!((position.x).abs() < 1e-5 && (position.z).abs() < 1e-5);
        assert!(position.y <= 2.0 && position.y > 1.9);
        let velocity = session.world().vehicle().linear_velocity();
        assert!(velocity.x.abs() < 1e-5 && velocity.z.abs() < 1e-5);
    }

    #[test]
    fn test_reset_applies_on_skipped_frame() {
        let mut session = session();
        for _ in 0..60 {
            session.tick(&accelerate(), NOMINAL_TICK);
        }
        let report = session.tick(
            &FrameInput::default().with_command(DriveCommand::Reset),
            f32::NAN,
        );
        assert_eq!(report.step.delta, FrameDelta::Skip);
        assert_eq!(report.physics_steps, 0);
        assert_eq!(session.controller().dynamics().state().speed, 0.0);
        assert_eq!(report.observation.transform.position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_driving_forward_enters_contact_zone() {
        let mut session = session();
        let mut entered = None;
        for tick in 0..300 {
            let report = session.tick(&accelerate(), NOMINAL_TICK);
            if let Some(transition) = report.observation.zone_transition {
                entered = Some((tick, transition));
                break;
            }
        }
        // Straight down -Z from the origin reaches Contact at (0, -40).
        let (tick, transition) = entered.unwrap();
        assert_eq!(transition, ZoneTransition::Entered(2));
        assert!(tick > 60 && tick < 180);
        assert_eq!(session.controller().sink().calls, vec!["show Contact"]);
    }

    #[test]
    fn test_reset_leaves_zone_once() {
        let mut session = session();
        for _ in 0..300 {
            let report = session.tick(&accelerate(), NOMINAL_TICK);
            if report.observation.zone_transition.is_some() {
                break;
            }
        }
        let report = session.tick(
            &FrameInput::default().with_command(DriveCommand::Reset),
            NOMINAL_TICK,
        );
        assert_eq!(
            report.observation.zone_transition,
            Some(ZoneTransition::Exited(2))
        );
        session.tick(&FrameInput::default(), NOMINAL_TICK);
        assert_eq!(session.controller().sink().calls, vec!["show Contact", "hide"]);
    }

    #[test]
    fn test_boost_command_reaches_readout() {
        let mut session = session();
        let report = session.tick(&accelerate().with_command(DriveCommand::Boost), NOMINAL_TICK);
        assert!(report.observation.readout.boost_active);
        assert!(!report.observation.readout.boost_ready());
    }

    #[test]
    fn test_long_frame_caps_physics_steps() {
        let mut session = session();
        let report = session.tick(&FrameInput::default(), 5.0);
        assert_eq!(report.step.delta, FrameDelta::Step(0.1));
        assert_eq!(report.physics_steps, 3);
    }

    #[test]
    fn test_clock_counts_only_sanitized_time() {
        let mut session = session();
        session.tick(&FrameInput::default(), 5.0);
        session.tick(&FrameInput::default(), f32::NAN);
        session.tick(&FrameInput::default(), 0.05);
        assert!((session.controller().clock().elapsed() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_controller_observe_without_session() {
        let mut controller = DriveController::new(DriveConfig::default(), NullZoneSink).unwrap();
        let mut world = FlatGroundWorld::default();
        controller.reset(world.vehicle_mut());

        world.vehicle_mut().teleport(Vec3::new(-20.0, 0.4, -20.0), glam::Quat::IDENTITY);
        let observation = controller.observe(world.vehicle(), NOMINAL_TICK);
        assert_eq!(observation.zone_transition, Some(ZoneTransition::Entered(0)));
        assert_eq!(
            controller.zones().current().map(|z| z.name.as_str()),
            Some("Projects")
        );
    }
}
