//! Headless drive tuner.
//!
//! Runs the full control loop against flat-ground physics through scripted
//! scenarios and reports how the car behaves with the current tuning.
//! Telemetry CSV goes to stdout; the summary goes to stderr.
//!
//! Run with: cargo run -p drivefolio-core --bin drive-tuning -- [scenario]
//! Example: cargo run -p drivefolio-core --bin drive-tuning -- tour --config drive.json > tour.csv

// clap and tracing-subscriber are native-only dependencies.
#[cfg(target_family = "wasm")]
fn main() {}

#[cfg(not(target_family = "wasm"))]
mod tuner {
    use std::{f32::consts::PI, path::PathBuf, process::ExitCode};

    use clap::{Parser, ValueEnum};
    use drivefolio_core::{
        DriveConfig, DriveControls, DriveSession, FlatGroundWorld, FrameInput, FrameReport,
        NullZoneSink, PhysicsWorld, RigidBodyHandle, VehicleTransform, ZoneTransition,
        input::DriveCommand,
        telemetry::{
            StdoutTelemetryOutput, TelemetryOutput, TelemetrySnapshot, emit_telemetry_to,
            reset_telemetry_to,
        },
    };
    use glam::Vec2;

    type Session = DriveSession<FlatGroundWorld, NullZoneSink>;

    /// Heading error below which the autopilot stops steering (radians).
    const HEADING_DEADBAND: f32 = 0.05;

    /// Speed the autopilot holds while touring zones (m/s).
    const TOUR_CRUISE_SPEED: f32 = 20.0;

    /// Scripted driving scenario.
    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum Scenario {
        /// Full throttle in a straight line.
        Accelerate,
        /// Full throttle, then boost once the car is up to speed.
        Boost,
        /// Full throttle while alternating hard left and right turns.
        Slalom,
        /// Steer through every zone in order.
        Tour,
    }

    impl Scenario {
        fn default_duration(self) -> f32 {
            match self {
                Scenario::Accelerate => 5.0,
                Scenario::Boost => 10.0,
                Scenario::Slalom => 8.0,
                Scenario::Tour => 60.0,
            }
        }
    }

    #[derive(Parser)]
    #[command(about = "Headless tuner for the drivefolio vehicle")]
    struct CliArgs {
        /// Scenario to run.
        #[arg(value_enum, default_value_t = Scenario::Accelerate)]
        scenario: Scenario,

        /// JSON tuning file (defaults are used when omitted).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated time limit in seconds (scenario default when omitted).
        #[arg(long)]
        duration: Option<f32>,

        /// Frame delta fed to the session each tick, in seconds.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        frame_dt: f32,

        /// Suppress CSV telemetry on stdout.
        #[arg(long)]
        quiet: bool,
    }

    /// Measurements accumulated during a run.
    #[derive(Default)]
    struct Measurements {
        top_speed: f32,
        time_to_90_percent: Option<f32>,
        distance: f32,
        drift_ticks: u32,
        max_yaw_rate: f32,
        boost_started_at: Option<f32>,
        boost_ended_at: Option<f32>,
        boost_ready_at: Option<f32>,
        zones_entered: Vec<(f32, String)>,
    }

    /// Tick-by-tick script state.
    struct Driver {
        scenario: Scenario,
        tour_index: usize,
        boost_sent: bool,
    }

    impl Driver {
        fn new(scenario: Scenario) -> Self {
            Self {
                scenario,
                tour_index: 0,
                boost_sent: false,
            }
        }

        /// Whether the script has nothing left to do.
        fn finished(&self, session: &Session) -> bool {
            matches!(self.scenario, Scenario::Tour)
                && self.tour_index >= session.controller().zones().zones().len()
        }

        fn input(&mut self, session: &Session, elapsed: f32) -> FrameInput {
            let speed = session.controller().dynamics().state().speed;
            let max_speed = session.controller().dynamics().params().max_speed;

            match self.scenario {
                Scenario::Accelerate => FrameInput::new(DriveControls {
                    accelerate: true,
                    ..Default::default()
                }),
                Scenario::Boost => {
                    let input = FrameInput::new(DriveControls {
                        accelerate: true,
                        ..Default::default()
                    });
                    if !self.boost_sent && speed >= max_speed * 0.9 {
                        self.boost_sent = true;
                        input.with_command(DriveCommand::Boost)
                    } else {
                        input
                    }
                }
                Scenario::Slalom => {
                    // Straight for the first second, then switch sides every second.
                    let phase = elapsed.floor() as u32;
                    FrameInput::new(DriveControls {
                        accelerate: true,
                        turn_left: phase > 0 && phase % 2 == 1,
                        turn_right: phase > 0 && phase % 2 == 0,
                        ..Default::default()
                    })
                }
                Scenario::Tour => {
                    let zones = session.controller().zones().zones();
                    let Some(zone) = zones.get(self.tour_index) else {
                        return FrameInput::new(DriveControls {
                            brake: true,
                            ..Default::default()
                        });
                    };
                    let transform = session
                        .controller()
                        .bridge()
                        .read(session.world().vehicle());
                    FrameInput::new(steer_toward(&transform, zone.center, speed))
                }
            }
        }

        fn on_zone(&mut self, session: &Session, transition: ZoneTransition) {
            let (ZoneTransition::Entered(index) | ZoneTransition::Switched { to: index, .. }) =
                transition
            else {
                return;
            };
            if index == self.tour_index {
                let zones = session.controller().zones().zones();
                self.tour_index += 1;
                if let Some(next) = zones.get(self.tour_index) {
                    eprintln!("#   Heading for {}", next.name);
                }
            }
        }
    }

    /// Wrap an angle into (-PI, PI].
    fn wrap_angle(angle: f32) -> f32 {
        let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
    }

    /// Controls that turn the car toward `target` and hold cruise speed.
    fn steer_toward(transform: &VehicleTransform, target: Vec2, speed: f32) -> DriveControls {
        let to_target = target - transform.ground_point();
        // Yaw 0 faces -Z and positive yaw turns toward -X.
        let desired_yaw = (-to_target.x).atan2(-to_target.y);
        let error = wrap_angle(desired_yaw - transform.yaw());

        DriveControls {
            accelerate: speed < TOUR_CRUISE_SPEED,
            turn_left: error > HEADING_DEADBAND,
            turn_right: error < -HEADING_DEADBAND,
            brake: error.abs() > PI / 2.0 && speed > TOUR_CRUISE_SPEED * 0.5,
            ..Default::default()
        }
    }

    fn record(
        measurements: &mut Measurements,
        session: &Session,
        report: &FrameReport,
        dt: f32,
        target_90_percent: f32,
    ) {
        let state = session.controller().dynamics().state();
        let output = report.step.output;
        let t = session.controller().clock().elapsed();

        measurements.top_speed = measurements.top_speed.max(state.speed);
        if measurements.time_to_90_percent.is_none() && state.speed >= target_90_percent {
            measurements.time_to_90_percent = Some(t);
        }
        measurements.distance += state.speed.abs() * dt;
        if output.drifting {
            measurements.drift_ticks += 1;
        }
        measurements.max_yaw_rate = measurements.max_yaw_rate.max(output.yaw_rate.abs());

        if state.boost_active && measurements.boost_started_at.is_none() {
            measurements.boost_started_at = Some(t);
        }
        if measurements.boost_started_at.is_some() {
            if !state.boost_active && measurements.boost_ended_at.is_none() {
                measurements.boost_ended_at = Some(t);
            }
            if measurements.boost_ended_at.is_some()
                && measurements.boost_ready_at.is_none()
                && report.observation.readout.boost_ready()
            {
                measurements.boost_ready_at = Some(t);
            }
        }

        if let Some(ZoneTransition::Entered(index) | ZoneTransition::Switched { to: index, .. }) =
            report.observation.zone_transition
        {
            let zones = session.controller().zones().zones();
            measurements.zones_entered.push((t, zones[index].name.clone()));
        }
    }

    fn print_summary(scenario: Scenario, elapsed: f32, m: &Measurements, target_90_percent: f32) {
        eprintln!("# {scenario:?} complete after {elapsed:.2} s:");
        eprintln!("#   Top speed: {:.2} m/s", m.top_speed);
        match m.time_to_90_percent {
            Some(t) => eprintln!("#   Time to {target_90_percent:.1} m/s (90%): {t:.2} s"),
            None => eprintln!("#   Never reached {target_90_percent:.1} m/s (90%)"),
        }
        eprintln!("#   Distance: {:.1} m", m.distance);
        eprintln!("#   Max yaw rate: {:.3} rad/s", m.max_yaw_rate);
        eprintln!(
            "#   Drifting: {} tick(s) ({:.1}%)",
            m.drift_ticks,
            f64::from(m.drift_ticks) * 100.0 / (f64::from(elapsed) * 60.0).max(1.0)
        );
        if let Some(start) = m.boost_started_at {
            eprintln!("#   Boost started: {start:.2} s");
            if let Some(end) = m.boost_ended_at {
                eprintln!("#   Boost ended: {end:.2} s ({:.2} s long)", end - start);
            }
            if let (Some(end), Some(ready)) = (m.boost_ended_at, m.boost_ready_at) {
                eprintln!("#   Boost ready again: {ready:.2} s ({:.2} s cooldown)", ready - end);
            }
        }
        for (t, name) in &m.zones_entered {
            eprintln!("#   Entered {name} at {t:.2} s");
        }
    }

    pub fn run() -> ExitCode {
        let args = CliArgs::parse();

        let config = match &args.config {
            Some(path) => match DriveConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("# ERROR: {e}");
                    return ExitCode::FAILURE;
                }
            },
            None => DriveConfig::default(),
        };
        let target_90_percent = config.dynamics.max_speed * 0.9;

        let mut session: Session = match DriveSession::builder()
            .config(config)
            .world(FlatGroundWorld::default())
            .sink(NullZoneSink)
            .build()
        {
            Ok(session) => session,
            Err(e) => {
                eprintln!("# ERROR: {e}");
                return ExitCode::FAILURE;
            }
        };

        let duration = args
            .duration
            .unwrap_or_else(|| args.scenario.default_duration());
        eprintln!("# Running {:?} for up to {duration:.1} s", args.scenario);

        let mut output: Option<Box<dyn TelemetryOutput>> = if args.quiet {
            None
        } else {
            Some(Box::new(StdoutTelemetryOutput))
        };
        if let Some(output) = output.as_deref_mut() {
            reset_telemetry_to(output);
        }

        let mut driver = Driver::new(args.scenario);
        let mut measurements = Measurements::default();

        while session.controller().clock().elapsed() < duration && !driver.finished(&session) {
            let input = driver.input(&session, session.controller().clock().elapsed());
            let report = session.tick(&input, args.frame_dt);
            let Some(dt) = report.step.delta.seconds() else {
                eprintln!("# ERROR: frame delta {} is unusable", args.frame_dt);
                return ExitCode::FAILURE;
            };

            record(&mut measurements, &session, &report, dt, target_90_percent);
            if let Some(transition) = report.observation.zone_transition {
                driver.on_zone(&session, transition);
            }

            if let Some(output) = output.as_deref_mut() {
                let body = session.world().vehicle();
                let controller = session.controller();
                let snapshot = TelemetrySnapshot {
                    elapsed: controller.clock().elapsed(),
                    dt,
                    controls: input.controls,
                    output: report.step.output,
                    state: *controller.dynamics().state(),
                    transform: report.observation.transform,
                    linear_vel: body.linear_velocity(),
                    angular_vel: body.angular_velocity(),
                    zone: controller.zones().current().map(|zone| zone.name.as_str()),
                };
                emit_telemetry_to(&snapshot, output);
            }
        }

        print_summary(
            args.scenario,
            session.controller().clock().elapsed(),
            &measurements,
            target_90_percent,
        );

        if driver.finished(&session) || !matches!(args.scenario, Scenario::Tour) {
            ExitCode::SUCCESS
        } else {
            eprintln!("# Tour timed out before visiting every zone");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_family = "wasm"))]
fn main() -> std::process::ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    tuner::run()
}
