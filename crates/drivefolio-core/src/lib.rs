//! Control loop for the drivefolio driving world.
//!
//! This crate holds everything between the input device and the renderer that
//! does not depend on a particular engine: arcade vehicle dynamics, the bridge
//! that writes them into a rigid body, zone triggers and the chase camera.
//!
//! # Design principles
//!
//! - **Engine-agnostic**: Physics bodies and UI panels are reached through traits
//! - **Explicit wiring**: No globals; collaborators are handed in at construction
//! - **Deterministic**: Fixed tick order, sanitized frame deltas
//!
//! # Example
//!
//! ```ignore
//! use drivefolio_core::{DriveSession, FlatGroundWorld, FrameInput, NullZoneSink};
//!
//! let mut session = DriveSession::builder()
//!     .world(FlatGroundWorld::default())
//!     .sink(NullZoneSink)
//!     .build()?;
//!
//! let report = session.tick(&FrameInput::default(), 1.0 / 60.0);
//! println!("car at {}", report.observation.transform.position);
//! ```

pub mod bridge;
pub mod camera;
pub mod clock;
pub mod config;
pub mod dynamics;
mod error;
pub mod flat;
pub mod hud;
pub mod input;
pub mod session;
pub mod telemetry;
pub mod zone;

pub use bridge::{PhysicsBridge, PhysicsWorld, RigidBodyHandle, VehicleTransform};
pub use camera::{CameraState, ChaseCamera};
pub use clock::{FrameClock, FrameDelta, StepSchedule};
pub use config::DriveConfig;
pub use dynamics::{DynamicsOutput, VehicleDynamics, VehicleState};
pub use error::{Error, Result};
pub use flat::{FlatGroundBody, FlatGroundWorld};
pub use hud::DriveReadout;
pub use input::{DriveCommand, DriveControls, FrameInput};
pub use session::{
    DriveController, DriveSession, DriveSessionBuilder, DriveStep, FrameReport, Observation,
};
pub use zone::{NullZoneSink, ZoneDefinition, ZoneDetector, ZoneSink, ZoneTransition};
