//! Tuning parameters for the drive session.
//!
//! Every field has a default matching the shipped world, so a config file only
//! needs to list the values it overrides.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    zone::ZoneDefinition,
};

/// Arcade driving model parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DynamicsParams {
    /// Top forward speed without boost (m/s).
    pub max_speed: f32,
    /// Rate at which speed grows toward the target (m/s²).
    pub acceleration: f32,
    /// Rate at which speed shrinks or reverses toward the target (m/s²).
    pub deceleration: f32,
    /// Reverse top speed as a fraction of forward top speed.
    pub reverse_ratio: f32,
    /// Base yaw rate at standstill (rad/s).
    pub turn_speed: f32,
    /// Turn effectiveness remaining at top speed (0.0-1.0).
    pub min_turn_effectiveness: f32,
    /// Target speed multiplier while braking.
    pub brake_target_factor: f32,
    /// Speed retained per nominal tick while braking.
    pub brake_decay: f32,
    /// Coasting friction as a fraction of `deceleration`.
    pub idle_friction_ratio: f32,
    /// Speeds below this snap to zero when no drive input is held.
    pub stop_epsilon: f32,
    /// Minimum turn intensity magnitude for a drift.
    pub drift_turn_threshold: f32,
    /// Minimum speed for a drift, as a fraction of `max_speed`.
    pub drift_speed_ratio: f32,
    /// Fraction of previous horizontal velocity kept per nominal tick while drifting.
    pub drift_slip: f32,
    /// Slip multiplier applied while braking.
    pub brake_slip_scale: f32,
    /// Pitch/roll angular velocity retained per nominal tick.
    pub upright_damping: f32,
}

impl Default for DynamicsParams {
    fn default() -> Self {
        Self {
            max_speed: 80.0,
            acceleration: 30.0,
            deceleration: 40.0,
            reverse_ratio: 0.5,
            turn_speed: 3.0,
            min_turn_effectiveness: 0.5,
            brake_target_factor: 0.3,
            brake_decay: 0.95,
            idle_friction_ratio: 0.5,
            stop_epsilon: 0.1,
            drift_turn_threshold: 0.5,
            drift_speed_ratio: 0.4,
            drift_slip: 0.9,
            brake_slip_scale: 0.5,
            upright_damping: 0.9,
        }
    }
}

/// Timed boost parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BoostParams {
    /// How long a boost lasts (seconds).
    pub duration: f32,
    /// Lockout after a boost ends (seconds).
    pub cooldown: f32,
    /// Acceleration multiplier while boosting.
    pub acceleration_multiplier: f32,
    /// Top speed multiplier while boosting.
    pub max_speed_multiplier: f32,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            duration: 2.0,
            cooldown: 3.0,
            acceleration_multiplier: 2.0,
            max_speed_multiplier: 1.5,
        }
    }
}

/// Chase camera rig.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraRig {
    /// Camera position offset in vehicle-local space (x=right, y=up, -z=forward).
    pub offset: Vec3,
    /// Look-at target offset in vehicle-local space.
    pub look_offset: Vec3,
    /// Fraction of the remaining distance covered per nominal tick.
    pub smoothing: f32,
    /// Where the camera sits before the first vehicle observation.
    pub initial_position: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 8.0, 15.0),
            look_offset: Vec3::new(0.0, 2.0, -5.0),
            smoothing: 0.1,
            initial_position: Vec3::new(0.0, 15.0, 20.0),
        }
    }
}

/// Frame timing parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClockParams {
    /// Physics step length (seconds).
    pub fixed_step: f32,
    /// Maximum physics steps per frame.
    pub max_substeps: u32,
    /// Frame deltas above this are clamped (seconds).
    pub max_frame_delta: f32,
}

impl Default for ClockParams {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_substeps: 3,
            max_frame_delta: 0.1,
        }
    }
}

/// Canonical spawn pose restored on reset.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SpawnPose {
    /// World position.
    pub position: Vec3,
    /// Heading about world up (radians, 0 faces -Z).
    pub yaw: f32,
}

impl Default for SpawnPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 0.0),
            yaw: 0.0,
        }
    }
}

/// Complete configuration for a drive session.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub dynamics: DynamicsParams,
    pub boost: BoostParams,
    pub camera: CameraRig,
    pub clock: ClockParams,
    pub spawn: SpawnPose,
    pub zones: Vec<ZoneDefinition>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            dynamics: DynamicsParams::default(),
            boost: BoostParams::default(),
            camera: CameraRig::default(),
            clock: ClockParams::default(),
            spawn: SpawnPose::default(),
            zones: default_zones(),
        }
    }
}

/// The three portfolio zones placed around the spawn point.
pub fn default_zones() -> Vec<ZoneDefinition> {
    vec![
        ZoneDefinition::new(
            "Projects",
            Vec2::new(-20.0, -20.0),
            8.0,
            "Explore my latest projects and creations",
            "View Projects",
        ),
        ZoneDefinition::new(
            "About",
            Vec2::new(20.0, -20.0),
            8.0,
            "Learn more about my skills and experience",
            "About Me",
        ),
        ZoneDefinition::new(
            "Contact",
            Vec2::new(0.0, -40.0),
            8.0,
            "Get in touch for collaborations and opportunities",
            "Contact Me",
        ),
    ]
}

impl DriveConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(
            "Loaded drive config from {} ({} zone(s))",
            path.display(),
            config.zones.len()
        );
        Ok(config)
    }

    /// Check every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dynamics;
        positive("dynamics.max_speed", d.max_speed)?;
        positive("dynamics.acceleration", d.acceleration)?;
        positive("dynamics.deceleration", d.deceleration)?;
        positive("dynamics.turn_speed", d.turn_speed)?;
        non_negative("dynamics.stop_epsilon", d.stop_epsilon)?;
        unit("dynamics.reverse_ratio", d.reverse_ratio)?;
        unit("dynamics.min_turn_effectiveness", d.min_turn_effectiveness)?;
        unit("dynamics.brake_target_factor", d.brake_target_factor)?;
        unit("dynamics.brake_decay", d.brake_decay)?;
        unit("dynamics.idle_friction_ratio", d.idle_friction_ratio)?;
        unit("dynamics.drift_speed_ratio", d.drift_speed_ratio)?;
        unit("dynamics.drift_slip", d.drift_slip)?;
        unit("dynamics.brake_slip_scale", d.brake_slip_scale)?;
        unit("dynamics.upright_damping", d.upright_damping)?;

        let b = &self.boost;
        non_negative("boost.duration", b.duration)?;
        non_negative("boost.cooldown", b.cooldown)?;
        at_least_one("boost.acceleration_multiplier", b.acceleration_multiplier)?;
        at_least_one("boost.max_speed_multiplier", b.max_speed_multiplier)?;

        unit("camera.smoothing", self.camera.smoothing)?;

        let c = &self.clock;
        positive("clock.fixed_step", c.fixed_step)?;
        positive("clock.max_frame_delta", c.max_frame_delta)?;
        if c.max_substeps == 0 {
            return Err(Error::InvalidConfig {
                field: "clock.max_substeps",
                detail: "must be at least 1".to_string(),
            });
        }

        for (i, zone) in self.zones.iter().enumerate() {
            zone.validate()?;
            if self.zones[..i].iter().any(|z| z.name == zone.name) {
                return Err(Error::DuplicateZone {
                    name: zone.name.clone(),
                });
            }
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("expected a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("expected a non-negative number, got {value}"),
        })
    }
}

fn unit(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("expected a value in [0, 1], got {value}"),
        })
    }
}

fn at_least_one(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            detail: format!("expected a multiplier >= 1, got {value}"),
        })
    }
}
