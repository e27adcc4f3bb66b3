//! Readouts for the HUD and engine audio.
//!
//! These map per-tick vehicle state to display and synthesis parameters; the
//! collaborators that draw or play them own everything else.

use glam::{Vec2, Vec3};

/// Speed at which the speedometer and engine tone saturate (m/s).
pub const GAUGE_FULL_SCALE: f32 = 80.0;

/// Side length of the square world area shown on the minimap (meters).
pub const MINIMAP_WORLD_SIZE: f32 = 200.0;

/// Per-tick vehicle readout for audio and UI collaborators.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveReadout {
    /// Signed speed along the heading (m/s).
    pub speed: f32,
    pub drifting: bool,
    pub boost_active: bool,
    /// Seconds until boost is available again.
    pub boost_cooldown_remaining: f32,
    pub position: Vec3,
    /// Heading (radians, 0 faces -Z).
    pub yaw: f32,
}

impl DriveReadout {
    /// Whether a boost request would currently be accepted.
    pub fn boost_ready(&self) -> bool {
        !self.boost_active && self.boost_cooldown_remaining <= 0.0
    }
}

/// Speedometer glow level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GaugeGlow {
    Idle,
    Warm,
    Hot,
}

/// Speed as a fraction of gauge full scale, in [0, 1].
pub fn normalized_speed(speed: f32) -> f32 {
    (speed.abs() / GAUGE_FULL_SCALE).min(1.0)
}

/// Speedometer needle angle in degrees (0 at rest, 180 at full scale).
pub fn needle_degrees(speed: f32) -> f32 {
    normalized_speed(speed) * 180.0
}

/// Speedometer glow for `speed`.
pub fn gauge_glow(speed: f32) -> GaugeGlow {
    let speed = speed.abs();
    if speed > 50.0 {
        GaugeGlow::Hot
    } else if speed > 25.0 {
        GaugeGlow::Warm
    } else {
        GaugeGlow::Idle
    }
}

/// Minimap marker position as percentages of the map (0-100 on each axis).
///
/// The map covers a [`MINIMAP_WORLD_SIZE`] square centred on the origin;
/// x maps to the horizontal axis and z to the vertical axis.
pub fn minimap_percent(position: Vec3) -> Vec2 {
    let half = MINIMAP_WORLD_SIZE / 2.0;
    Vec2::new(
        (position.x + half) / MINIMAP_WORLD_SIZE * 100.0,
        (position.z + half) / MINIMAP_WORLD_SIZE * 100.0,
    )
}

/// Engine synthesis parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineTone {
    /// Output gain (never zero so exponential ramps stay valid).
    pub volume: f32,
    /// Oscillator frequency (Hz).
    pub frequency: f32,
    /// Low-pass cutoff (Hz).
    pub filter_cutoff: f32,
}

/// Engine tone for `speed`.
pub fn engine_tone(speed: f32) -> EngineTone {
    let n = normalized_speed(speed);
    EngineTone {
        volume: (n * 0.1).max(0.001),
        frequency: 80.0 + n * 200.0,
        filter_cutoff: 200.0 + n * 800.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needle_range() {
        assert_eq!(needle_degrees(0.0), 0.0);
        assert_eq!(needle_degrees(40.0), 90.0);
        assert_eq!(needle_degrees(120.0), 180.0);
        assert_eq!(needle_degrees(-40.0), 90.0);
    }

    #[test]
    fn test_gauge_glow_thresholds() {
        assert_eq!(gauge_glow(10.0), GaugeGlow::Idle);
        assert_eq!(gauge_glow(25.0), GaugeGlow::Idle);
        assert_eq!(gauge_glow(30.0), GaugeGlow::Warm);
        assert_eq!(gauge_glow(51.0), GaugeGlow::Hot);
    }

    #[test]
    fn test_minimap_percent() {
        assert_eq!(minimap_percent(Vec3::ZERO), Vec2::new(50.0, 50.0));
        assert_eq!(
            minimap_percent(Vec3::new(-100.0, 5.0, 100.0)),
            Vec2::new(0.0, 100.0)
        );
    }

    #[test]
    fn test_engine_tone_bounds() {
        let idle = engine_tone(0.0);
        assert_eq!(idle.volume, 0.001);
        assert_eq!(idle.frequency, 80.0);
        assert_eq!(idle.filter_cutoff, 200.0);

        let full = engine_tone(200.0);
        assert!((full.volume - 0.1).abs() < 1e-6);
        assert_eq!(full.frequency, 280.0);
        assert_eq!(full.filter_cutoff, 1000.0);
    }

    #[test]
    fn test_boost_ready() {
        let mut readout = DriveReadout::default();
        assert!(readout.boost_ready());
        readout.boost_cooldown_remaining = 1.0;
        assert!(!readout.boost_ready());
    }
}
