//! Zone triggers.
//!
//! Zones are circles on the ground plane. The detector tracks which zone the
//! car currently occupies and tells the UI only when that changes.

use glam::Vec2;
use serde::Deserialize;

use crate::error::{Error, Result};

/// A named circular trigger area on the (x, z) plane.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ZoneDefinition {
    /// Unique display name.
    pub name: String,
    /// Centre on the ground plane (world x, world z).
    pub center: Vec2,
    /// Trigger radius (meters).
    pub radius: f32,
    /// Body text shown while inside.
    pub description: String,
    /// Label of the zone's action button.
    pub action_label: String,
}

impl ZoneDefinition {
    pub fn new(
        name: impl Into<String>,
        center: Vec2,
        radius: f32,
        description: impl Into<String>,
        action_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            center,
            radius,
            description: description.into(),
            action_label: action_label.into(),
        }
    }

    /// Whether a ground-plane point lies inside (boundary included).
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidZone {
                name: self.name.clone(),
                detail: "name must not be empty".to_string(),
            });
        }
        if !self.center.is_finite() {
            return Err(Error::InvalidZone {
                name: self.name.clone(),
                detail: format!("center {} is not finite", self.center),
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::InvalidZone {
                name: self.name.clone(),
                detail: format!("radius must be positive, got {}", self.radius),
            });
        }
        Ok(())
    }
}

/// Receives zone show/hide notifications.
pub trait ZoneSink {
    /// A zone became current.
    fn show_zone_info(&mut self, name: &str, description: &str, action: &str);
    /// No zone is current any more.
    fn hide_zone_info(&mut self);
}

/// Sink that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullZoneSink;

impl ZoneSink for NullZoneSink {
    fn show_zone_info(&mut self, _name: &str, _description: &str, _action: &str) {}

    fn hide_zone_info(&mut self) {}
}

/// A change in the current zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneTransition {
    /// Entered a zone from open ground.
    Entered(usize),
    /// Moved directly from one zone into another.
    Switched { from: usize, to: usize },
    /// Left a zone for open ground.
    Exited(usize),
}

/// Tracks the current zone and notifies a [`ZoneSink`] on transitions.
#[derive(Clone, Debug)]
pub struct ZoneDetector<S> {
    zones: Vec<ZoneDefinition>,
    current: Option<usize>,
    sink: S,
}

impl<S: ZoneSink> ZoneDetector<S> {
    /// Create a detector over a validated zone list.
    pub fn new(zones: Vec<ZoneDefinition>, sink: S) -> Self {
        Self {
            zones,
            current: None,
            sink,
        }
    }

    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    /// The zone the car currently occupies.
    pub fn current(&self) -> Option<&ZoneDefinition> {
        self.current.map(|i| &self.zones[i])
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Index of the zone containing `point`. Overlaps resolve to the first zone in list order.
    pub fn locate(&self, point: Vec2) -> Option<usize> {
        self.zones.iter().position(|zone| zone.contains(point))
    }

    /// Update the current zone from a ground-plane position.
    ///
    /// Returns the transition, if any. Staying inside the current zone (or
    /// staying outside all zones) produces no notification.
    pub fn update(&mut self, point: Vec2) -> Option<ZoneTransition> {
        let found = self.locate(point);
        if found == self.current {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, found);
        let transition = match (previous, found) {
            (None, Some(to)) => ZoneTransition::Entered(to),
            (Some(from), Some(to)) => ZoneTransition::Switched { from, to },
            (Some(from), None) => ZoneTransition::Exited(from),
            (None, None) => return None,
        };

        match found {
            Some(index) => {
                let zone = &self.zones[index];
                tracing::info!("Entered zone '{}'", zone.name);
                self.sink
                    .show_zone_info(&zone.name, &zone.description, &zone.action_label);
            }
            None => {
                if let Some(from) = previous {
                    tracing::info!("Left zone '{}'", self.zones[from].name);
                }
                self.sink.hide_zone_info();
            }
        }

        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_zones;

    /// Sink that records every call.
    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl ZoneSink for RecordingSink {
        fn show_zone_info(&mut self, name: &str, _description: &str, action: &str) {
            self.calls.push(format!("show {name} [{action}]"));
        }

        fn hide_zone_info(&mut self) {
            self.calls.push("hide".to_string());
        }
    }

    fn detector() -> ZoneDetector<RecordingSink> {
        ZoneDetector::new(default_zones(), RecordingSink::default())
    }

    #[test]
    fn test_center_always_matches() {
        let detector = detector();
        for (i, zone) in detector.zones().iter().enumerate() {
            assert_eq!(detector.locate(zone.center), Some(i));
        }
    }

    #[test]
    fn test_just_outside_radius_never_matches() {
        let detector = detector();
        let zone = &detector.zones()[0];
        let outside = zone.center + Vec2::new(zone.radius + 1e-3, 0.0);
        assert_eq!(detector.locate(outside), None);
        let inside = zone.center + Vec2::new(zone.radius - 1e-3, 0.0);
        assert_eq!(detector.locate(inside), Some(0));
    }

    #[test]
    fn test_no_duplicate_events_while_stationary() {
        let mut detector = detector();
        let projects = Vec2::new(-20.0, -20.0);

        assert_eq!(detector.update(projects), Some(ZoneTransition::Entered(0)));
        for _ in 0..10 {
            assert_eq!(detector.update(projects), None);
        }
        assert_eq!(detector.sink().calls, vec!["show Projects [View Projects]"]);
        assert_eq!(detector.current().map(|z| z.name.as_str()), Some("Projects"));
    }

    #[test]
    fn test_single_exit_when_leaving() {
        let mut detector = detector();
        detector.update(Vec2::new(20.0, -20.0));
        assert_eq!(
            detector.update(Vec2::new(0.0, 0.0)),
            Some(ZoneTransition::Exited(1))
        );
        for _ in 0..5 {
            assert_eq!(detector.update(Vec2::new(0.0, 0.0)), None);
        }
        assert_eq!(detector.sink().calls, vec!["show About [About Me]", "hide"]);
        assert!(detector.current().is_none());
    }

    #[test]
    fn test_open_ground_is_silent() {
        let mut detector = detector();
        assert_eq!(detector.update(Vec2::ZERO), None);
        assert!(detector.sink().calls.is_empty());
    }

    #[test]
    fn test_overlap_resolves_to_first_zone() {
        let zones = vec![
            ZoneDefinition::new("A", Vec2::new(0.0, 0.0), 5.0, "", "a"),
            ZoneDefinition::new("B", Vec2::new(4.0, 0.0), 5.0, "", "b"),
        ];
        let mut detector = ZoneDetector::new(zones, RecordingSink::default());

        // Closer to B's centre, but A is listed first.
        assert_eq!(
            detector.update(Vec2::new(3.0, 0.0)),
            Some(ZoneTransition::Entered(0))
        );
        // Only inside B.
        assert_eq!(
            detector.update(Vec2::new(8.0, 0.0)),
            Some(ZoneTransition::Switched { from: 0, to: 1 })
        );
        assert_eq!(detector.sink().calls, vec!["show A [a]", "show B [b]"]);
    }

    #[test]
    fn test_validate_rejects_bad_radius() {
        let zone = ZoneDefinition::new("Bad", Vec2::ZERO, 0.0, "", "");
        assert!(matches!(zone.validate(), Err(Error::InvalidZone { .. })));
        let zone = ZoneDefinition::new("Bad", Vec2::ZERO, f32::NAN, "", "");
        assert!(zone.validate().is_err());
    }
}
