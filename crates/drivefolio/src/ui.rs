//! Zone info panel and driving HUD.
//!
//! The zone panel is the drive controller's [`ZoneSink`]: the controller owns
//! it and the UI reads it back each frame through [`DriveRig`].

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use drivefolio_core::{
    DriveReadout, ZoneSink,
    hud::{self, GaugeGlow},
};
use leafwing_input_manager::prelude::*;

use crate::{
    input::DriveAction,
    vehicle::{DriveRig, LatestReadout},
};

/// Edge length of the minimap in points.
const MINIMAP_SIZE: f32 = 140.0;

/// Resource controlling whether the HUD is visible.
#[derive(Resource)]
pub struct UiVisible(pub bool);

impl Default for UiVisible {
    fn default() -> Self {
        Self(true)
    }
}

/// Plugin for the zone panel and HUD.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .init_resource::<UiVisible>()
            .add_systems(Update, toggle_ui_visible)
            .add_systems(
                EguiPrimaryContextPass,
                (
                    zone_panel_system,
                    hud_system.run_if(|visible: Res<UiVisible>| visible.0),
                ),
            );
    }
}

// ============================================================================
// Zone panel
// ============================================================================

/// Text for the zone the car is parked in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneInfo {
    pub name: String,
    pub description: String,
    pub action: String,
}

/// Zone panel state, driven by zone transitions.
#[derive(Debug, Default)]
pub struct ZonePanel {
    /// Zone whose panel is shown.
    pub current: Option<ZoneInfo>,
    /// Whether the detail window for the current zone is open.
    pub details_open: bool,
}

impl ZoneSink for ZonePanel {
    fn show_zone_info(&mut self, name: &str, description: &str, action: &str) {
        self.current = Some(ZoneInfo {
            name: name.to_string(),
            description: description.to_string(),
            action: action.to_string(),
        });
        self.details_open = false;
    }

    fn hide_zone_info(&mut self) {
        self.current = None;
        self.details_open = false;
    }
}

/// Show the current zone's panel and, on request, its detail window.
fn zone_panel_system(mut contexts: EguiContexts, mut rig: ResMut<DriveRig>) -> Result {
    let ctx = contexts.ctx_mut()?;
    let panel = rig.sink_mut();
    let Some(info) = panel.current.clone() else {
        return Ok(());
    };

    egui::Window::new(info.name.as_str())
        .id(egui::Id::new("zone_panel"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -40.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("You found the {} zone.", info.name));
            if ui.button(info.action.as_str()).clicked() {
                panel.details_open = true;
            }
        });

    let mut open = panel.details_open;
    egui::Window::new(info.action.as_str())
        .id(egui::Id::new("zone_details"))
        .open(&mut open)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(info.description.as_str());
        });
    panel.details_open = open;

    Ok(())
}

// ============================================================================
// HUD
// ============================================================================

/// Toggle HUD visibility with Q.
fn toggle_ui_visible(
    action_query: Query<&ActionState<DriveAction>>,
    mut visible: ResMut<UiVisible>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if action_state.just_pressed(&DriveAction::ToggleUi) {
        visible.0 = !visible.0;
    }
}

fn glow_color(glow: GaugeGlow) -> egui::Color32 {
    match glow {
        GaugeGlow::Idle => egui::Color32::from_rgb(120, 200, 255),
        GaugeGlow::Warm => egui::Color32::from_rgb(255, 200, 80),
        GaugeGlow::Hot => egui::Color32::from_rgb(255, 90, 60),
    }
}

/// Render the speedometer, boost state and minimap.
fn hud_system(
    mut contexts: EguiContexts,
    readout: Res<LatestReadout>,
    rig: Res<DriveRig>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let readout = &readout.0;

    egui::Window::new("Speed")
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .title_bar(false)
        .resizable(false)
        .show(ctx, |ui| {
            speedometer(ui, readout);
        });

    egui::Window::new("Map")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            minimap(ui, readout, &rig);
        });

    egui::Window::new("Controls")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .default_open(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("W/S or arrows: drive / reverse");
            ui.label("A/D or arrows: steer");
            ui.label("Space: brake");
            ui.label("Shift: boost");
            ui.label("R: reset");
            ui.label("Q: toggle HUD");
        });

    Ok(())
}

fn speedometer(ui: &mut egui::Ui, readout: &DriveReadout) {
    let color = glow_color(hud::gauge_glow(readout.speed));

    let (response, painter) =
        ui.allocate_painter(egui::vec2(160.0, 90.0), egui::Sense::hover());
    let rect = response.rect;
    let center = egui::pos2(rect.center().x, rect.bottom() - 8.0);
    let radius = 70.0;

    // Dial ticks every 30 degrees, left (0) to right (full scale).
    for step in 0..=6u8 {
        let angle = std::f32::consts::PI * (1.0 - f32::from(step) / 6.0);
        let dir = egui::vec2(angle.cos(), -angle.sin());
        painter.line_segment(
            [center + dir * (radius - 8.0), center + dir * radius],
            (2.0, egui::Color32::GRAY),
        );
    }

    let needle = (180.0 - hud::needle_degrees(readout.speed)).to_radians();
    let tip = center + egui::vec2(needle.cos(), -needle.sin()) * (radius - 4.0);
    painter.line_segment([center, tip], (3.0, color));
    painter.circle_filled(center, 4.0, color);

    ui.vertical_centered(|ui| {
        ui.colored_label(
            color,
            egui::RichText::new(format!("{:.0} km/h", readout.speed.abs() * 3.6)).heading(),
        );
        if readout.drifting {
            ui.colored_label(egui::Color32::from_rgb(255, 140, 0), "DRIFT");
        }
        if readout.boost_active {
            ui.colored_label(egui::Color32::from_rgb(80, 220, 255), "BOOST");
        } else if readout.boost_ready() {
            ui.label("Boost ready");
        } else {
            ui.label(format!("Boost in {:.1}s", readout.boost_cooldown_remaining));
        }

        let tone = hud::engine_tone(readout.speed);
        ui.small(format!("Engine {:.0} Hz", tone.frequency));
    });
}

fn minimap(ui: &mut egui::Ui, readout: &DriveReadout, rig: &DriveRig) {
    let (response, painter) =
        ui.allocate_painter(egui::vec2(MINIMAP_SIZE, MINIMAP_SIZE), egui::Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 4.0, egui::Color32::from_black_alpha(160));

    let to_screen = |percent: Vec2| {
        egui::pos2(
            rect.left() + percent.x / 100.0 * rect.width(),
            rect.top() + percent.y / 100.0 * rect.height(),
        )
    };
    let scale = rect.width() / hud::MINIMAP_WORLD_SIZE;

    let current = rig.zones().current().map(|zone| zone.name.as_str());
    for zone in rig.zones().zones() {
        let center = hud::minimap_percent(Vec3::new(zone.center.x, 0.0, zone.center.y));
        let color = if current == Some(zone.name.as_str()) {
            egui::Color32::from_rgba_unmultiplied(255, 210, 80, 180)
        } else {
            egui::Color32::from_rgba_unmultiplied(120, 180, 255, 120)
        };
        painter.circle_filled(to_screen(center), zone.radius * scale, color);
    }

    let car = to_screen(hud::minimap_percent(readout.position));
    // Heading 0 faces -Z, which is up on the map.
    let heading = egui::vec2(-readout.yaw.sin(), -readout.yaw.cos());
    painter.line_segment([car, car + heading * 8.0], (2.0, egui::Color32::WHITE));
    painter.circle_filled(car, 3.0, egui::Color32::WHITE);
}
