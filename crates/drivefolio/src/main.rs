//! Drive a car around a small 3D world using Bevy.
//!
//! Driving into a zone (Projects, About, Contact) opens its info panel.
//! All vehicle behaviour lives in `drivefolio-core`; this crate wires it to
//! Avian physics, leafwing input, egui panels and the renderer.

mod camera;
mod input;
mod launch_params;
mod ui;
mod vehicle;
mod world;

use bevy::prelude::*;
use camera::ChaseCameraPlugin;
use drivefolio_core::{DriveConfig, DriveController};
use input::InputPlugin;
use launch_params::LaunchParams;
use ui::{UiPlugin, ZonePanel};
use vehicle::{DriveRig, DriveTelemetry, VehiclePlugin};
use world::{DriveSettings, WorldPlugin};

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            InputPlugin,
            WorldPlugin,
            VehiclePlugin,
            ChaseCameraPlugin,
            UiPlugin,
        ));
    }
}

/// Load the tuning file named at launch, falling back to defaults.
fn load_config(params: &LaunchParams) -> DriveConfig {
    let Some(path) = &params.config else {
        return DriveConfig::default();
    };
    match DriveConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}; using default settings");
            DriveConfig::default()
        }
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    let config = load_config(&params);
    let controller = match DriveController::new(config.clone(), ZonePanel::default()) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("Cannot start: {e}");
            return;
        }
    };

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "drivefolio".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    if let Some(path) = &params.telemetry {
        app.insert_resource(DriveTelemetry::create(path.clone()));
    }

    app.insert_resource(DriveSettings(config))
        .insert_resource(DriveRig(controller))
        .add_plugins(AppPlugin)
        .run();
}
