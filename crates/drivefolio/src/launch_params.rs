//! Launch parameter parsing.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

/// Launch parameters for the app.
#[derive(Debug, Default)]
pub struct LaunchParams {
    /// JSON tuning file to load instead of the built-in defaults.
    pub config: Option<PathBuf>,
    /// Write per-tick telemetry CSV to this path.
    pub telemetry: Option<PathBuf>,
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Drive around a small world to discover portfolio zones")]
    struct CliArgs {
        /// JSON tuning file (vehicle, camera, clock and zone settings).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write per-tick telemetry CSV (defaults to telemetry.csv when no path is given).
        #[arg(long, num_args = 0..=1, default_missing_value = drivefolio_core::telemetry::TELEMETRY_PATH)]
        telemetry: Option<PathBuf>,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            config: args.config,
            telemetry: args.telemetry,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
