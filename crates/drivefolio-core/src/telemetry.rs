//! Drive telemetry logging.
//!
//! Outputs CSV data for analysis. Supports multiple output destinations via
//! the `TelemetryOutput` trait.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use glam::{EulerRot, Vec3};

use crate::{
    bridge::VehicleTransform,
    dynamics::{DynamicsOutput, VehicleState},
    input::DriveControls,
};

/// Default telemetry output file path.
pub const TELEMETRY_PATH: &str = "telemetry.csv";

/// Snapshot of one tick of drive state for telemetry logging.
pub struct TelemetrySnapshot<'a> {
    pub elapsed: f32,
    pub dt: f32,
    pub controls: DriveControls,
    pub output: DynamicsOutput,
    pub state: VehicleState,
    pub transform: VehicleTransform,
    pub linear_vel: Vec3,
    pub angular_vel: Vec3,
    pub zone: Option<&'a str>,
}

/// Trait for telemetry output destinations.
pub trait TelemetryOutput: Send + Sync {
    /// Write the CSV header.
    fn write_header(&mut self, header: &str);
    /// Write a data row.
    fn write_row(&mut self, row: &str);
}

/// File-based output. The header truncates the file; rows append.
///
/// The file stays open for the whole run. The first failed write is logged
/// and later rows are dropped.
pub struct FileTelemetryOutput {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileTelemetryOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    /// Whether rows are currently being written.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn write_line(&mut self, line: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            tracing::warn!(
                "Telemetry write to {} failed, dropping further rows: {e}",
                self.path.display()
            );
            self.writer = None;
        }
    }
}

impl Default for FileTelemetryOutput {
    fn default() -> Self {
        Self::new(TELEMETRY_PATH)
    }
}

impl TelemetryOutput for FileTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        match File::create(&self.path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                self.write_line(header);
            }
            Err(e) => {
                tracing::warn!("Failed to create {}: {e}", self.path.display());
                self.writer = None;
            }
        }
    }

    fn write_row(&mut self, row: &str) {
        self.write_line(row);
    }
}

/// Stdout output for the headless tuner.
pub struct StdoutTelemetryOutput;

impl TelemetryOutput for StdoutTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        println!("{header}");
    }

    fn write_row(&mut self, row: &str) {
        println!("{row}");
    }
}

/// In-memory output, mostly for tests.
#[derive(Default)]
pub struct BufferTelemetryOutput {
    pub lines: Vec<String>,
}

impl TelemetryOutput for BufferTelemetryOutput {
    fn write_header(&mut self, header: &str) {
        self.lines.clear();
        self.lines.push(header.to_string());
    }

    fn write_row(&mut self, row: &str) {
        self.lines.push(row.to_string());
    }
}

/// Macro to define CSV schema and generate telemetry functions.
///
/// This generates `reset_telemetry_to()` and `emit_telemetry_to()` from a
/// single schema definition, keeping column names and formats in sync.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$snapshot:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// CSV header string.
        pub const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );

        /// Reset telemetry (write header) to the specified output.
        pub fn reset_telemetry_to(output: &mut dyn TelemetryOutput) {
            output.write_header(CSV_HEADER.trim_end_matches(','));
        }

        /// Write telemetry data to the specified output.
        pub fn emit_telemetry_to($snapshot: &TelemetrySnapshot<'_>, output: &mut dyn TelemetryOutput) {
            // Execute prelude to compute derived values.
            $( $prelude )*

            // Generate row from schema, then trim trailing comma.
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            let line = line.trim_end_matches(',');

            output.write_row(line);
        }
    };
}

define_telemetry! {
    columns: {
        t: "{:.4}",
        dt: "{:.5}",
        accel: "{}",
        reverse: "{}",
        turn: "{:.0}",
        brake: "{}",
        speed: "{:.2}",
        yaw_rate: "{:.3}",
        yaw_deg: "{:.2}",
        pitch_deg: "{:.2}",
        roll_deg: "{:.2}",
        drifting: "{}",
        slip: "{:.3}",
        boost: "{}",
        boost_left: "{:.3}",
        cooldown: "{:.3}",
        h_speed: "{:.2}",
        vel_x: "{:.2}",
        vel_y: "{:.2}",
        vel_z: "{:.2}",
        ang_x: "{:.3}",
        ang_y: "{:.3}",
        ang_z: "{:.3}",
        pos_x: "{:.2}",
        pos_y: "{:.2}",
        pos_z: "{:.2}",
        zone: "{}",
    },
    prelude: |t| {
        let (yaw, pitch, roll) = t.transform.rotation.to_euler(EulerRot::YXZ);
        let horizontal_speed = t.linear_vel.with_y(0.0).length();
        let position = t.transform.position;
        let zone = t.zone.unwrap_or("-");
    },
    row_values: {
        t.elapsed,
        t.dt,
        u8::from(t.controls.accelerate),
        u8::from(t.controls.reverse),
        t.controls.turn_intensity(),
        u8::from(t.controls.brake),
        t.state.speed,
        t.output.yaw_rate,
        yaw.to_degrees(),
        pitch.to_degrees(),
        roll.to_degrees(),
        u8::from(t.output.drifting),
        t.output.slip,
        u8::from(t.state.boost_active),
        t.state.boost_remaining,
        t.state.boost_cooldown_remaining,
        horizontal_speed,
        t.linear_vel.x,
        t.linear_vel.y,
        t.linear_vel.z,
        t.angular_vel.x,
        t.angular_vel.y,
        t.angular_vel.z,
        position.x,
        position.y,
        position.z,
        zone,
    }
}
