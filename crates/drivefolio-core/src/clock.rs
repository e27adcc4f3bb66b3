//! Frame timing.
//!
//! Host frame deltas are untrusted: a backgrounded tab or a debugger pause
//! can hand us zero, negative, NaN or multi-second values. Everything that
//! integrates goes through [`FrameClock::sanitize`] first.

use crate::config::ClockParams;

/// Length of the tick that per-tick factors are tuned for (60 Hz).
pub const NOMINAL_TICK: f32 = 1.0 / 60.0;

/// Scale a per-nominal-tick retention factor to an arbitrary `dt`.
///
/// `per_tick(0.9, NOMINAL_TICK) == 0.9`; two half ticks compose to the same result.
pub fn per_tick(factor: f32, dt: f32) -> f32 {
    factor.powf(dt / NOMINAL_TICK)
}

/// Outcome of sanitizing a raw frame delta.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameDelta {
    /// Usable delta, possibly clamped.
    Step(f32),
    /// Zero, negative or non-finite delta; the tick must not integrate.
    Skip,
}

impl FrameDelta {
    /// The usable delta, if any.
    pub fn seconds(self) -> Option<f32> {
        match self {
            FrameDelta::Step(dt) => Some(dt),
            FrameDelta::Skip => None,
        }
    }
}

/// Converts raw host deltas into safe integration steps.
#[derive(Clone, Debug)]
pub struct FrameClock {
    max_frame_delta: f32,
    elapsed: f32,
}

impl FrameClock {
    /// Create a clock that clamps deltas to `max_frame_delta`.
    pub fn new(params: &ClockParams) -> Self {
        Self {
            max_frame_delta: params.max_frame_delta,
            elapsed: 0.0,
        }
    }

    /// Sanitize a raw delta (seconds) and advance elapsed time by the result.
    pub fn sanitize(&mut self, raw_dt: f32) -> FrameDelta {
        if !raw_dt.is_finite() || raw_dt <= 0.0 {
            if raw_dt != 0.0 {
                tracing::warn!("Skipping frame with degenerate delta {raw_dt}");
            }
            return FrameDelta::Skip;
        }

        let dt = if raw_dt > self.max_frame_delta {
            tracing::warn!(
                "Clamping frame delta {:.3}s to {:.3}s",
                raw_dt,
                self.max_frame_delta
            );
            self.max_frame_delta
        } else {
            raw_dt
        };

        self.elapsed += dt;
        FrameDelta::Step(dt)
    }

    /// Total sanitized time seen so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Fixed-step schedule for driving a physics world from variable frames.
///
/// Frame time accumulates; each frame runs up to `max_substeps` fixed steps
/// and discards whatever backlog remains beyond that.
#[derive(Clone, Debug)]
pub struct StepSchedule {
    fixed_step: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl StepSchedule {
    pub fn new(params: &ClockParams) -> Self {
        Self {
            fixed_step: params.fixed_step,
            max_substeps: params.max_substeps,
            accumulator: 0.0,
        }
    }

    /// Fixed step length (seconds).
    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    /// Add a sanitized frame delta and return how many fixed steps to run.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        // Small epsilon so 1/60 + 1/60 + 1/60 yields three steps despite rounding.
        let available = ((self.accumulator + 1e-6) / self.fixed_step).floor() as u32;
        let steps = available.min(self.max_substeps);
        if available > steps {
            tracing::debug!("Dropping {} physics step(s) of backlog", available - steps);
            self.accumulator = 0.0;
        } else {
            self.accumulator = (self.accumulator - steps as f32 * self.fixed_step).max(0.0);
        }
        steps
    }
}
