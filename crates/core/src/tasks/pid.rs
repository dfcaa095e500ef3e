//! PID-driven leaf task
//!
//! Feeds (setpoint, measurement) into a [`Pid`] every update and writes the
//! result to one or more analog outputs, each with its own sign. The
//! setpoint is fixed at `begin`, either absolute or relative to the
//! measurement captured there.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::control::{Pid, PidGains, PidMode};
use crate::error::{ConfigError, SensorError, TaskError};
use crate::operation::{Operation, OperationKind};
use crate::parameters::DriveParams;
use crate::task::{ControlTask, TaskContext};
use crate::traits::AnalogSensor;

use super::{check_kind, require_baseline};

/// Which sensor(s) the loop closes on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Single(AnalogSensor),
    /// Mean of two readings, e.g. left and right drive distance
    Average(AnalogSensor, AnalogSensor),
}

impl Measurement {
    fn read(self, ctx: &TaskContext<'_>) -> Result<f64, SensorError> {
        match self {
            Measurement::Single(sensor) => ctx.analog(sensor),
            Measurement::Average(a, b) => Ok((ctx.analog(a)? + ctx.analog(b)?) / 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Absolute(f64),
    /// Offset from the measurement captured at `begin`
    Relative(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Runs until a parent interrupts it
    Never,
    /// Completes once `|setpoint - measurement|` is within the threshold
    ErrorBelow(f64),
}

/// Construction parameters for [`PidTask`]
#[derive(Debug, Clone)]
pub struct PidTaskConfig {
    pub measurement: Measurement,
    pub target: Target,
    pub mode: PidMode,
    pub gains: Option<PidGains>,
    /// Multiplied by the setpoint and added to the output; velocity mode only
    pub feed_forward: Option<f64>,
    pub completion: Completion,
    /// Output channels and the sign applied to the controller output
    pub outputs: Vec<(Operation, f64)>,
    pub output_limit: f64,
}

impl PidTaskConfig {
    pub fn new(measurement: Measurement, target: Target) -> Self {
        Self {
            measurement,
            target,
            mode: PidMode::Position,
            gains: None,
            feed_forward: None,
            completion: Completion::Never,
            outputs: Vec::new(),
            output_limit: 1.0,
        }
    }
}

/// Closed-loop task over any analog sensor
#[derive(Debug)]
pub struct PidTask {
    name: Cow<'static, str>,
    config: PidTaskConfig,
    pid: Pid,
    setpoint: f64,
    last_error: Option<f64>,
    last_us: Option<u64>,
    skipped: bool,
}

impl PidTask {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        config: PidTaskConfig,
    ) -> Result<Self, ConfigError> {
        let gains = config
            .gains
            .filter(PidGains::is_finite)
            .ok_or(ConfigError::MissingGains { task: "pid" })?;

        if config.feed_forward.is_some() && !config.mode.allows_feed_forward() {
            return Err(ConfigError::FeedForwardUnsupported {
                task: "pid",
                mode: config.mode,
            });
        }

        if config.outputs.is_empty() {
            return Err(ConfigError::NoOutputs { task: "pid" });
        }
        for &(op, _) in &config.outputs {
            check_kind("pid", op, OperationKind::Analog)?;
        }

        if let Completion::ErrorBelow(threshold) = config.completion {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "completion",
                    reason: "error threshold must be finite and non-negative",
                });
            }
        }

        Ok(Self {
            name: name.into(),
            pid: Pid::new(gains).with_output_limit(config.output_limit),
            config,
            setpoint: 0.0,
            last_error: None,
            last_us: None,
            skipped: false,
        })
    }

    /// Drive straight `meters` from the current averaged encoder distance
    pub fn drive_distance(meters: f64, drive: &DriveParams) -> Result<Self, ConfigError> {
        let mut config = PidTaskConfig::new(
            Measurement::Average(AnalogSensor::LeftDistance, AnalogSensor::RightDistance),
            Target::Relative(meters),
        );
        config.gains = Some(drive.gains);
        config.completion = Completion::ErrorBelow(drive.tolerance_m);
        config.output_limit = drive.max_output;
        config.outputs.push((Operation::DriveLeftPercent, 1.0));
        config.outputs.push((Operation::DriveRightPercent, 1.0));
        Self::new("drive_distance", config)
    }

    /// Turn in place to an absolute gyro heading
    pub fn turn_to_heading(
        heading_deg: f64,
        gains: PidGains,
        tolerance_deg: f64,
    ) -> Result<Self, ConfigError> {
        let mut config = PidTaskConfig::new(
            Measurement::Single(AnalogSensor::Heading),
            Target::Absolute(heading_deg),
        );
        config.gains = Some(gains);
        config.completion = Completion::ErrorBelow(tolerance_deg);
        config.outputs.push((Operation::DriveLeftPercent, 1.0));
        config.outputs.push((Operation::DriveRightPercent, -1.0));
        Self::new("turn_to_heading", config)
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Setpoint fixed at `begin`
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Error observed by the latest update
    pub fn last_error(&self) -> Option<f64> {
        self.last_error
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped
    }
}

impl ControlTask for PidTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let reading = self.config.measurement.read(ctx);
        let Some(baseline) = require_baseline(ctx, &self.name, reading) else {
            self.skipped = true;
            return Ok(());
        };

        self.setpoint = match self.config.target {
            Target::Absolute(value) => value,
            Target::Relative(offset) => baseline + offset,
        };
        self.pid.reset();
        self.last_us = Some(ctx.now_us());
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if self.skipped {
            return Ok(());
        }

        let measurement = self.config.measurement.read(ctx)?;
        let dt = self.last_us.map_or(0.0, |last| ctx.secs_since(last));
        self.last_us = Some(ctx.now_us());

        let mut output = self.pid.update(self.setpoint, measurement, dt);
        if let Some(kf) = self.config.feed_forward {
            output += kf * self.setpoint;
        }
        let limit = self.config.output_limit;
        let output = output.clamp(-limit, limit);
        self.last_error = Some(self.setpoint - measurement);

        for &(op, sign) in &self.config.outputs {
            ctx.set_analog(op, sign * output)?;
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        if self.skipped {
            return true;
        }
        match (self.config.completion, self.last_error) {
            (Completion::ErrorBelow(threshold), Some(error)) => libm::fabs(error) <= threshold,
            _ => false,
        }
    }
}
