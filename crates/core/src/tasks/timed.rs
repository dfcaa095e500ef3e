//! Constant-output timed task

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{ConfigError, TaskError};
use crate::operation::{Operation, OperationValue};
use crate::task::{ControlTask, TaskContext};
use crate::traits::time::secs_to_us;

use super::check_output;

/// Holds a fixed set of outputs until a duration has elapsed
///
/// The start time is captured from the tick clock at `begin`; the task
/// completes on the first tick where `now - start >= duration`.
#[derive(Debug, Clone)]
pub struct TimedTask {
    name: Cow<'static, str>,
    duration_us: u64,
    outputs: Vec<(Operation, OperationValue)>,
    start_us: Option<u64>,
}

impl TimedTask {
    pub fn new(name: impl Into<Cow<'static, str>>, secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::InvalidDuration {
                task: "timed",
                value: secs,
            });
        }
        Ok(Self {
            name: name.into(),
            duration_us: secs_to_us(secs),
            outputs: Vec::new(),
            start_us: None,
        })
    }

    /// Hold the drivetrain at zero output for `secs`
    pub fn wait(secs: f64) -> Result<Self, ConfigError> {
        Self::new("wait", secs)?
            .holding(Operation::DriveLeftPercent, 0.0)?
            .holding(Operation::DriveRightPercent, 0.0)
    }

    /// Drive both sides at fixed percent outputs for `secs`
    pub fn drive(secs: f64, left: f64, right: f64) -> Result<Self, ConfigError> {
        Self::new("drive", secs)?
            .holding(Operation::DriveLeftPercent, left)?
            .holding(Operation::DriveRightPercent, right)
    }

    /// Add an output written every tick while the task runs
    pub fn holding(
        mut self,
        op: Operation,
        value: impl Into<OperationValue>,
    ) -> Result<Self, ConfigError> {
        let value = value.into();
        check_output("timed", op, value)?;
        self.outputs.push((op, value));
        Ok(self)
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn duration_us(&self) -> u64 {
        self.duration_us
    }

    pub fn outputs(&self) -> &[(Operation, OperationValue)] {
        &self.outputs
    }
}

impl ControlTask for TimedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.start_us = Some(ctx.now_us());
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        for &(op, value) in &self.outputs {
            ctx.set(op, value)?;
        }
        Ok(())
    }

    fn has_completed(&self, ctx: &TaskContext<'_>) -> bool {
        match self.start_us {
            Some(start) => ctx.now_us().saturating_sub(start) >= self.duration_us,
            None => false,
        }
    }
}
