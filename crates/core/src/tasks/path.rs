//! Time-indexed path following
//!
//! A [`Trajectory`] is a pair of equal-length segment lists sampled at a
//! fixed timestep. [`PathFollowerTask`] captures both drive distances at
//! `begin` and, every update, commands the segment selected by elapsed
//! time as absolute setpoints offset from that baseline.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{ConfigError, TaskError};
use crate::operation::Operation;
use crate::task::{ControlTask, TaskContext};
use crate::traits::time::secs_to_us;
use crate::traits::AnalogSensor;

use super::require_baseline;

/// One sample of a single drive side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    /// Meters from the start of the path
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl Segment {
    pub const fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    timestep_secs: f64,
    left: Vec<Segment>,
    right: Vec<Segment>,
}

impl Trajectory {
    pub fn new(
        timestep_secs: f64,
        left: Vec<Segment>,
        right: Vec<Segment>,
    ) -> Result<Self, ConfigError> {
        if !(timestep_secs.is_finite() && timestep_secs > 0.0) {
            return Err(ConfigError::InvalidTimestep(timestep_secs));
        }
        if left.len() != right.len() {
            return Err(ConfigError::TrajectoryLengthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        if left.is_empty() {
            return Err(ConfigError::EmptyTrajectory);
        }
        Ok(Self {
            timestep_secs,
            left,
            right,
        })
    }

    /// Constant-velocity straight line covering `distance` in `secs`
    pub fn straight(distance: f64, secs: f64, timestep_secs: f64) -> Result<Self, ConfigError> {
        if !(secs.is_finite() && secs > 0.0) {
            return Err(ConfigError::InvalidDuration {
                task: "path",
                value: secs,
            });
        }
        if !(timestep_secs.is_finite() && timestep_secs > 0.0) {
            return Err(ConfigError::InvalidTimestep(timestep_secs));
        }

        let count = (libm::ceil(secs / timestep_secs) as usize).max(1);
        let velocity = distance / secs;
        let segments: Vec<Segment> = (1..=count)
            .map(|i| Segment::new(distance * i as f64 / count as f64, velocity, 0.0))
            .collect();
        Self::new(timestep_secs, segments.clone(), segments)
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn timestep_secs(&self) -> f64 {
        self.timestep_secs
    }

    /// `len × timestep`
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 * self.timestep_secs
    }

    /// `floor(elapsed / timestep)` clamped to `[0, len - 1]`
    pub fn segment_index(&self, elapsed_secs: f64) -> usize {
        let last = self.len() - 1;
        if !(elapsed_secs > 0.0) {
            return 0;
        }
        let index = libm::floor(elapsed_secs / self.timestep_secs);
        if index >= last as f64 {
            last
        } else {
            index as usize
        }
    }

    pub fn segment(&self, index: usize) -> (Segment, Segment) {
        let index = index.min(self.len() - 1);
        (self.left[index], self.right[index])
    }
}

/// Channels a path follower commands, reset to neutral on exit
const PATH_OUTPUTS: [Operation; 7] = [
    Operation::DrivePositionMode,
    Operation::DriveLeftPosition,
    Operation::DriveRightPosition,
    Operation::DriveLeftVelocity,
    Operation::DriveRightVelocity,
    Operation::DriveLeftAcceleration,
    Operation::DriveRightAcceleration,
];

#[derive(Debug, Clone)]
pub struct PathFollowerTask {
    name: Cow<'static, str>,
    trajectory: Trajectory,
    duration_us: u64,
    baseline: Option<(f64, f64)>,
    start_us: u64,
    skipped: bool,
}

impl PathFollowerTask {
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            name: Cow::Borrowed("follow_path"),
            duration_us: secs_to_us(trajectory.duration_secs()),
            trajectory,
            baseline: None,
            start_us: 0,
            skipped: false,
        }
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Left/right distances captured at `begin`
    pub fn baseline(&self) -> Option<(f64, f64)> {
        self.baseline
    }

    fn reset_neutral(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        for op in PATH_OUTPUTS {
            ctx.set(op, op.idle())?;
        }
        Ok(())
    }
}

impl ControlTask for PathFollowerTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let reading = ctx
            .analog(AnalogSensor::LeftDistance)
            .and_then(|left| Ok((left, ctx.analog(AnalogSensor::RightDistance)?)));
        self.baseline = require_baseline(ctx, &self.name, reading);
        self.skipped = self.baseline.is_none();
        self.start_us = ctx.now_us();
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let Some((left_base, right_base)) = self.baseline else {
            return Ok(());
        };

        let index = self.trajectory.segment_index(ctx.secs_since(self.start_us));
        let (left, right) = self.trajectory.segment(index);

        ctx.set_digital(Operation::DrivePositionMode, true)?;
        ctx.set_analog(Operation::DriveLeftPosition, left_base + left.position)?;
        ctx.set_analog(Operation::DriveRightPosition, right_base + right.position)?;
        ctx.set_analog(Operation::DriveLeftVelocity, left.velocity)?;
        ctx.set_analog(Operation::DriveRightVelocity, right.velocity)?;
        ctx.set_analog(Operation::DriveLeftAcceleration, left.acceleration)?;
        ctx.set_analog(Operation::DriveRightAcceleration, right.acceleration)?;
        Ok(())
    }

    fn has_completed(&self, ctx: &TaskContext<'_>) -> bool {
        self.skipped || ctx.now_us().saturating_sub(self.start_us) >= self.duration_us
    }

    fn end(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.reset_neutral(ctx)
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.reset_neutral(ctx)
    }
}
