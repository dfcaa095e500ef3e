//! Vision-guided centering
//!
//! Turns the robot in place until the vision target is centered. Three
//! strategies are supported and the choice is fixed at construction:
//!
//! | Strategy | Command | Completes when |
//! |----------|---------|----------------|
//! | `SingleShot` | position targets from the angle seen at `begin` | both sides within distance tolerance of their targets |
//! | `Continuous` | position targets recomputed from every new angle | measured angle within angle tolerance |
//! | `DirectPid` | percent output from a PID on the measured angle | measured angle within angle tolerance |
//!
//! A missing target at `begin` skips the task. A target lost mid-run keeps
//! the last command (position strategies) or commands nothing (`DirectPid`)
//! until it reappears.

use alloc::borrow::Cow;

use crate::control::{arc_length, Pid, PidGains};
use crate::error::{ConfigError, TaskError};
use crate::operation::Operation;
use crate::parameters::RobotConfig;
use crate::task::{ControlTask, TaskContext};
use crate::traits::AnalogSensor;

use super::require_baseline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenteringStrategy {
    SingleShot,
    Continuous,
    DirectPid,
}

impl CenteringStrategy {
    pub const fn name(self) -> &'static str {
        match self {
            CenteringStrategy::SingleShot => "center_single_shot",
            CenteringStrategy::Continuous => "center_continuous",
            CenteringStrategy::DirectPid => "center_direct_pid",
        }
    }
}

/// Construction parameters for [`VisionCenteringTask`]
#[derive(Debug, Clone, PartialEq)]
pub struct CenteringConfig {
    pub strategy: CenteringStrategy,
    /// Required by `DirectPid`, ignored otherwise
    pub gains: Option<PidGains>,
    pub angle_tolerance_deg: f64,
    pub distance_tolerance_m: f64,
    pub track_width_m: f64,
    pub output_limit: f64,
}

impl CenteringConfig {
    /// Fill tolerances, gains and geometry from the robot configuration
    pub fn from_robot(strategy: CenteringStrategy, config: &RobotConfig) -> Self {
        Self {
            strategy,
            gains: Some(config.vision.gains),
            angle_tolerance_deg: config.vision.tolerance_deg,
            distance_tolerance_m: config.drive.tolerance_m,
            track_width_m: config.drive.track_width_m,
            output_limit: config.drive.max_output,
        }
    }
}

#[derive(Debug)]
pub struct VisionCenteringTask {
    name: Cow<'static, str>,
    config: CenteringConfig,
    pid: Option<Pid>,
    /// Left/right position targets for the position strategies
    targets: Option<(f64, f64)>,
    last_angle: Option<f64>,
    last_us: u64,
    done: bool,
    skipped: bool,
}

impl VisionCenteringTask {
    pub fn new(config: CenteringConfig) -> Result<Self, ConfigError> {
        let task = config.strategy.name();

        let pid = match (config.strategy, config.gains) {
            (CenteringStrategy::DirectPid, Some(gains)) if gains.is_finite() => {
                Some(Pid::new(gains).with_output_limit(config.output_limit))
            }
            (CenteringStrategy::DirectPid, _) => return Err(ConfigError::MissingGains { task }),
            _ => None,
        };

        if !(config.track_width_m.is_finite() && config.track_width_m > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "track_width_m",
                reason: "must be positive",
            });
        }
        if !(config.angle_tolerance_deg >= 0.0 && config.distance_tolerance_m >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "tolerance",
                reason: "must be non-negative",
            });
        }

        Ok(Self {
            name: Cow::Borrowed(task),
            config,
            pid,
            targets: None,
            last_angle: None,
            last_us: 0,
            done: false,
            skipped: false,
        })
    }

    pub fn strategy(&self) -> CenteringStrategy {
        self.config.strategy
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Left/right position targets currently commanded
    pub fn targets(&self) -> Option<(f64, f64)> {
        self.targets
    }

    fn targets_from(&self, left: f64, right: f64, angle_deg: f64) -> (f64, f64) {
        let arc = arc_length(self.config.track_width_m, angle_deg);
        (left + arc, right - arc)
    }

    fn write_targets(&self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if let Some((left, right)) = self.targets {
            ctx.set_digital(Operation::DrivePositionMode, true)?;
            ctx.set_analog(Operation::DriveLeftPosition, left)?;
            ctx.set_analog(Operation::DriveRightPosition, right)?;
        }
        Ok(())
    }

    fn within_angle(&self, angle: f64) -> bool {
        libm::fabs(angle) <= self.config.angle_tolerance_deg
    }
}

impl ControlTask for VisionCenteringTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let reading = ctx.analog(AnalogSensor::VisionAngle).and_then(|angle| {
            let left = ctx.analog(AnalogSensor::LeftDistance)?;
            let right = ctx.analog(AnalogSensor::RightDistance)?;
            Ok((angle, left, right))
        });
        let Some((angle, left, right)) = require_baseline(ctx, &self.name, reading) else {
            self.skipped = true;
            return Ok(());
        };

        self.last_angle = Some(angle);
        self.last_us = ctx.now_us();
        if self.config.strategy != CenteringStrategy::DirectPid {
            self.targets = Some(self.targets_from(left, right, angle));
        }
        if let Some(pid) = self.pid.as_mut() {
            pid.reset();
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if self.skipped {
            return Ok(());
        }
        let dt = ctx.secs_since(self.last_us);
        self.last_us = ctx.now_us();

        match self.config.strategy {
            CenteringStrategy::SingleShot => {
                self.write_targets(ctx)?;
                if let Some((left_target, right_target)) = self.targets {
                    let left = ctx.analog(AnalogSensor::LeftDistance)?;
                    let right = ctx.analog(AnalogSensor::RightDistance)?;
                    let tolerance = self.config.distance_tolerance_m;
                    self.done = libm::fabs(left_target - left) <= tolerance
                        && libm::fabs(right_target - right) <= tolerance;
                }
            }
            CenteringStrategy::Continuous => {
                if let Ok(angle) = ctx.analog(AnalogSensor::VisionAngle) {
                    let left = ctx.analog(AnalogSensor::LeftDistance)?;
                    let right = ctx.analog(AnalogSensor::RightDistance)?;
                    self.targets = Some(self.targets_from(left, right, angle));
                    self.last_angle = Some(angle);
                    self.done = self.within_angle(angle);
                }
                self.write_targets(ctx)?;
            }
            CenteringStrategy::DirectPid => {
                let Ok(angle) = ctx.analog(AnalogSensor::VisionAngle) else {
                    return Ok(());
                };
                self.last_angle = Some(angle);
                self.done = self.within_angle(angle);
                if let Some(pid) = self.pid.as_mut() {
                    let turn = pid.step(angle, dt);
                    ctx.set_analog(Operation::DriveLeftPercent, turn)?;
                    ctx.set_analog(Operation::DriveRightPercent, -turn)?;
                }
            }
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.skipped || self.done
    }
}
