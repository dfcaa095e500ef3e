//! Outputs held until a digital sensor changes

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{ConfigError, TaskError};
use crate::operation::{Operation, OperationValue};
use crate::task::{ControlTask, TaskContext};
use crate::traits::time::secs_to_us;
use crate::traits::DigitalSensor;

use super::{check_output, require_baseline};

/// Holds outputs until `sensor` reads `until`, optionally bounded by a timeout
///
/// The sensor is read before the outputs are written, so the tick on which
/// the level is reached commands nothing.
#[derive(Debug, Clone)]
pub struct SensorConditionedTask {
    name: Cow<'static, str>,
    sensor: DigitalSensor,
    until: bool,
    outputs: Vec<(Operation, OperationValue)>,
    timeout_us: Option<u64>,
    start_us: u64,
    reached: bool,
    timed_out: bool,
    skipped: bool,
}

impl SensorConditionedTask {
    pub fn new(name: impl Into<Cow<'static, str>>, sensor: DigitalSensor, until: bool) -> Self {
        Self {
            name: name.into(),
            sensor,
            until,
            outputs: Vec::new(),
            timeout_us: None,
            start_us: 0,
            reached: false,
            timed_out: false,
            skipped: false,
        }
    }

    /// Run the intake roller until the beam break trips
    pub fn intake_until_loaded(roller: f64) -> Result<Self, ConfigError> {
        Self::new("intake_until_loaded", DigitalSensor::IntakeBeamBreak, true)
            .holding(Operation::IntakeExtend, true)?
            .holding(Operation::IntakeRoller, roller)
    }

    pub fn holding(
        mut self,
        op: Operation,
        value: impl Into<OperationValue>,
    ) -> Result<Self, ConfigError> {
        let value = value.into();
        check_output("sensor_conditioned", op, value)?;
        self.outputs.push((op, value));
        Ok(self)
    }

    pub fn with_timeout(mut self, secs: f64) -> Result<Self, ConfigError> {
        if !(secs.is_finite() && secs >= 0.0) {
            return Err(ConfigError::InvalidDuration {
                task: "sensor_conditioned",
                value: secs,
            });
        }
        self.timeout_us = Some(secs_to_us(secs));
        Ok(self)
    }

    /// True if the task finished because its timeout expired
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

impl ControlTask for SensorConditionedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.start_us = ctx.now_us();
        let reading = ctx.digital(self.sensor);
        self.skipped = require_baseline(ctx, &self.name, reading).is_none();
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if self.skipped {
            return Ok(());
        }

        if ctx.digital(self.sensor)? == self.until {
            self.reached = true;
            return Ok(());
        }

        if let Some(timeout) = self.timeout_us {
            if ctx.now_us().saturating_sub(self.start_us) >= timeout {
                tracing::debug!(task = %self.name, sensor = %self.sensor, "condition timed out");
                self.timed_out = true;
                return Ok(());
            }
        }

        for &(op, value) in &self.outputs {
            ctx.set(op, value)?;
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.skipped || self.reached || self.timed_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::testing::Fixture;
    use crate::task::{TaskNode, TaskStatus};

    #[test]
    fn test_holds_until_sensor_level() {
        let mut fx = Fixture::new();
        let mut node =
            TaskNode::from_task(SensorConditionedTask::intake_until_loaded(0.8).unwrap());

        for _ in 0..3 {
            fx.tick(|ctx| {
                node.tick(ctx);
            });
            assert!(fx.state.digital(Operation::IntakeExtend));
            assert_eq!(fx.state.analog(Operation::IntakeRoller), 0.8);
        }

        fx.sensors.set_digital(DigitalSensor::IntakeBeamBreak, true);
        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert!(fx.state.is_idle());
    }

    #[test]
    fn test_timeout_completes() {
        let mut fx = Fixture::new();
        let mut node = TaskNode::from_task(
            SensorConditionedTask::intake_until_loaded(0.8)
                .unwrap()
                .with_timeout(1.0)
                .unwrap(),
        );

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        fx.advance_secs(1.0);
        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert!(fx.state.is_idle());
    }

    #[test]
    fn test_unavailable_sensor_skips() {
        let mut fx = Fixture::new();
        fx.sensors.clear_digital(DigitalSensor::IntakeBeamBreak);
        let mut node =
            TaskNode::from_task(SensorConditionedTask::intake_until_loaded(0.8).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert!(fx.state.is_idle());
    }

    #[test]
    fn test_stop_leaves_outputs_idle() {
        let mut fx = Fixture::new();
        let mut node =
            TaskNode::from_task(SensorConditionedTask::intake_until_loaded(1.0).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
            node.interrupt(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert!(fx.state.is_idle());
    }
}
