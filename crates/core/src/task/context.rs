//! Per-phase task context
//!
//! The scheduler creates one context per tick (or per cancellation) and
//! threads it through the tree. It carries the tick timestamp, the immutable
//! configuration, the sensors and the write handle into the operation state.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{SensorError, TaskError};
use crate::operation::{Operation, OperationState, OperationValue};
use crate::parameters::RobotConfig;
use crate::traits::time::us_to_secs;
use crate::traits::{AnalogSensor, DigitalSensor, SensorSource};

use super::TaskId;

/// Lifecycle transition kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEventKind {
    /// `begin` returned successfully
    Began,
    /// Natural completion, `end` called
    Completed,
    /// External interruption, `stop` called
    Interrupted,
    /// A callback returned an error; the task was interrupted
    Failed,
}

/// A lifecycle transition observed during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEvent {
    pub tick: u64,
    pub task: TaskId,
    pub name: String,
    pub kind: TaskEventKind,
}

/// Everything a task may touch during one lifecycle call
pub struct TaskContext<'a> {
    tick: u64,
    now_us: u64,
    config: &'a RobotConfig,
    sensors: &'a dyn SensorSource,
    state: &'a mut OperationState,
    events: &'a mut Vec<TaskEvent>,
    current: TaskId,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(
        tick: u64,
        now_us: u64,
        config: &'a RobotConfig,
        sensors: &'a dyn SensorSource,
        state: &'a mut OperationState,
        events: &'a mut Vec<TaskEvent>,
    ) -> Self {
        Self {
            tick,
            now_us,
            config,
            sensors,
            state,
            events,
            current: TaskId::SCHEDULER,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Tick timestamp in microseconds
    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    pub fn now_secs(&self) -> f64 {
        us_to_secs(self.now_us)
    }

    /// Seconds elapsed since `start_us` (zero if `start_us` is in the future)
    pub fn secs_since(&self, start_us: u64) -> f64 {
        us_to_secs(self.now_us.saturating_sub(start_us))
    }

    pub fn config(&self) -> &RobotConfig {
        self.config
    }

    pub fn sensors(&self) -> &dyn SensorSource {
        self.sensors
    }

    pub fn analog(&self, sensor: AnalogSensor) -> Result<f64, SensorError> {
        self.sensors.analog(sensor)
    }

    pub fn digital(&self, sensor: DigitalSensor) -> Result<bool, SensorError> {
        self.sensors.digital(sensor)
    }

    /// Task on whose behalf writes are currently recorded
    pub fn current_task(&self) -> TaskId {
        self.current
    }

    /// Record a command for this tick; the last write in traversal order wins
    pub fn set(&mut self, op: Operation, value: OperationValue) -> Result<(), TaskError> {
        self.state.write(op, value, self.current)
    }

    pub fn set_digital(&mut self, op: Operation, value: bool) -> Result<(), TaskError> {
        self.set(op, OperationValue::Digital(value))
    }

    pub fn set_analog(&mut self, op: Operation, value: f64) -> Result<(), TaskError> {
        self.set(op, OperationValue::Analog(value))
    }

    /// Value staged for `op` so far this tick
    pub fn staged(&self, op: Operation) -> OperationValue {
        self.state.staged(op)
    }

    pub(crate) fn enter(&mut self, task: TaskId) -> TaskId {
        core::mem::replace(&mut self.current, task)
    }

    pub(crate) fn exit(&mut self, previous: TaskId) {
        self.current = previous;
    }

    pub(crate) fn revert_writes_by(&mut self, task: TaskId) -> usize {
        self.state.revert_writes_by(task)
    }

    pub(crate) fn record(&mut self, task: TaskId, name: &str, kind: TaskEventKind) {
        self.events.push(TaskEvent {
            tick: self.tick,
            task,
            name: String::from(name),
            kind,
        });
    }
}
