//! Error taxonomy for task construction, task execution and sensor reads
//!
//! - [`ConfigError`]: malformed task tree, fatal at construction time
//! - [`TaskError`]: failure raised from a lifecycle callback, recovered by the scheduler
//! - [`SensorError`]: a sensor reading could not be obtained

use alloc::string::String;

use crate::control::PidMode;
use crate::operation::{Operation, OperationKind};
use crate::traits::{AnalogSensor, DigitalSensor};

/// Errors raised while building a task tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{task}: duration must be finite and non-negative (got {value})")]
    InvalidDuration { task: &'static str, value: f64 },

    #[error("{task}: PID gains are required for this strategy")]
    MissingGains { task: &'static str },

    #[error("{task}: feed-forward is not supported in {mode} mode")]
    FeedForwardUnsupported { task: &'static str, mode: PidMode },

    #[error("{task}: no output operations configured")]
    NoOutputs { task: &'static str },

    #[error("{task}: operation {operation} is {actual}, expected {expected}")]
    OperationKind {
        task: &'static str,
        operation: Operation,
        expected: OperationKind,
        actual: OperationKind,
    },

    #[error("trajectory must contain at least one segment")]
    EmptyTrajectory,

    #[error("trajectory sides differ in length (left {left}, right {right})")]
    TrajectoryLengthMismatch { left: usize, right: usize },

    #[error("trajectory timestep must be positive (got {0})")]
    InvalidTimestep(f64),

    #[error("{kind} requires at least one child task")]
    EmptyComposite { kind: &'static str },

    #[error("retry requires at least one attempt")]
    ZeroAttempts,

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

/// Errors raised from inside `begin`/`update`/`end`/`stop`
///
/// The scheduler never propagates these past the tick in which they occur.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error("operation {operation} is {actual}, cannot write a {attempted} value")]
    KindMismatch {
        operation: Operation,
        actual: OperationKind,
        attempted: OperationKind,
    },

    #[error("child task `{child}` failed")]
    ChildFailed { child: String },

    #[error("child task `{child}` failed after {attempts} attempt(s)")]
    RetriesExhausted { child: String, attempts: u32 },

    #[error("`{task}` exceeded its {limit_ms} ms deadline")]
    DeadlineExceeded { task: String, limit_ms: u64 },

    #[error("{0}")]
    Other(String),
}

/// Errors from sensor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("analog sensor {0} unavailable")]
    AnalogUnavailable(AnalogSensor),

    #[error("digital sensor {0} unavailable")]
    DigitalUnavailable(DigitalSensor),

    #[error("vision target not visible")]
    NoTarget,
}
