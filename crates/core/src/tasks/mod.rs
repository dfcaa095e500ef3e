//! Leaf tasks
//!
//! Leaves are the only tasks that write operations. Each one captures what it
//! needs at `begin` and keeps its completion predicate a pure function of
//! that captured state, the tick time and the latest sensor readings.
//!
//! If a leaf cannot read a baseline it needs at `begin`, it skips all of its
//! writes and reports completion on the same tick instead of commanding
//! outputs computed from a missing value.

pub mod conditioned;
pub mod path;
pub mod pid;
pub mod timed;
pub mod vision;

pub use conditioned::SensorConditionedTask;
pub use path::{PathFollowerTask, Segment, Trajectory};
pub use pid::{Completion, Measurement, PidTask, PidTaskConfig, Target};
pub use timed::TimedTask;
pub use vision::{CenteringConfig, CenteringStrategy, VisionCenteringTask};

use crate::error::{ConfigError, SensorError};
use crate::operation::{Operation, OperationKind, OperationValue};
use crate::task::TaskContext;

/// Unwrap a baseline reading, logging a fail-safe skip if it is unavailable
pub(crate) fn require_baseline<T>(
    ctx: &TaskContext<'_>,
    task: &str,
    reading: Result<T, SensorError>,
) -> Option<T> {
    match reading {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(
                task,
                id = %ctx.current_task(),
                tick = ctx.tick(),
                error = %err,
                "baseline unavailable, skipping writes"
            );
            None
        }
    }
}

/// Reject an output whose value kind does not match the operation
pub(crate) fn check_output(
    task: &'static str,
    op: Operation,
    value: OperationValue,
) -> Result<(), ConfigError> {
    check_kind(task, op, value.kind())
}

pub(crate) fn check_kind(
    task: &'static str,
    op: Operation,
    expected: OperationKind,
) -> Result<(), ConfigError> {
    if op.kind() == expected {
        Ok(())
    } else {
        Err(ConfigError::OperationKind {
            task,
            operation: op,
            expected,
            actual: op.kind(),
        })
    }
}
