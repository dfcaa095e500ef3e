//! Control task abstraction
//!
//! A [`ControlTask`] is the unit of composable behavior. Leaf tasks write
//! operations; composite tasks own [`TaskNode`]s and decide which children
//! are active each tick.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --begin--> Running --update--> Running
//!                       Running --has_completed--> Completed   (end called once)
//!                       Running --interrupt------> Interrupted (stop called once)
//! ```
//!
//! Tasks never drive their own lifecycle. [`TaskNode`] invokes every
//! callback and guarantees exactly one of `end`/`stop` per started task.
//! A task that reached a terminal state is never reused.

mod context;
mod node;

pub use context::{TaskContext, TaskEvent, TaskEventKind};
pub use node::TaskNode;

use alloc::boxed::Box;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::TaskError;

/// Unique task identity, assigned when a task is wrapped in a [`TaskNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u32);

static NEXT_TASK_ID: AtomicU32 = AtomicU32::new(1);

impl TaskId {
    /// Identity used for writes made outside any task
    pub const SCHEDULER: TaskId = TaskId(0);

    pub(crate) fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state shared by every task variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Interrupted,
}

impl TaskStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Interrupted)
    }
}

/// Capability set every task exposes to the scheduler
///
/// `update` must be non-blocking and bounded: time-based waiting is
/// expressed by `has_completed` comparing elapsed time, never by sleeping.
pub trait ControlTask {
    /// Name for logging and events
    fn name(&self) -> &str;

    /// Called once on the first tick the task is active
    ///
    /// May capture a baseline from the sensors. If a required baseline
    /// cannot be read, the task should skip its writes and report
    /// completion rather than fail.
    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError>;

    /// Called once per tick while running; writes zero or more operations
    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError>;

    /// Completion predicate, evaluated after `update` in the same tick
    fn has_completed(&self, ctx: &TaskContext<'_>) -> bool;

    /// Called once on natural completion
    fn end(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }

    /// Called once on interruption (cancel, timeout, sibling completion, failure)
    fn stop(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Opaque handle to any task
pub type BoxedTask = Box<dyn ControlTask>;

impl<T: ControlTask + ?Sized> ControlTask for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        (**self).begin(ctx)
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        (**self).update(ctx)
    }

    fn has_completed(&self, ctx: &TaskContext<'_>) -> bool {
        (**self).has_completed(ctx)
    }

    fn end(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        (**self).end(ctx)
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        (**self).stop(ctx)
    }
}

#[cfg(test)]
pub(crate) mod testing;
