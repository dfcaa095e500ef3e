//! Lifecycle node
//!
//! [`TaskNode`] wraps a task with its identity and lifecycle state and is
//! the only caller of the task's callbacks. Composites own their children
//! as nodes, and the scheduler owns the root node, so the same transition
//! rules apply at every depth of the tree.
//!
//! ## Failure handling
//!
//! An error from any callback is caught here, logged with task identity
//! and tick number, and converted into an interruption:
//! - `begin`/`update` error: `stop` is called, status becomes `Interrupted`
//! - `end` error: `end` already ran, so `stop` is not called
//! - `stop` error: logged, status becomes `Interrupted`
//!
//! In every terminal case the channels the task wrote this tick are
//! returned to idle before the tick is frozen.

use alloc::boxed::Box;

use crate::error::TaskError;

use super::{BoxedTask, ControlTask, TaskContext, TaskEventKind, TaskId, TaskStatus};

/// A task plus its identity and lifecycle state
pub struct TaskNode {
    id: TaskId,
    status: TaskStatus,
    task: BoxedTask,
    failure: Option<TaskError>,
}

impl TaskNode {
    pub fn new(task: BoxedTask) -> Self {
        Self {
            id: TaskId::next(),
            status: TaskStatus::NotStarted,
            task,
            failure: None,
        }
    }

    pub fn from_task<T: ControlTask + 'static>(task: T) -> Self {
        Self::new(Box::new(task))
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn task(&self) -> &dyn ControlTask {
        &*self.task
    }

    /// Error that interrupted this task, if any
    pub fn failure(&self) -> Option<&TaskError> {
        self.failure.as_ref()
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Run this node for one tick
    ///
    /// Begins the task on its first visit, updates it, then evaluates
    /// completion and calls `end` if it completed. Terminal nodes are left
    /// untouched. Returns the status after the tick.
    pub fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        let previous = ctx.enter(self.id);
        self.advance(ctx);
        ctx.exit(previous);
        self.status
    }

    /// Force this node to `Interrupted`
    ///
    /// A running task gets `stop` exactly once; a task that never began gets
    /// no callback. Terminal nodes are left untouched.
    pub fn interrupt(&mut self, ctx: &mut TaskContext<'_>) {
        match self.status {
            TaskStatus::NotStarted => {
                self.status = TaskStatus::Interrupted;
            }
            TaskStatus::Running => {
                let previous = ctx.enter(self.id);
                let result = self.task.stop(ctx);
                ctx.revert_writes_by(self.id);
                self.status = TaskStatus::Interrupted;

                match result {
                    Ok(()) => {
                        tracing::debug!(
                            task = self.task.name(),
                            id = %self.id,
                            tick = ctx.tick(),
                            "task interrupted"
                        );
                        ctx.record(self.id, self.task.name(), TaskEventKind::Interrupted);
                    }
                    Err(err) => {
                        tracing::error!(
                            task = self.task.name(),
                            id = %self.id,
                            tick = ctx.tick(),
                            error = %err,
                            "task stop failed"
                        );
                        self.failure = Some(err);
                        ctx.record(self.id, self.task.name(), TaskEventKind::Failed);
                    }
                }
                ctx.exit(previous);
            }
            TaskStatus::Completed | TaskStatus::Interrupted => {}
        }
    }

    fn advance(&mut self, ctx: &mut TaskContext<'_>) {
        if self.status == TaskStatus::NotStarted {
            self.status = TaskStatus::Running;
            if let Err(err) = self.task.begin(ctx) {
                self.fail(ctx, err);
                return;
            }
            tracing::debug!(
                task = self.task.name(),
                id = %self.id,
                tick = ctx.tick(),
                "task began"
            );
            ctx.record(self.id, self.task.name(), TaskEventKind::Began);
        }

        if let Err(err) = self.task.update(ctx) {
            self.fail(ctx, err);
            return;
        }

        if self.task.has_completed(ctx) {
            self.complete(ctx);
        }
    }

    fn complete(&mut self, ctx: &mut TaskContext<'_>) {
        let result = self.task.end(ctx);
        ctx.revert_writes_by(self.id);

        match result {
            Ok(()) => {
                self.status = TaskStatus::Completed;
                tracing::debug!(
                    task = self.task.name(),
                    id = %self.id,
                    tick = ctx.tick(),
                    "task completed"
                );
                ctx.record(self.id, self.task.name(), TaskEventKind::Completed);
            }
            Err(err) => {
                tracing::error!(
                    task = self.task.name(),
                    id = %self.id,
                    tick = ctx.tick(),
                    error = %err,
                    "task end failed"
                );
                self.status = TaskStatus::Interrupted;
                self.failure = Some(err);
                ctx.record(self.id, self.task.name(), TaskEventKind::Failed);
            }
        }
    }

    fn fail(&mut self, ctx: &mut TaskContext<'_>, err: TaskError) {
        tracing::error!(
            task = self.task.name(),
            id = %self.id,
            tick = ctx.tick(),
            error = %err,
            "task failed, interrupting"
        );

        if let Err(stop_err) = self.task.stop(ctx) {
            tracing::warn!(
                task = self.task.name(),
                id = %self.id,
                error = %stop_err,
                "stop after failure also failed"
            );
        }
        ctx.revert_writes_by(self.id);

        self.status = TaskStatus::Interrupted;
        self.failure = Some(err);
        ctx.record(self.id, self.task.name(), TaskEventKind::Failed);
    }
}

impl core::fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskNode")
            .field("id", &self.id)
            .field("name", &self.task.name())
            .field("status", &self.status)
            .field("failure", &self.failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use crate::task::testing::{Call, Fixture, StubTask};

    #[test]
    fn test_begin_update_on_first_visit() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a");
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Running);
        assert_eq!(log.calls(), [Call::Begin, Call::Update]);
    }

    #[test]
    fn test_completion_calls_end_once() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a").completes_after(2);
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        for _ in 0..4 {
            fx.tick(|ctx| {
                node.tick(ctx);
            });
        }

        assert_eq!(node.status(), TaskStatus::Completed);
        assert_eq!(
            log.calls(),
            [Call::Begin, Call::Update, Call::Update, Call::End]
        );
    }

    #[test]
    fn test_interrupt_calls_stop_once() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a");
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        fx.tick(|ctx| {
            node.interrupt(ctx);
            node.interrupt(ctx);
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert_eq!(log.calls(), [Call::Begin, Call::Update, Call::Stop]);
    }

    #[test]
    fn test_interrupt_before_begin_makes_no_calls() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a");
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| node.interrupt(ctx));

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_update_failure_stops_and_reverts() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a")
            .writes(Operation::IntakeRoller, 0.7)
            .fails_update_at(2);
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        assert_eq!(fx.state.analog(Operation::IntakeRoller), 0.7);

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert!(node.has_failed());
        assert_eq!(fx.state.analog(Operation::IntakeRoller), 0.0);
        assert_eq!(
            log.calls(),
            [Call::Begin, Call::Update, Call::Update, Call::Stop]
        );
        assert_eq!(
            fx.event_kinds(),
            [TaskEventKind::Began, TaskEventKind::Failed]
        );
    }

    #[test]
    fn test_begin_failure_still_calls_stop() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a").fails_begin();
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert_eq!(log.calls(), [Call::Begin, Call::Stop]);
    }

    #[test]
    fn test_end_failure_does_not_call_stop() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a").completes_after(1).fails_end();
        let log = stub.log();
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert!(node.has_failed());
        assert_eq!(log.calls(), [Call::Begin, Call::Update, Call::End]);
    }

    #[test]
    fn test_end_reverts_writes_of_final_tick() {
        let mut fx = Fixture::new();
        let stub = StubTask::new("a")
            .writes(Operation::ShooterSpeed, 1.0)
            .completes_after(1);
        let mut node = TaskNode::from_task(stub);

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert_eq!(fx.state.analog(Operation::ShooterSpeed), 0.0);
        assert_eq!(fx.state.controller(Operation::ShooterSpeed), None);
    }
}
