//! Concurrent composite
//!
//! Every child that has not reached a terminal state is ticked each tick,
//! in declared order. "Concurrent" means several children are active in the
//! same tick, not parallel execution.
//!
//! # Completion policies
//!
//! - [`CompletionPolicy::All`]: completes once every child is terminal.
//! - [`CompletionPolicy::Any`]: completes on the tick the first child
//!   completes. Siblings still running are updated that tick and then
//!   stopped before the parallel reports completion.
//!
//! # Overlapping writes
//!
//! Children are updated in declared order, so when two children write the
//! same operation in one tick the value from the later child is published.
//!
//! # Failures
//!
//! A failed child counts as finished and its siblings keep running. Under
//! `Any`, if every child ends without one completing, the parallel fails.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{ConfigError, TaskError};
use crate::task::{BoxedTask, ControlTask, TaskContext, TaskNode, TaskStatus};

use super::child_failed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    #[default]
    All,
    Any,
}

pub struct Parallel {
    name: Cow<'static, str>,
    children: Vec<TaskNode>,
    policy: CompletionPolicy,
    done: bool,
}

impl Parallel {
    pub fn new(children: Vec<BoxedTask>, policy: CompletionPolicy) -> Result<Self, ConfigError> {
        if children.is_empty() {
            return Err(ConfigError::EmptyComposite { kind: "parallel" });
        }
        Ok(Self {
            name: Cow::Borrowed(match policy {
                CompletionPolicy::All => "parallel",
                CompletionPolicy::Any => "race",
            }),
            children: children.into_iter().map(TaskNode::new).collect(),
            policy,
            done: false,
        })
    }

    pub fn all(children: Vec<BoxedTask>) -> Result<Self, ConfigError> {
        Self::new(children, CompletionPolicy::All)
    }

    pub fn any(children: Vec<BoxedTask>) -> Result<Self, ConfigError> {
        Self::new(children, CompletionPolicy::Any)
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn children(&self) -> &[TaskNode] {
        &self.children
    }

    fn interrupt_running(&mut self, ctx: &mut TaskContext<'_>) {
        for child in &mut self.children {
            child.interrupt(ctx);
        }
    }
}

impl ControlTask for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        for child in &mut self.children {
            child.tick(ctx);
        }

        let all_terminal = self.children.iter().all(|c| c.status().is_terminal());
        match self.policy {
            CompletionPolicy::All => {
                self.done = all_terminal;
            }
            CompletionPolicy::Any => {
                let any_completed = self
                    .children
                    .iter()
                    .any(|c| c.status() == TaskStatus::Completed);
                if any_completed {
                    self.interrupt_running(ctx);
                    self.done = true;
                } else if all_terminal {
                    let failed = self.children.iter().find(|c| c.has_failed());
                    return Err(failed.map_or_else(
                        || TaskError::Other("all children interrupted".into()),
                        child_failed,
                    ));
                }
            }
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.interrupt_running(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use crate::operation::Operation;
    use crate::task::testing::{Call, CallLog, Fixture, StubTask};
    use crate::task::TaskEventKind;

    fn boxed(task: StubTask) -> BoxedTask {
        Box::new(task)
    }

    #[test]
    fn test_any_complete_stops_siblings_same_tick() {
        let mut fx = Fixture::new();
        let log = CallLog::new();
        let children = [
            boxed(StubTask::with_log("slow", log.clone())),
            boxed(StubTask::with_log("fast", log.clone()).completes_after(2)),
            boxed(StubTask::with_log("slower", log.clone()).completes_after(10)),
        ];
        let mut node = TaskNode::from_task(Parallel::any(children.into_iter().collect()).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        assert_eq!(node.status(), TaskStatus::Running);

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        assert_eq!(node.status(), TaskStatus::Completed);

        let completed_tick = fx
            .events
            .iter()
            .find(|e| e.name == "fast" && e.kind == TaskEventKind::Completed)
            .map(|e| e.tick);
        assert_eq!(completed_tick, Some(2));
        for sibling in ["slow", "slower"] {
            assert_eq!(
                log.calls_of(sibling),
                [Call::Begin, Call::Update, Call::Update, Call::Stop]
            );
            let stopped = fx
                .events
                .iter()
                .find(|e| e.name == sibling && e.kind == TaskEventKind::Interrupted)
                .map(|e| e.tick);
            assert_eq!(stopped, Some(2));
        }
        assert_eq!(fx.events_named("race").last(), Some(&TaskEventKind::Completed));
    }

    #[test]
    fn test_all_waits_for_every_child() {
        let mut fx = Fixture::new();
        let log = CallLog::new();
        let children = [
            boxed(StubTask::with_log("a", log.clone()).completes_after(1)),
            boxed(StubTask::with_log("b", log.clone()).completes_after(3)),
        ];
        let mut node = TaskNode::from_task(Parallel::all(children.into_iter().collect()).unwrap());

        let mut statuses = Vec::new();
        for _ in 0..3 {
            fx.tick(|ctx| {
                statuses.push(node.tick(ctx));
            });
        }

        assert_eq!(
            statuses,
            [TaskStatus::Running, TaskStatus::Running, TaskStatus::Completed]
        );
        assert_eq!(log.calls_of("a"), [Call::Begin, Call::Update, Call::End]);
        assert_eq!(log.calls_of("b").last(), Some(&Call::End));
    }

    #[test]
    fn test_later_child_write_wins() {
        let mut fx = Fixture::new();
        let first = StubTask::new("first").writes(Operation::ShooterSpeed, 0.25);
        let second = StubTask::new("second").writes(Operation::ShooterSpeed, 0.75);
        let children = [boxed(first), boxed(second)];
        let mut node = TaskNode::from_task(Parallel::all(children.into_iter().collect()).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(fx.state.analog(Operation::ShooterSpeed), 0.75);
        let second_id = fx
            .events
            .iter()
            .find(|e| e.name == "second")
            .map(|e| e.task);
        assert_eq!(fx.state.controller(Operation::ShooterSpeed), second_id);
    }

    #[test]
    fn test_reversed_order_reverses_winner() {
        let mut fx = Fixture::new();
        let first = StubTask::new("first").writes(Operation::ShooterSpeed, 0.75);
        let second = StubTask::new("second").writes(Operation::ShooterSpeed, 0.25);
        let children = [boxed(first), boxed(second)];
        let mut node = TaskNode::from_task(Parallel::all(children.into_iter().collect()).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(fx.state.analog(Operation::ShooterSpeed), 0.25);
    }

    #[test]
    fn test_failed_child_does_not_stop_siblings() {
        let mut fx = Fixture::new();
        let log = CallLog::new();
        let children = [
            boxed(
                StubTask::with_log("bad", log.clone())
                    .writes(Operation::IntakeRoller, 1.0)
                    .fails_update_at(1),
            ),
            boxed(
                StubTask::with_log("good", log.clone())
                    .writes(Operation::ClimberWinch, 0.5)
                    .completes_after(2),
            ),
        ];
        let mut node = TaskNode::from_task(Parallel::all(children.into_iter().collect()).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        assert_eq!(fx.state.analog(Operation::IntakeRoller), 0.0);
        assert_eq!(fx.state.analog(Operation::ClimberWinch), 0.5);

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        assert_eq!(node.status(), TaskStatus::Completed);
        assert_eq!(log.calls_of("good").last(), Some(&Call::End));
    }

    #[test]
    fn test_any_with_every_child_failed_fails() {
        let mut fx = Fixture::new();
        let children = [
            boxed(StubTask::new("a").fails_begin()),
            boxed(StubTask::new("b").fails_update_at(1)),
        ];
        let mut node = TaskNode::from_task(Parallel::any(children.into_iter().collect()).unwrap());

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Interrupted);
        assert!(matches!(node.failure(), Some(TaskError::ChildFailed { .. })));
    }
}
