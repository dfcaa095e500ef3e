//! Fallback-output decorator
//!
//! Writes a set of fallback values every tick and then ticks its child. The
//! child's writes come later in traversal order, so they override the
//! fallbacks for whichever operations the child commands that tick.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{ConfigError, TaskError};
use crate::operation::{Operation, OperationValue};
use crate::task::{BoxedTask, ControlTask, TaskContext, TaskNode, TaskStatus};
use crate::tasks::check_output;

use super::child_failed;

pub struct DefaultOutputs {
    name: Cow<'static, str>,
    defaults: Vec<(Operation, OperationValue)>,
    child: TaskNode,
}

impl DefaultOutputs {
    pub fn new(child: BoxedTask) -> Self {
        Self {
            name: Cow::Borrowed("defaults"),
            defaults: Vec::new(),
            child: TaskNode::new(child),
        }
    }

    pub fn with_default(
        mut self,
        op: Operation,
        value: impl Into<OperationValue>,
    ) -> Result<Self, ConfigError> {
        let value = value.into();
        check_output("defaults", op, value)?;
        self.defaults.push((op, value));
        Ok(self)
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl ControlTask for DefaultOutputs {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        for &(op, value) in &self.defaults {
            ctx.set(op, value)?;
        }
        match self.child.tick(ctx) {
            TaskStatus::Interrupted => Err(child_failed(&self.child)),
            _ => Ok(()),
        }
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.child.status() == TaskStatus::Completed
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.child.interrupt(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    use crate::task::testing::{Fixture, StubTask};

    #[test]
    fn test_child_write_overrides_default() {
        let mut fx = Fixture::new();
        let child = StubTask::new("child").writes(Operation::ShooterSpeed, 0.9);
        let mut node = TaskNode::from_task(
            DefaultOutputs::new(Box::new(child))
                .with_default(Operation::ShooterSpeed, 0.3)
                .unwrap()
                .with_default(Operation::VisionLight, true)
                .unwrap(),
        );

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(fx.state.analog(Operation::ShooterSpeed), 0.9);
        assert!(fx.state.digital(Operation::VisionLight));
        assert_eq!(
            fx.state.controller(Operation::VisionLight),
            Some(node.id())
        );
        assert_ne!(
            fx.state.controller(Operation::ShooterSpeed),
            Some(node.id())
        );
    }

    #[test]
    fn test_default_applies_when_child_silent() {
        let mut fx = Fixture::new();
        let mut node = TaskNode::from_task(
            DefaultOutputs::new(Box::new(StubTask::new("silent")))
                .with_default(Operation::ShooterSpeed, 0.3)
                .unwrap(),
        );

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(fx.state.analog(Operation::ShooterSpeed), 0.3);
    }

    #[test]
    fn test_completion_leaves_everything_idle() {
        let mut fx = Fixture::new();
        let child = StubTask::new("child")
            .writes(Operation::ShooterSpeed, 0.9)
            .completes_after(1);
        let mut node = TaskNode::from_task(
            DefaultOutputs::new(Box::new(child))
                .with_default(Operation::ShooterSpeed, 0.3)
                .unwrap(),
        );

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert!(fx.state.is_idle());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let result = DefaultOutputs::new(Box::new(StubTask::new("x")))
            .with_default(Operation::ShooterFeed, 1.0);
        assert!(matches!(result, Err(ConfigError::OperationKind { .. })));
    }
}
