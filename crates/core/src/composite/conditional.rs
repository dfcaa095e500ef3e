//! Conditional branch
//!
//! Evaluates a predicate once at `begin` and runs exactly one branch for
//! the rest of its lifetime. With no `otherwise` branch a false predicate
//! completes immediately.

use alloc::borrow::Cow;
use alloc::boxed::Box;

use crate::error::TaskError;
use crate::task::{BoxedTask, ControlTask, TaskContext, TaskNode, TaskStatus};

use super::child_failed;

type Predicate = Box<dyn Fn(&TaskContext<'_>) -> bool>;

pub struct Conditional {
    name: Cow<'static, str>,
    predicate: Predicate,
    then: TaskNode,
    otherwise: Option<TaskNode>,
    chosen: Option<bool>,
}

impl Conditional {
    pub fn new<P>(predicate: P, then: BoxedTask) -> Self
    where
        P: Fn(&TaskContext<'_>) -> bool + 'static,
    {
        Self {
            name: Cow::Borrowed("conditional"),
            predicate: Box::new(predicate),
            then: TaskNode::new(then),
            otherwise: None,
            chosen: None,
        }
    }

    pub fn otherwise(mut self, task: BoxedTask) -> Self {
        self.otherwise = Some(TaskNode::new(task));
        self
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Predicate result captured at `begin`
    pub fn chosen(&self) -> Option<bool> {
        self.chosen
    }

    fn branch(&mut self) -> Option<&mut TaskNode> {
        match self.chosen {
            Some(true) => Some(&mut self.then),
            Some(false) => self.otherwise.as_mut(),
            None => None,
        }
    }

    fn branch_status(&self) -> Option<TaskStatus> {
        match self.chosen {
            Some(true) => Some(self.then.status()),
            Some(false) => self.otherwise.as_ref().map(TaskNode::status),
            None => None,
        }
    }
}

impl ControlTask for Conditional {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let chosen = (self.predicate)(ctx);
        tracing::debug!(task = %self.name, chosen, "branch selected");
        self.chosen = Some(chosen);
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if let Some(branch) = self.branch() {
            if branch.tick(ctx) == TaskStatus::Interrupted {
                return Err(child_failed(branch));
            }
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        match self.branch_status() {
            Some(status) => status == TaskStatus::Completed,
            // False predicate with no fallback
            None => self.chosen.is_some(),
        }
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.then.interrupt(ctx);
        if let Some(otherwise) = self.otherwise.as_mut() {
            otherwise.interrupt(ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::task::testing::{Call, Fixture, StubTask};
    use crate::traits::DigitalSensor;

    fn target_visible(ctx: &TaskContext<'_>) -> bool {
        ctx.digital(DigitalSensor::VisionTargetValid).unwrap_or(false)
    }

    #[test]
    fn test_runs_then_branch() {
        let mut fx = Fixture::new();
        fx.sensors.set_digital(DigitalSensor::VisionTargetValid, true);
        let then = StubTask::new("then").completes_after(1);
        let otherwise = StubTask::new("otherwise").completes_after(1);
        let (then_log, otherwise_log) = (then.log(), otherwise.log());
        let mut node = TaskNode::from_task(
            Conditional::new(target_visible, Box::new(then)).otherwise(Box::new(otherwise)),
        );

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert_eq!(then_log.calls(), [Call::Begin, Call::Update, Call::End]);
        assert!(otherwise_log.calls().is_empty());
    }

    #[test]
    fn test_branch_fixed_for_lifetime() {
        let mut fx = Fixture::new();
        let then = StubTask::new("then");
        let otherwise = StubTask::new("otherwise");
        let (then_log, otherwise_log) = (then.log(), otherwise.log());
        let mut node = TaskNode::from_task(
            Conditional::new(target_visible, Box::new(then)).otherwise(Box::new(otherwise)),
        );

        fx.tick(|ctx| {
            node.tick(ctx);
        });
        fx.sensors.set_digital(DigitalSensor::VisionTargetValid, true);
        fx.tick(|ctx| {
            node.tick(ctx);
        });
        fx.tick(|ctx| node.interrupt(ctx));

        assert!(then_log.calls().is_empty());
        assert_eq!(
            otherwise_log.calls(),
            [Call::Begin, Call::Update, Call::Update, Call::Stop]
        );
    }

    #[test]
    fn test_false_without_fallback_completes() {
        let mut fx = Fixture::new();
        let then = StubTask::new("then");
        let log = then.log();
        let mut node = TaskNode::from_task(Conditional::new(target_visible, Box::new(then)));

        fx.tick(|ctx| {
            node.tick(ctx);
        });

        assert_eq!(node.status(), TaskStatus::Completed);
        assert!(log.calls().is_empty());
    }
}
