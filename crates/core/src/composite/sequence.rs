//! Sequential composite
//!
//! Exactly one child is active per tick: the first child that has not yet
//! reached a terminal state. A child that completes is never revisited; its
//! successor begins on the next tick. The sequence completes on the tick its
//! last child completes.
//!
//! A failed child fails the sequence, which interrupts every remaining
//! child (children that never began receive no callbacks).

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::{ConfigError, TaskError};
use crate::task::{BoxedTask, ControlTask, TaskContext, TaskNode, TaskStatus};

use super::child_failed;

pub struct Sequence {
    name: Cow<'static, str>,
    children: Vec<TaskNode>,
    current: usize,
}

impl Sequence {
    pub fn new(children: Vec<BoxedTask>) -> Result<Self, ConfigError> {
        if children.is_empty() {
            return Err(ConfigError::EmptyComposite { kind: "sequence" });
        }
        Ok(Self {
            name: Cow::Borrowed("sequence"),
            children: children.into_iter().map(TaskNode::new).collect(),
            current: 0,
        })
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn children(&self) -> &[TaskNode] {
        &self.children
    }

    /// Index of the active child (equal to the child count once finished)
    pub fn current(&self) -> usize {
        self.current
    }
}

impl ControlTask for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        let Some(child) = self.children.get_mut(self.current) else {
            return Ok(());
        };

        match child.tick(ctx) {
            TaskStatus::Completed => {
                self.current += 1;
                Ok(())
            }
            TaskStatus::Interrupted => Err(child_failed(child)),
            TaskStatus::NotStarted | TaskStatus::Running => Ok(()),
        }
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.current >= self.children.len()
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        for child in &mut self.children[self.current..] {
            child.interrupt(ctx);
        }
        Ok(())
    }
}
