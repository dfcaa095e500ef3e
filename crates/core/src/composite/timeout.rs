//! Timeout decorator
//!
//! Interrupts its child once the duration has elapsed since the decorator
//! began. By default the decorator then completes; with
//! [`Timeout::failing`] it fails instead, so the expiry reaches the parent
//! (and, at the root, the run status) as an interruption. The check happens
//! before the child is ticked, so the expiring tick carries no writes from
//! the child.

use alloc::borrow::Cow;
use alloc::string::ToString;

use crate::error::{ConfigError, TaskError};
use crate::task::{BoxedTask, ControlTask, TaskContext, TaskNode, TaskStatus};
use crate::traits::time::secs_to_us;

use super::child_failed;

pub struct Timeout {
    name: Cow<'static, str>,
    child: TaskNode,
    duration_us: u64,
    start_us: u64,
    expired: bool,
    fail_on_expiry: bool,
}

impl Timeout {
    pub fn new(child: BoxedTask, secs: f64) -> Result<Self, ConfigError> {
        if !(secs.is_finite() && secs >= 0.0) {
            return Err(ConfigError::InvalidDuration {
                task: "timeout",
                value: secs,
            });
        }
        Ok(Self {
            name: Cow::Borrowed("timeout"),
            child: TaskNode::new(child),
            duration_us: secs_to_us(secs),
            start_us: 0,
            expired: false,
            fail_on_expiry: false,
        })
    }

    /// Fail rather than complete when the deadline cuts the child off
    pub fn failing(mut self) -> Self {
        self.fail_on_expiry = true;
        self
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// True if the child was cut off by the deadline
    pub fn expired(&self) -> bool {
        self.expired
    }

    pub fn child(&self) -> &TaskNode {
        &self.child
    }
}

impl ControlTask for Timeout {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.start_us = ctx.now_us();
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        if ctx.now_us().saturating_sub(self.start_us) >= self.duration_us {
            tracing::info!(
                task = %self.name,
                child = self.child.name(),
                tick = ctx.tick(),
                "deadline reached, interrupting child"
            );
            self.child.interrupt(ctx);
            self.expired = true;
            if self.fail_on_expiry {
                return Err(TaskError::DeadlineExceeded {
                    task: self.name.to_string(),
                    limit_ms: self.duration_us / 1000,
                });
            }
            return Ok(());
        }

        match self.child.tick(ctx) {
            TaskStatus::Interrupted => Err(child_failed(&self.child)),
            _ => Ok(()),
        }
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.expired || self.child.status() == TaskStatus::Completed
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.child.interrupt(ctx);
        Ok(())
    }
}
