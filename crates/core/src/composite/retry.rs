//! Retry decorator
//!
//! Runs a child built from a factory. When the child fails, a fresh
//! instance is built and begins on the next tick, up to a fixed number of
//! attempts. A finished task instance is never restarted.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};

use crate::error::{ConfigError, TaskError};
use crate::task::{BoxedTask, ControlTask, TaskContext, TaskNode, TaskStatus};

type Factory = Box<dyn Fn() -> Result<BoxedTask, ConfigError>>;

pub struct Retry {
    name: Cow<'static, str>,
    factory: Factory,
    child: TaskNode,
    max_attempts: u32,
    attempt: u32,
    done: bool,
}

impl Retry {
    /// Build the first attempt immediately so configuration errors surface
    /// at construction.
    pub fn new<F>(max_attempts: u32, factory: F) -> Result<Self, ConfigError>
    where
        F: Fn() -> Result<BoxedTask, ConfigError> + 'static,
    {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        let child = TaskNode::new(factory()?);
        Ok(Self {
            name: Cow::Borrowed("retry"),
            factory: Box::new(factory),
            child,
            max_attempts,
            attempt: 1,
            done: false,
        })
    }

    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Attempt currently running (1-based)
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl ControlTask for Retry {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        match self.child.tick(ctx) {
            TaskStatus::Completed => {
                self.done = true;
            }
            TaskStatus::Interrupted if self.attempt < self.max_attempts => {
                tracing::warn!(
                    task = %self.name,
                    child = self.child.name(),
                    attempt = self.attempt,
                    max_attempts = self.max_attempts,
                    "child failed, retrying"
                );
                let task = (self.factory)().map_err(|err| TaskError::Other(err.to_string()))?;
                self.child = TaskNode::new(task);
                self.attempt += 1;
            }
            TaskStatus::Interrupted => {
                return Err(TaskError::RetriesExhausted {
                    child: String::from(self.child.name()),
                    attempts: self.attempt,
                });
            }
            TaskStatus::NotStarted | TaskStatus::Running => {}
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.done
    }

    fn stop(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.child.interrupt(ctx);
        Ok(())
    }
}
