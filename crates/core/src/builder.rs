//! Declarative task-tree construction
//!
//! Trees are built once, before a run starts, and never restructured while
//! running. Construction performs no I/O; every validation failure is a
//! [`ConfigError`] returned here rather than a failure during a tick.
//!
//! ```
//! use tickbot_core::builder::MacroBuilder;
//! use tickbot_core::tasks::TimedTask;
//! use tickbot_core::Operation;
//!
//! let routine = MacroBuilder::new("score")
//!     .then(TimedTask::drive(1.5, 0.5, 0.5)?)
//!     .then(TimedTask::new("spin_up", 1.0)?.holding(Operation::ShooterSpeed, 0.9)?)
//!     .alongside(TimedTask::new("light", 1.0)?.holding(Operation::VisionLight, true)?)
//!     .with_timeout(15.0)
//!     .build()?;
//! assert_eq!(routine.name(), "score");
//! # Ok::<(), tickbot_core::ConfigError>(())
//! ```

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::composite::{Parallel, Sequence, Timeout};
use crate::error::ConfigError;
use crate::task::{BoxedTask, ControlTask};

/// Erase a task into the opaque handle composites hold
pub fn boxed<T: ControlTask + 'static>(task: T) -> BoxedTask {
    Box::new(task)
}

/// Collect already-boxed tasks; used by [`sequence!`](crate::sequence) and
/// [`parallel!`](crate::parallel)
pub fn tasks<const N: usize>(tasks: [BoxedTask; N]) -> Vec<BoxedTask> {
    Vec::from(tasks)
}

/// Sequence of `children`, boxed
pub fn sequence(children: Vec<BoxedTask>) -> Result<BoxedTask, ConfigError> {
    Ok(boxed(Sequence::new(children)?))
}

/// Parallel of `children` completing when all are done, boxed
pub fn parallel(children: Vec<BoxedTask>) -> Result<BoxedTask, ConfigError> {
    Ok(boxed(Parallel::all(children)?))
}

/// Parallel of `children` completing when the first one completes, boxed
pub fn race(children: Vec<BoxedTask>) -> Result<BoxedTask, ConfigError> {
    Ok(boxed(Parallel::any(children)?))
}

/// Build a [`Sequence`] from a list of tasks
///
/// Evaluates to `Result<Sequence, ConfigError>`.
#[macro_export]
macro_rules! sequence {
    ($($task:expr),+ $(,)?) => {
        $crate::composite::Sequence::new($crate::builder::tasks([
            $($crate::builder::boxed($task)),+
        ]))
    };
}

/// Build a [`Parallel`] (all-complete) from a list of tasks
///
/// Evaluates to `Result<Parallel, ConfigError>`.
#[macro_export]
macro_rules! parallel {
    ($($task:expr),+ $(,)?) => {
        $crate::composite::Parallel::all($crate::builder::tasks([
            $($crate::builder::boxed($task)),+
        ]))
    };
}

/// A named, ready-to-run task tree
pub struct Macro {
    name: Cow<'static, str>,
    root: BoxedTask,
    timeout_secs: Option<f64>,
}

impl Macro {
    pub fn new(name: impl Into<Cow<'static, str>>, root: BoxedTask) -> Self {
        Self {
            name: name.into(),
            root,
            timeout_secs: None,
        }
    }

    /// Bound the whole routine; on expiry the root is interrupted and the
    /// run ends `Interrupted` rather than `Completed`
    pub fn with_timeout(mut self, secs: f64) -> Result<Self, ConfigError> {
        let name = self.name.clone();
        self.root = boxed(Timeout::new(self.root, secs)?.named(name).failing());
        self.timeout_secs = Some(secs);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout_secs(&self) -> Option<f64> {
        self.timeout_secs
    }

    pub fn into_task(self) -> BoxedTask {
        self.root
    }
}

impl core::fmt::Debug for Macro {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Macro")
            .field("name", &self.name)
            .field("root", &self.root.name())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Fluent builder for a [`Macro`]
///
/// Each `then` starts a new step; `alongside` adds a task to the most
/// recent step. Steps with several tasks run as an all-complete parallel,
/// and steps run in order.
pub struct MacroBuilder {
    name: Cow<'static, str>,
    steps: Vec<Vec<BoxedTask>>,
    timeout_secs: Option<f64>,
}

impl MacroBuilder {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            timeout_secs: None,
        }
    }

    pub fn then<T: ControlTask + 'static>(self, task: T) -> Self {
        self.then_boxed(boxed(task))
    }

    pub fn then_boxed(mut self, task: BoxedTask) -> Self {
        let mut step = Vec::new();
        step.push(task);
        self.steps.push(step);
        self
    }

    pub fn alongside<T: ControlTask + 'static>(self, task: T) -> Self {
        self.alongside_boxed(boxed(task))
    }

    pub fn alongside_boxed(mut self, task: BoxedTask) -> Self {
        match self.steps.last_mut() {
            Some(step) => step.push(task),
            None => return self.then_boxed(task),
        }
        self
    }

    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<Macro, ConfigError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for mut step in self.steps {
            let task = if step.len() == 1 {
                step.remove(0)
            } else {
                parallel(step)?
            };
            steps.push(task);
        }

        let root = match steps.len() {
            0 => return Err(ConfigError::EmptyComposite { kind: "macro" }),
            1 => steps.remove(0),
            _ => boxed(Sequence::new(steps)?.named(self.name.clone())),
        };

        let routine = Macro::new(self.name, root);
        match self.timeout_secs {
            Some(secs) => routine.with_timeout(secs),
            None => Ok(routine),
        }
    }
}
