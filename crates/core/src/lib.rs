//! tickbot_core - Pure no_std control-task logic for tickbot
//!
//! This crate contains the operation catalog, the per-tick operation state
//! map, the control-task tree and the scheduler that walks it. Everything is
//! platform-agnostic and can be tested on host without hardware.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **no_std + alloc**: Task trees are heap-allocated, nothing else is assumed
//! - **Trait abstractions**: Time, sensors and mechanisms are injected via traits
//!
//! # Modules
//!
//! - [`operation`]: Operation catalog and the per-tick [`OperationState`] map
//! - [`task`]: [`ControlTask`] trait, lifecycle node and task context
//! - [`tasks`]: Leaf tasks (timed, PID, path follower, vision centering, sensor-conditioned)
//! - [`composite`]: Composite tasks (sequence, parallel, retry, timeout, conditional, defaults)
//! - [`scheduler`]: Tick scheduler, run driver and timing statistics
//! - [`builder`]: Declarative macro construction
//! - [`parameters`]: Parameter store and the immutable [`RobotConfig`]
//! - [`control`]: PID and drive kinematics helpers
//! - [`traits`]: Time, sensor and mechanism interfaces

#![no_std]

extern crate alloc;

pub mod builder;
pub mod composite;
pub mod control;
pub mod error;
pub mod operation;
pub mod parameters;
pub mod scheduler;
pub mod task;
pub mod tasks;
pub mod traits;

pub use builder::{Macro, MacroBuilder};
pub use error::{ConfigError, SensorError, TaskError};
pub use operation::{MechanismId, Operation, OperationKind, OperationState, OperationValue};
pub use parameters::RobotConfig;
pub use scheduler::{RunDriver, RunStatus, TaskScheduler, TickEnv, TickReport};
pub use task::{
    BoxedTask, ControlTask, TaskContext, TaskEvent, TaskEventKind, TaskId, TaskNode, TaskStatus,
};
