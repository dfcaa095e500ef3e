//! Tick scheduler, run driver and timing statistics
//!
//! # Components
//!
//! - [`tick`]: [`TaskScheduler`], the per-tick walk of the active tree
//! - [`driver`]: [`RunDriver`], clock/sensor/config owner invoked once per period
//! - [`types`]: [`TickStats`] and [`SchedulerStats`]
//!
//! # Example
//!
//! ```rust
//! use tickbot_core::scheduler::RunDriver;
//! use tickbot_core::tasks::TimedTask;
//! use tickbot_core::traits::{MockSensors, MockTime};
//! use tickbot_core::{builder, RobotConfig};
//!
//! let time = MockTime::new();
//! let mut driver = RunDriver::new(time.clone(), MockSensors::new(), RobotConfig::default());
//! driver.start_task(builder::boxed(TimedTask::wait(0.1)?));
//!
//! while !driver.is_run_complete() {
//!     driver.advance_one_tick();
//!     time.advance(20_000);
//! }
//! assert!(driver.operation_state().is_idle());
//! # Ok::<(), tickbot_core::ConfigError>(())
//! ```

pub mod driver;
pub mod tick;
pub mod types;

pub use driver::RunDriver;
pub use tick::{RunStatus, TaskScheduler, TickEnv, TickReport};
pub use types::{SchedulerStats, TickStats};
