//! tickbot - Robot controller built on the tickbot_core task scheduler
//!
//! The core crate produces one coherent operation state per tick. This
//! crate wires it to a robot: configuration loading, logging, a monotonic
//! clock, the disabled/autonomous/teleop mode manager, the operator-control
//! root task and the catalog of autonomous routines.
//!
//! # Modules
//!
//! - [`config`]: YAML robot file with parameter overrides
//! - [`logging`]: `tracing-subscriber` initialization
//! - [`clock`]: [`MonotonicClock`] over `std::time::Instant`
//! - [`robot`]: [`Robot`] mode manager
//! - [`teleop`]: [`TeleopTask`], the always-present operator root
//! - [`routines`]: [`RoutineCatalog`] of named autonomous routines
//! - [`error`]: Error types for loading and running the robot

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod robot;
pub mod routines;
pub mod teleop;

pub use clock::MonotonicClock;
pub use config::RobotFile;
pub use error::{ConfigLoadError, RobotError};
pub use robot::{Robot, RobotMode};
pub use routines::RoutineCatalog;
pub use teleop::TeleopTask;

pub use tickbot_core;
