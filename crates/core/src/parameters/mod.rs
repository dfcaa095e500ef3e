//! Tuning parameters
//!
//! Parameters are registered with defaults into a `ParameterStore`, may be
//! overridden by the host (for example from a YAML file), and are then frozen
//! into a `RobotConfig` that tasks read through their context.

pub mod drive;
pub mod error;
pub mod robot;
pub mod scheduling;
pub mod storage;
pub mod vision;

pub use drive::DriveParams;
pub use error::ParameterError;
pub use robot::RobotConfig;
pub use scheduling::SchedulerParams;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
pub use vision::VisionParams;
