//! Control math used inside individual tasks
//!
//! Pure functions and small stateful filters. The scheduler never calls
//! these directly; leaf tasks do.

mod kinematics;
mod pid;

pub use kinematics::{arc_length, deadband, DifferentialDrive};
pub use pid::{Pid, PidGains, PidMode};
