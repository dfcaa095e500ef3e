//! tickbot_sitl - Software-in-the-loop simulation for tickbot
//!
//! Simulated drivetrain, intake, shooter and vision hardware behind the same
//! sensor and mechanism interfaces the real robot uses, plus a lockstep
//! harness that runs a [`tickbot::Robot`] against them in simulated time.

pub mod error;
pub mod harness;
pub mod mechanisms;
pub mod sim;
pub mod time;

pub use error::SimulatorError;
pub use harness::{RunSummary, SitlHarness};
pub use sim::{DriverInputs, SimConfig, SimRobot};
pub use time::TimeMode;
