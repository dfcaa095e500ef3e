//! Platform-agnostic interfaces to the world outside the scheduler
//!
//! - [`time`]: monotonic time source ([`TimeSource`], [`MockTime`])
//! - [`sensors`]: sensor accessors tasks read in `begin`/`update`
//! - [`mechanism`]: consumers of the frozen operation state
//!
//! Mock implementations are always available for host testing.

pub mod mechanism;
pub mod sensors;
pub mod time;

pub use mechanism::Mechanism;
pub use sensors::{AnalogSensor, DigitalSensor, MockSensors, SensorSource};
pub use time::{MockTime, TimeSource};
