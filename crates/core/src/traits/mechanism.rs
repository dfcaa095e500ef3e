//! Mechanism interface
//!
//! Mechanisms are the consumers of the operation state. After each tick
//! closes they read the frozen values for the operations they own and turn
//! them into actuator commands. How that conversion happens is up to the
//! implementation; the scheduler only guarantees one coherent value per
//! operation per tick.
//!
//! ## Safety
//!
//! Implementations must treat the state as read-only and must not assume an
//! operation was refreshed this tick: an operation nobody wrote carries its
//! idle value. The channels a mechanism reads are `Operation::owned_by(id)`.

use crate::operation::{MechanismId, OperationState};

/// Consumer of frozen operation values
pub trait Mechanism {
    /// Mechanism family this instance implements
    fn id(&self) -> MechanismId;

    /// Name for logging and telemetry
    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Apply the frozen values of the last completed tick
    fn apply(&mut self, state: &OperationState) -> Result<(), &'static str>;
}
