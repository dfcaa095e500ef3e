//! Per-tick operation state map
//!
//! The single source of truth mechanisms read from. Writes are staged
//! during a tick's update phase and become visible to readers only when the
//! scheduler freezes the tick.
//!
//! ## Phases
//!
//! - `Frozen`: readers see the values published by the last completed tick
//!   (idle defaults before the first tick). Writes are a programming error.
//! - `Updating`: the scheduler has reset the staged values to idle and
//!   tasks are recording their commands.

use crate::error::TaskError;
use crate::task::TaskId;

use super::{Operation, OperationValue};

/// Access phase of the state map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Frozen,
    Updating,
}

const IDLE_VALUES: [OperationValue; Operation::COUNT] = {
    let mut values = [OperationValue::Analog(0.0); Operation::COUNT];
    let mut i = 0;
    while i < Operation::COUNT {
        values[i] = Operation::ALL[i].idle();
        i += 1;
    }
    values
};

/// Operation → commanded value map
#[derive(Debug, Clone)]
pub struct OperationState {
    published: [OperationValue; Operation::COUNT],
    published_controllers: [Option<TaskId>; Operation::COUNT],
    staged: [OperationValue; Operation::COUNT],
    controllers: [Option<TaskId>; Operation::COUNT],
    phase: Phase,
    /// Tick currently being updated, or last frozen tick
    tick: u64,
}

impl OperationState {
    /// Create a state map holding idle values in both buffers
    pub fn new() -> Self {
        Self {
            published: IDLE_VALUES,
            published_controllers: [None; Operation::COUNT],
            staged: IDLE_VALUES,
            controllers: [None; Operation::COUNT],
            phase: Phase::Frozen,
            tick: 0,
        }
    }

    /// Value frozen by the last completed tick
    pub fn get(&self, op: Operation) -> OperationValue {
        self.published[op.index()]
    }

    /// Frozen digital value (`false` for analog operations)
    pub fn digital(&self, op: Operation) -> bool {
        self.get(op).as_bool().unwrap_or(false)
    }

    /// Frozen analog value (`0.0` for digital operations)
    pub fn analog(&self, op: Operation) -> f64 {
        self.get(op).as_f64().unwrap_or(0.0)
    }

    /// Task that commanded `op` in the last completed tick, if any
    pub fn controller(&self, op: Operation) -> Option<TaskId> {
        self.published_controllers[op.index()]
    }

    /// Iterate frozen values in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Operation, OperationValue)> + '_ {
        Operation::ALL
            .iter()
            .map(move |op| (*op, self.published[op.index()]))
    }

    /// True when every frozen value is idle and uncontrolled
    pub fn is_idle(&self) -> bool {
        self.published.iter().all(OperationValue::is_idle)
            && self.published_controllers.iter().all(Option::is_none)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Value staged so far in the current update phase
    pub fn staged(&self, op: Operation) -> OperationValue {
        self.staged[op.index()]
    }

    /// Open the update phase of `tick`, resetting staged values to idle
    pub(crate) fn open(&mut self, tick: u64) {
        assert!(
            self.phase == Phase::Frozen,
            "operation state opened twice (tick {})",
            tick
        );
        self.staged = IDLE_VALUES;
        self.controllers = [None; Operation::COUNT];
        self.phase = Phase::Updating;
        self.tick = tick;
    }

    /// Stage a write on behalf of `writer`; last write wins
    ///
    /// # Panics
    ///
    /// Panics when called outside an update phase.
    pub(crate) fn write(
        &mut self,
        op: Operation,
        value: OperationValue,
        writer: TaskId,
    ) -> Result<(), TaskError> {
        assert!(
            self.phase == Phase::Updating,
            "write to {} outside of an update phase",
            op
        );

        if value.kind() != op.kind() {
            return Err(TaskError::KindMismatch {
                operation: op,
                actual: op.kind(),
                attempted: value.kind(),
            });
        }

        self.staged[op.index()] = value;
        self.controllers[op.index()] = Some(writer);
        Ok(())
    }

    /// Return every channel currently controlled by `writer` to idle
    ///
    /// Returns the number of channels reverted.
    pub(crate) fn revert_writes_by(&mut self, writer: TaskId) -> usize {
        let mut reverted = 0;
        for op in Operation::ALL {
            let i = op.index();
            if self.controllers[i] == Some(writer) {
                self.staged[i] = op.idle();
                self.controllers[i] = None;
                reverted += 1;
            }
        }
        reverted
    }

    /// Close the update phase and publish staged values to readers
    pub(crate) fn freeze(&mut self) {
        assert!(
            self.phase == Phase::Updating,
            "operation state frozen outside of an update phase"
        );
        self.published = self.staged;
        self.published_controllers = self.controllers;
        self.phase = Phase::Frozen;
    }
}

impl Default for OperationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;

    #[test]
    fn test_new_state_is_idle() {
        let state = OperationState::new();
        assert!(state.is_idle());
        assert_eq!(state.phase(), Phase::Frozen);
        assert!(!state.digital(Operation::IntakeExtend));
        assert_eq!(state.analog(Operation::DriveLeftPercent), 0.0);
    }

    #[test]
    fn test_writes_are_invisible_until_frozen() {
        let mut state = OperationState::new();
        state.open(1);
        state
            .write(Operation::IntakeRoller, OperationValue::Analog(0.8), TaskId(7))
            .unwrap();

        assert_eq!(state.analog(Operation::IntakeRoller), 0.0);
        assert_eq!(state.staged(Operation::IntakeRoller), OperationValue::Analog(0.8));

        state.freeze();
        assert_eq!(state.analog(Operation::IntakeRoller), 0.8);
        assert_eq!(state.controller(Operation::IntakeRoller), Some(TaskId(7)));
        assert_eq!(state.tick(), 1);
    }

    #[test]
    fn test_open_resets_to_idle() {
        let mut state = OperationState::new();
        state.open(1);
        state
            .write(Operation::IntakeExtend, OperationValue::Digital(true), TaskId(1))
            .unwrap();
        state.freeze();
        assert!(state.digital(Operation::IntakeExtend));

        state.open(2);
        state.freeze();
        assert!(!state.digital(Operation::IntakeExtend));
        assert_eq!(state.controller(Operation::IntakeExtend), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = OperationState::new();
        state.open(1);
        state
            .write(Operation::ShooterSpeed, OperationValue::Analog(0.2), TaskId(1))
            .unwrap();
        state
            .write(Operation::ShooterSpeed, OperationValue::Analog(0.9), TaskId(2))
            .unwrap();
        state.freeze();
        assert_eq!(state.analog(Operation::ShooterSpeed), 0.9);
        assert_eq!(state.controller(Operation::ShooterSpeed), Some(TaskId(2)));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut state = OperationState::new();
        state.open(1);
        let err = state
            .write(Operation::IntakeExtend, OperationValue::Analog(1.0), TaskId(1))
            .unwrap_err();
        assert_eq!(
            err,
            TaskError::KindMismatch {
                operation: Operation::IntakeExtend,
                actual: OperationKind::Digital,
                attempted: OperationKind::Analog,
            }
        );
        assert_eq!(state.staged(Operation::IntakeExtend), OperationValue::Digital(false));
    }

    #[test]
    fn test_revert_only_touches_writer() {
        let mut state = OperationState::new();
        state.open(1);
        state
            .write(Operation::DriveLeftPercent, OperationValue::Analog(0.5), TaskId(1))
            .unwrap();
        state
            .write(Operation::DriveRightPercent, OperationValue::Analog(0.5), TaskId(2))
            .unwrap();

        assert_eq!(state.revert_writes_by(TaskId(1)), 1);
        state.freeze();
        assert_eq!(state.analog(Operation::DriveLeftPercent), 0.0);
        assert_eq!(state.analog(Operation::DriveRightPercent), 0.5);
    }

    #[test]
    #[should_panic(expected = "outside of an update phase")]
    fn test_write_after_freeze_panics() {
        let mut state = OperationState::new();
        state.open(1);
        state.freeze();
        let _ = state.write(Operation::VisionLight, OperationValue::Digital(true), TaskId(1));
    }
}
