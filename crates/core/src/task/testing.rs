//! Test fixtures shared by the task, composite and scheduler tests

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::TaskError;
use crate::operation::{Operation, OperationState, OperationValue};
use crate::parameters::RobotConfig;
use crate::traits::time::secs_to_us;
use crate::traits::MockSensors;

use super::{ControlTask, TaskContext, TaskEvent, TaskEventKind};

/// Hand-rolled tick loop around a bare operation state
pub(crate) struct Fixture {
    pub state: OperationState,
    pub config: RobotConfig,
    pub sensors: MockSensors,
    pub now_us: u64,
    pub tick_no: u64,
    pub events: Vec<TaskEvent>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            state: OperationState::new(),
            config: RobotConfig::default(),
            sensors: MockSensors::new(),
            now_us: 0,
            tick_no: 0,
            events: Vec::new(),
        }
    }

    /// Open a tick, run `f` with a context, then freeze
    pub fn tick<R>(&mut self, f: impl FnOnce(&mut TaskContext<'_>) -> R) -> R {
        self.tick_no += 1;
        self.state.open(self.tick_no);
        let mut ctx = TaskContext::new(
            self.tick_no,
            self.now_us,
            &self.config,
            &self.sensors,
            &mut self.state,
            &mut self.events,
        );
        let result = f(&mut ctx);
        self.state.freeze();
        result
    }

    pub fn advance_secs(&mut self, secs: f64) {
        self.now_us += secs_to_us(secs);
    }

    pub fn event_kinds(&self) -> Vec<TaskEventKind> {
        self.events.iter().map(|e| e.kind).collect()
    }

    pub fn events_named(&self, name: &str) -> Vec<TaskEventKind> {
        self.events
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.kind)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Begin,
    Update,
    End,
    Stop,
}

/// Call log that can be shared by several stubs
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<(&'static str, Call)>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, name: &'static str, call: Call) {
        self.0.borrow_mut().push((name, call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().iter().map(|(_, call)| *call).collect()
    }

    pub fn entries(&self) -> Vec<(&'static str, Call)> {
        self.0.borrow().clone()
    }

    pub fn calls_of(&self, name: &str) -> Vec<Call> {
        self.0
            .borrow()
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, call)| *call)
            .collect()
    }

    /// Position of the first `call` made by `name`
    pub fn position(&self, name: &str, call: Call) -> Option<usize> {
        self.0
            .borrow()
            .iter()
            .position(|(n, c)| *n == name && *c == call)
    }
}

/// Scriptable task that records every callback
pub(crate) struct StubTask {
    name: &'static str,
    log: CallLog,
    writes: Vec<(Operation, OperationValue)>,
    completes_after: Option<u32>,
    updates: u32,
    fail_update_at: Option<u32>,
    fail_begin: bool,
    fail_end: bool,
}

impl StubTask {
    pub fn new(name: &'static str) -> Self {
        Self::with_log(name, CallLog::new())
    }

    pub fn with_log(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            log,
            writes: Vec::new(),
            completes_after: None,
            updates: 0,
            fail_update_at: None,
            fail_begin: false,
            fail_end: false,
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn writes(mut self, op: Operation, value: f64) -> Self {
        self.writes.push((op, OperationValue::Analog(value)));
        self
    }

    pub fn writes_digital(mut self, op: Operation, value: bool) -> Self {
        self.writes.push((op, OperationValue::Digital(value)));
        self
    }

    /// Complete on the `n`th update
    pub fn completes_after(mut self, n: u32) -> Self {
        self.completes_after = Some(n);
        self
    }

    /// Return an error from the `n`th update
    pub fn fails_update_at(mut self, n: u32) -> Self {
        self.fail_update_at = Some(n);
        self
    }

    pub fn fails_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    pub fn fails_end(mut self) -> Self {
        self.fail_end = true;
        self
    }
}

impl ControlTask for StubTask {
    fn name(&self) -> &str {
        self.name
    }

    fn begin(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.log.push(self.name, Call::Begin);
        if self.fail_begin {
            return Err(TaskError::Other("begin failed".into()));
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.log.push(self.name, Call::Update);
        self.updates += 1;
        for (op, value) in &self.writes {
            ctx.set(*op, *value)?;
        }
        if self.fail_update_at == Some(self.updates) {
            return Err(TaskError::Other("update failed".into()));
        }
        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        self.completes_after
            .is_some_and(|n| self.updates >= n)
    }

    fn end(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.log.push(self.name, Call::End);
        if self.fail_end {
            return Err(TaskError::Other("end failed".into()));
        }
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.log.push(self.name, Call::Stop);
        Ok(())
    }
}
