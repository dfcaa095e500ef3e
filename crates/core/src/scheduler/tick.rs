//! Tick scheduler
//!
//! [`TaskScheduler`] owns the operation state and at most one root task.
//! Each tick it:
//!
//! 1. opens the state map (all staged values reset to idle),
//! 2. walks the root depth-first; composites decide which children are
//!    active, every active leaf is updated and then its completion is
//!    evaluated, and children settle before their parents,
//! 3. freezes the state map so mechanisms can read the tick's commands.
//!
//! Cancellation runs the whole `stop` cascade inside its own update phase
//! and then freezes, so the published state is idle before the next root
//! can begin.

use alloc::vec::Vec;

use crate::error::TaskError;
use crate::operation::OperationState;
use crate::parameters::RobotConfig;
use crate::task::{TaskContext, TaskEvent, TaskNode, TaskStatus};
use crate::traits::SensorSource;

/// Inputs for one tick (or one cancellation)
#[derive(Clone, Copy)]
pub struct TickEnv<'a> {
    pub now_us: u64,
    pub sensors: &'a dyn SensorSource,
    pub config: &'a RobotConfig,
}

impl<'a> TickEnv<'a> {
    pub fn new(now_us: u64, sensors: &'a dyn SensorSource, config: &'a RobotConfig) -> Self {
        Self {
            now_us,
            sensors,
            config,
        }
    }
}

/// Status of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    /// No root installed
    #[default]
    Idle,
    Running,
    Completed,
    /// Cancelled, or the root failed
    Interrupted,
}

impl RunStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Interrupted)
    }

    fn from_root(status: TaskStatus) -> Self {
        match status {
            TaskStatus::NotStarted | TaskStatus::Running => RunStatus::Running,
            TaskStatus::Completed => RunStatus::Completed,
            TaskStatus::Interrupted => RunStatus::Interrupted,
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub status: RunStatus,
    /// Lifecycle transitions in the order they happened
    pub events: Vec<TaskEvent>,
}

/// Owns the active task tree and the operation state
pub struct TaskScheduler {
    root: Option<TaskNode>,
    state: OperationState,
    tick: u64,
    status: RunStatus,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            root: None,
            state: OperationState::new(),
            tick: 0,
            status: RunStatus::Idle,
        }
    }

    /// Install a new root, cancelling the current one first
    ///
    /// Returns the events produced by the cancellation. The new root begins
    /// on the next tick.
    pub fn start(&mut self, root: TaskNode, env: &TickEnv<'_>) -> Vec<TaskEvent> {
        let events = self.cancel(env);
        tracing::info!(root = root.name(), id = %root.id(), tick = self.tick, "run started");
        self.root = Some(root);
        self.status = RunStatus::Running;
        events
    }

    /// Advance the active tree by one tick
    pub fn tick(&mut self, env: &TickEnv<'_>) -> TickReport {
        self.tick += 1;
        let mut events = Vec::new();

        self.state.open(self.tick);
        if let Some(root) = self.root.as_mut() {
            if !root.status().is_terminal() {
                let mut ctx = TaskContext::new(
                    self.tick,
                    env.now_us,
                    env.config,
                    env.sensors,
                    &mut self.state,
                    &mut events,
                );
                let status = root.tick(&mut ctx);
                self.status = RunStatus::from_root(status);

                match status {
                    TaskStatus::Completed => {
                        tracing::info!(root = root.name(), tick = self.tick, "run completed");
                    }
                    TaskStatus::Interrupted => {
                        tracing::warn!(root = root.name(), tick = self.tick, "run failed");
                    }
                    TaskStatus::NotStarted | TaskStatus::Running => {}
                }
            }
        }
        self.state.freeze();

        TickReport {
            tick: self.tick,
            status: self.status,
            events,
        }
    }

    /// Force the active tree to `Interrupted`
    ///
    /// Every running task in the tree is stopped before this returns and the
    /// published state is idle. Does nothing if no run is active.
    pub fn cancel(&mut self, env: &TickEnv<'_>) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        let Some(root) = self.root.as_mut() else {
            return events;
        };
        if root.status().is_terminal() {
            return events;
        }

        self.state.open(self.tick);
        let mut ctx = TaskContext::new(
            self.tick,
            env.now_us,
            env.config,
            env.sensors,
            &mut self.state,
            &mut events,
        );
        root.interrupt(&mut ctx);
        self.state.freeze();

        tracing::info!(root = root.name(), tick = self.tick, "run cancelled");
        self.status = RunStatus::Interrupted;
        events
    }

    /// True when no run is active: the root finished, was cancelled, or
    /// none was ever installed
    pub fn is_run_complete(&self) -> bool {
        self.root
            .as_ref()
            .is_none_or(|root| root.status().is_terminal())
    }

    /// Drop a finished root and return to `Idle`
    pub fn clear(&mut self) -> Option<TaskNode> {
        if self.is_run_complete() {
            self.status = RunStatus::Idle;
            self.root.take()
        } else {
            None
        }
    }

    /// Frozen state of the last completed tick
    pub fn state(&self) -> &OperationState {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn root(&self) -> Option<&TaskNode> {
        self.root.as_ref()
    }

    /// Error that ended the current run, if it failed
    pub fn failure(&self) -> Option<&TaskError> {
        self.root.as_ref().and_then(TaskNode::failure)
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    use crate::composite::{Parallel, Sequence};
    use crate::operation::Operation;
    use crate::task::testing::{Call, CallLog, StubTask};
    use crate::task::{BoxedTask, TaskEventKind};
    use crate::traits::MockSensors;

    struct Bench {
        scheduler: TaskScheduler,
        sensors: MockSensors,
        config: RobotConfig,
        now_us: u64,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                scheduler: TaskScheduler::new(),
                sensors: MockSensors::new(),
                config: RobotConfig::default(),
                now_us: 0,
            }
        }

        fn start(&mut self, task: BoxedTask) -> Vec<TaskEvent> {
            let env = TickEnv::new(self.now_us, &self.sensors, &self.config);
            self.scheduler.start(TaskNode::new(task), &env)
        }

        fn tick(&mut self) -> TickReport {
            self.now_us += 20_000;
            let env = TickEnv::new(self.now_us, &self.sensors, &self.config);
            self.scheduler.tick(&env)
        }

        fn cancel(&mut self) -> Vec<TaskEvent> {
            let env = TickEnv::new(self.now_us, &self.sensors, &self.config);
            self.scheduler.cancel(&env)
        }
    }

    #[test]
    fn test_no_root_is_idle_and_complete() {
        let mut bench = Bench::new();
        let report = bench.tick();
        assert_eq!(report.status, RunStatus::Idle);
        assert!(report.events.is_empty());
        assert!(bench.scheduler.is_run_complete());
        assert!(bench.scheduler.state().is_idle());
    }

    #[test]
    fn test_run_to_completion() {
        let mut bench = Bench::new();
        bench.start(Box::new(
            StubTask::new("a")
                .writes(Operation::IntakeRoller, 0.5)
                .completes_after(2),
        ));
        assert!(!bench.scheduler.is_run_complete());

        let first = bench.tick();
        assert_eq!(first.status, RunStatus::Running);
        assert_eq!(first.events[0].kind, TaskEventKind::Began);
        assert_eq!(bench.scheduler.state().analog(Operation::IntakeRoller), 0.5);

        let second = bench.tick();
        assert_eq!(second.status, RunStatus::Completed);
        assert!(bench.scheduler.is_run_complete());
        assert!(bench.scheduler.state().is_idle());

        // Further ticks keep outputs idle and produce no events
        let third = bench.tick();
        assert!(third.events.is_empty());
        assert_eq!(third.status, RunStatus::Completed);
    }

    #[test]
    fn test_state_reset_each_tick() {
        let mut bench = Bench::new();
        let children: Vec<BoxedTask> = [
            Box::new(
                StubTask::new("first")
                    .writes(Operation::ShooterSpeed, 1.0)
                    .completes_after(1),
            ) as BoxedTask,
            Box::new(StubTask::new("second").writes(Operation::ClimberWinch, 0.3)) as BoxedTask,
        ]
        .into_iter()
        .collect();
        bench.start(Box::new(Sequence::new(children).unwrap()));

        bench.tick();
        bench.tick();
        bench.tick();

        // "first" never writes again once completed
        assert_eq!(bench.scheduler.state().analog(Operation::ShooterSpeed), 0.0);
        assert_eq!(bench.scheduler.state().analog(Operation::ClimberWinch), 0.3);
    }

    #[test]
    fn test_cancel_stops_whole_tree_and_idles_outputs() {
        let mut bench = Bench::new();
        let log = CallLog::new();
        let children: Vec<BoxedTask> = [
            Box::new(
                StubTask::with_log("left", log.clone()).writes(Operation::DriveLeftPercent, 0.4),
            ) as BoxedTask,
            Box::new(
                StubTask::with_log("right", log.clone()).writes(Operation::DriveRightPercent, 0.4),
            ) as BoxedTask,
        ]
        .into_iter()
        .collect();
        bench.start(Box::new(Parallel::all(children).unwrap()));

        bench.tick();
        assert!(!bench.scheduler.state().is_idle());

        let events = bench.cancel();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.kind == TaskEventKind::Interrupted));
        assert_eq!(bench.scheduler.status(), RunStatus::Interrupted);
        assert!(bench.scheduler.is_run_complete());
        assert!(bench.scheduler.state().is_idle());
        assert_eq!(log.calls_of("left").last(), Some(&Call::Stop));
        assert_eq!(log.calls_of("right").last(), Some(&Call::Stop));

        // Cancelling twice is a no-op
        assert!(bench.cancel().is_empty());
    }

    #[test]
    fn test_start_cancels_previous_root_first() {
        let mut bench = Bench::new();
        let old = StubTask::new("old").writes(Operation::IntakeRoller, 1.0);
        let old_log = old.log();
        bench.start(Box::new(old));
        bench.tick();

        let new = StubTask::new("new");
        let new_log = new.log();
        let events = bench.start(Box::new(new));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "old");
        assert_eq!(old_log.calls().last(), Some(&Call::Stop));
        assert!(new_log.calls().is_empty());
        assert!(bench.scheduler.state().is_idle());

        bench.tick();
        assert_eq!(new_log.calls(), [Call::Begin, Call::Update]);
    }

    #[test]
    fn test_root_failure_reports_interrupted_and_idles() {
        let mut bench = Bench::new();
        bench.start(Box::new(
            StubTask::new("bad")
                .writes(Operation::ShooterSpeed, 1.0)
                .fails_update_at(2),
        ));

        bench.tick();
        let report = bench.tick();

        assert_eq!(report.status, RunStatus::Interrupted);
        assert_eq!(report.events.last().map(|e| e.kind), Some(TaskEventKind::Failed));
        assert!(bench.scheduler.failure().is_some());
        assert!(bench.scheduler.state().is_idle());
        assert!(bench.scheduler.is_run_complete());
    }

    #[test]
    fn test_clear_returns_to_idle() {
        let mut bench = Bench::new();
        bench.start(Box::new(StubTask::new("a").completes_after(1)));
        assert!(bench.scheduler.clear().is_none());
        bench.tick();
        assert!(bench.scheduler.clear().is_some());
        assert_eq!(bench.scheduler.status(), RunStatus::Idle);
    }

    #[test]
    fn test_every_started_task_gets_exactly_one_terminal_callback() {
        let mut bench = Bench::new();
        let log = CallLog::new();
        let inner: Vec<BoxedTask> = [
            Box::new(StubTask::with_log("p1", log.clone()).completes_after(2)) as BoxedTask,
            Box::new(StubTask::with_log("p2", log.clone())) as BoxedTask,
        ]
        .into_iter()
        .collect();
        let steps: Vec<BoxedTask> = [
            Box::new(StubTask::with_log("s1", log.clone()).completes_after(1)) as BoxedTask,
            Box::new(Parallel::any(inner).unwrap()) as BoxedTask,
            Box::new(StubTask::with_log("s3", log.clone()).fails_update_at(2)) as BoxedTask,
            Box::new(StubTask::with_log("s4", log.clone())) as BoxedTask,
        ]
        .into_iter()
        .collect();
        bench.start(Box::new(Sequence::new(steps).unwrap()));

        while !bench.scheduler.is_run_complete() {
            bench.tick();
            assert!(bench.scheduler.tick_count() < 50);
        }

        for name in ["s1", "p1", "p2", "s3", "s4"] {
            let calls = log.calls_of(name);
            let began = calls.contains(&Call::Begin);
            let terminals = calls
                .iter()
                .filter(|c| matches!(c, Call::End | Call::Stop))
                .count();
            assert_eq!(terminals, usize::from(began), "{name}: {calls:?}");
        }
        assert!(log.calls_of("s4").is_empty());
    }
}
