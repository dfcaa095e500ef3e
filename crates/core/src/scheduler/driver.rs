//! Run driver
//!
//! The external face of the scheduler: it owns the clock, the sensors and
//! the configuration, and exposes `advance_one_tick`, `is_run_complete` and
//! `cancel` to whatever loop invokes it at the control period.

use alloc::vec::Vec;

use crate::builder::Macro;
use crate::operation::OperationState;
use crate::parameters::RobotConfig;
use crate::task::{BoxedTask, TaskEvent, TaskNode};
use crate::traits::{SensorSource, TimeSource};

use super::tick::{RunStatus, TaskScheduler, TickEnv, TickReport};
use super::types::{SchedulerStats, TickStats};

pub struct RunDriver<C: TimeSource, S: SensorSource> {
    clock: C,
    sensors: S,
    config: RobotConfig,
    scheduler: TaskScheduler,
    tick_stats: TickStats,
    stats: SchedulerStats,
    first_tick_us: Option<u64>,
    last_tick_us: Option<u64>,
}

fn saturate(us: u64) -> u32 {
    u32::try_from(us).unwrap_or(u32::MAX)
}

impl<C: TimeSource, S: SensorSource> RunDriver<C, S> {
    pub fn new(clock: C, sensors: S, config: RobotConfig) -> Self {
        Self {
            clock,
            sensors,
            config,
            scheduler: TaskScheduler::new(),
            tick_stats: TickStats::default(),
            stats: SchedulerStats::default(),
            first_tick_us: None,
            last_tick_us: None,
        }
    }

    /// Start a routine, cancelling any active one first
    pub fn start(&mut self, routine: Macro) -> Vec<TaskEvent> {
        self.start_task(routine.into_task())
    }

    pub fn start_task(&mut self, task: BoxedTask) -> Vec<TaskEvent> {
        let was_active = !self.scheduler.is_run_complete();
        let env = TickEnv::new(self.clock.now_us(), &self.sensors, &self.config);
        let events = self.scheduler.start(TaskNode::new(task), &env);
        if was_active {
            self.stats.runs_interrupted = self.stats.runs_interrupted.saturating_add(1);
        }
        self.stats.runs_started = self.stats.runs_started.saturating_add(1);
        events
    }

    /// Run one tick of the active tree and publish its operation state
    pub fn advance_one_tick(&mut self) -> TickReport {
        let now_us = self.clock.now_us();
        let before = self.scheduler.status();

        let env = TickEnv::new(now_us, &self.sensors, &self.config);
        let report = self.scheduler.tick(&env);

        let execution_us = self.clock.elapsed_since(now_us);
        let period_us = self.last_tick_us.map(|last| saturate(now_us.saturating_sub(last)));
        let params = self.config.scheduler;
        self.tick_stats.update(
            saturate(execution_us),
            period_us,
            saturate(params.period_us()),
            params.budget_us,
        );
        if execution_us > u64::from(params.budget_us) {
            tracing::warn!(
                tick = report.tick,
                execution_us,
                budget_us = params.budget_us,
                "tick overran its budget"
            );
        }

        self.stats.total_deadline_misses = self.tick_stats.deadline_misses;
        self.stats
            .update_cpu_load(execution_us, params.period_us());
        let first = *self.first_tick_us.get_or_insert(now_us);
        self.stats.uptime_ms = now_us.saturating_sub(first) / 1000;
        self.last_tick_us = Some(now_us);

        if before == RunStatus::Running {
            match report.status {
                RunStatus::Completed => {
                    self.stats.runs_completed = self.stats.runs_completed.saturating_add(1);
                }
                RunStatus::Interrupted => {
                    self.stats.runs_interrupted = self.stats.runs_interrupted.saturating_add(1);
                }
                RunStatus::Idle | RunStatus::Running => {}
            }
        }

        report
    }

    /// True once the active run finished, or if none was started
    pub fn is_run_complete(&self) -> bool {
        self.scheduler.is_run_complete()
    }

    /// Interrupt the active tree; outputs are idle when this returns
    pub fn cancel(&mut self) -> Vec<TaskEvent> {
        let was_active = !self.scheduler.is_run_complete();
        let env = TickEnv::new(self.clock.now_us(), &self.sensors, &self.config);
        let events = self.scheduler.cancel(&env);
        if was_active {
            self.stats.runs_interrupted = self.stats.runs_interrupted.saturating_add(1);
        }
        events
    }

    pub fn status(&self) -> RunStatus {
        self.scheduler.status()
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Frozen state of the last tick, for mechanisms
    pub fn operation_state(&self) -> &OperationState {
        self.scheduler.state()
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// Sensors are only mutable between ticks
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn tick_stats(&self) -> &TickStats {
        &self.tick_stats
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}
