//! Robot mode manager
//!
//! Owns the run driver and the mechanisms and switches between the three
//! robot modes.
//!
//! ## Responsibilities
//!
//! - Install the root task for each mode (nothing, a routine, teleop)
//! - Run one scheduler tick per call and hand the frozen state to every
//!   mechanism
//! - Fall back to `Disabled` when an autonomous routine finishes
//!
//! ## Safety
//!
//! - Every transition cancels the current run first, so the full `stop`
//!   cascade runs and outputs are idle before the next root begins
//! - A routine that fails to build leaves the current mode untouched

use core::fmt;

use tickbot_core::operation::OperationState;
use tickbot_core::traits::{Mechanism, SensorSource, TimeSource};
use tickbot_core::{RobotConfig, RunDriver, RunStatus, TickReport};

use crate::config::RobotFile;
use crate::error::RobotError;
use crate::routines::RoutineCatalog;
use crate::teleop::TeleopTask;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RobotMode {
    #[default]
    Disabled,
    /// Running the named routine
    Autonomous(String),
    Teleop,
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotMode::Disabled => write!(f, "disabled"),
            RobotMode::Autonomous(routine) => write!(f, "autonomous({routine})"),
            RobotMode::Teleop => write!(f, "teleop"),
        }
    }
}

pub struct Robot<C: TimeSource, S: SensorSource> {
    driver: RunDriver<C, S>,
    mechanisms: Vec<Box<dyn Mechanism>>,
    catalog: RoutineCatalog,
    auto_routine: String,
    mode: RobotMode,
}

impl<C: TimeSource, S: SensorSource> Robot<C, S> {
    /// Disabled robot with the standard routines and `do_nothing` selected
    pub fn new(clock: C, sensors: S, config: RobotConfig) -> Self {
        Self {
            driver: RunDriver::new(clock, sensors, config),
            mechanisms: Vec::new(),
            catalog: RoutineCatalog::standard(),
            auto_routine: "do_nothing".to_string(),
            mode: RobotMode::Disabled,
        }
    }

    /// Build from a robot file; the configured routine must exist
    pub fn from_file(clock: C, sensors: S, file: &RobotFile) -> Result<Self, RobotError> {
        let config = file.robot_config()?;
        let mut robot = Self::new(clock, sensors, config);
        robot.select_routine(&file.auto_routine)?;
        Ok(robot)
    }

    pub fn with_catalog(mut self, catalog: RoutineCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn add_mechanism(&mut self, mechanism: Box<dyn Mechanism>) {
        tracing::debug!(mechanism = mechanism.name(), "mechanism attached");
        self.mechanisms.push(mechanism);
    }

    /// Choose the routine `enter_autonomous` will run
    pub fn select_routine(&mut self, name: &str) -> Result<(), RobotError> {
        if !self.catalog.contains(name) {
            return Err(RobotError::UnknownRoutine(name.to_string()));
        }
        self.auto_routine = name.to_string();
        Ok(())
    }

    pub fn enter_autonomous(&mut self) -> Result<(), RobotError> {
        self.set_mode(RobotMode::Autonomous(self.auto_routine.clone()))
    }

    /// Request mode change
    ///
    /// Performs cancel → install. The routine is built before anything is
    /// cancelled; if that fails the error is returned and the current mode
    /// keeps running.
    pub fn set_mode(&mut self, mode: RobotMode) -> Result<(), RobotError> {
        tracing::info!(from = %self.mode, to = %mode, "mode transition");

        match &mode {
            RobotMode::Disabled => {
                self.driver.cancel();
            }
            RobotMode::Autonomous(name) => {
                let routine = self
                    .catalog
                    .build(name, self.driver.config())
                    .inspect_err(|e| {
                        tracing::error!(routine = %name, error = %e, "failed to build routine");
                    })?;
                self.driver.cancel();
                self.driver.start(routine);
            }
            RobotMode::Teleop => {
                self.driver.cancel();
                self.driver.start_task(Box::new(TeleopTask::new()));
            }
        }

        self.mode = mode;
        self.apply_mechanisms();
        Ok(())
    }

    /// Run one tick and apply its outputs
    pub fn tick(&mut self) -> TickReport {
        let report = self.driver.advance_one_tick();
        self.apply_mechanisms();

        if self.mode != RobotMode::Disabled && report.status.is_finished() {
            match report.status {
                RunStatus::Completed => {
                    tracing::info!(
                        mode = %self.mode,
                        tick = report.tick,
                        "run complete, disabling"
                    );
                }
                _ => {
                    tracing::warn!(
                        mode = %self.mode,
                        tick = report.tick,
                        failure = ?self.driver.scheduler().failure(),
                        "run interrupted, disabling"
                    );
                }
            }
            self.mode = RobotMode::Disabled;
        }

        report
    }

    fn apply_mechanisms(&mut self) {
        let state = self.driver.operation_state();
        for mechanism in &mut self.mechanisms {
            if let Err(e) = mechanism.apply(state) {
                tracing::error!(mechanism = mechanism.name(), error = e, "mechanism apply failed");
            }
        }
    }

    pub fn mode(&self) -> &RobotMode {
        &self.mode
    }

    pub fn auto_routine(&self) -> &str {
        &self.auto_routine
    }

    pub fn catalog(&self) -> &RoutineCatalog {
        &self.catalog
    }

    pub fn operation_state(&self) -> &OperationState {
        self.driver.operation_state()
    }

    pub fn driver(&self) -> &RunDriver<C, S> {
        &self.driver
    }

    /// Sensors are only mutable between ticks
    pub fn sensors_mut(&mut self) -> &mut S {
        self.driver.sensors_mut()
    }
}
