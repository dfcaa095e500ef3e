//! Lockstep harness: one robot, one simulated world, one shared mock clock.
//!
//! Each step runs a scheduler tick against the current sensor readings,
//! lets the mechanisms latch the frozen outputs, integrates physics over one
//! period and only then advances the clock.

use tickbot::{Robot, RobotFile, RobotMode};
use tickbot_core::traits::{MockTime, TimeSource};
use tickbot_core::{RobotConfig, RunStatus, TickReport};

use crate::error::SimulatorError;
use crate::mechanisms;
use crate::sim::{SimConfig, SimRobot};

/// Outcome of one autonomous run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub routine: String,
    pub ticks: u64,
    pub elapsed_secs: f64,
    /// The root completed rather than failing or being interrupted
    pub completed: bool,
    pub shots_fired: u32,
    pub left_distance_m: f64,
    pub right_distance_m: f64,
    pub heading_deg: f64,
}

pub struct SitlHarness {
    robot: Robot<MockTime, SimRobot>,
    sim: SimRobot,
    time: MockTime,
    step_us: u64,
}

impl SitlHarness {
    pub fn new(config: RobotConfig, sim_config: SimConfig) -> Self {
        let time = MockTime::new();
        let sim = SimRobot::new(sim_config);
        let step_us = config.scheduler.period_us();
        let robot = Robot::new(time.clone(), sim.clone(), config);
        Self::assemble(robot, sim, time, step_us)
    }

    pub fn from_file(file: &RobotFile, sim_config: SimConfig) -> Result<Self, SimulatorError> {
        let time = MockTime::new();
        let sim = SimRobot::new(sim_config);
        let robot = Robot::from_file(time.clone(), sim.clone(), file)?;
        let step_us = robot.driver().config().scheduler.period_us();
        Ok(Self::assemble(robot, sim, time, step_us))
    }

    fn assemble(
        mut robot: Robot<MockTime, SimRobot>,
        sim: SimRobot,
        time: MockTime,
        step_us: u64,
    ) -> Self {
        for mechanism in mechanisms::all(&sim) {
            robot.add_mechanism(mechanism);
        }
        Self {
            robot,
            sim,
            time,
            step_us,
        }
    }

    /// Tick, integrate one period, advance the clock
    pub fn step(&mut self) -> TickReport {
        let report = self.robot.tick();
        self.sim.step(self.step_us);
        self.time.advance(self.step_us);
        report
    }

    /// Step `count` times regardless of mode
    pub fn run_steps(&mut self, count: u64) {
        for _ in 0..count {
            self.step();
        }
    }

    /// Run the named routine until the robot disables itself
    pub fn run_autonomous(
        &mut self,
        routine: &str,
        max_steps: u64,
    ) -> Result<RunSummary, SimulatorError> {
        self.robot.select_routine(routine)?;
        self.robot.enter_autonomous()?;
        let start_us = self.time.now_us();

        let mut ticks = 0;
        let mut completed = false;
        while self.robot.mode() != &RobotMode::Disabled {
            if ticks >= max_steps {
                self.robot.set_mode(RobotMode::Disabled)?;
                return Err(SimulatorError::RunTimeout {
                    routine: routine.to_string(),
                    steps: ticks,
                });
            }
            let report = self.step();
            completed = report.status == RunStatus::Completed;
            ticks += 1;
        }

        let world = self.sim.world();
        let summary = RunSummary {
            routine: routine.to_string(),
            ticks,
            elapsed_secs: (self.time.now_us() - start_us) as f64 / 1_000_000.0,
            completed,
            shots_fired: world.intake.shots_fired(),
            left_distance_m: world.drivetrain.left_distance(),
            right_distance_m: world.drivetrain.right_distance(),
            heading_deg: world.drivetrain.heading_deg(),
        };
        tracing::info!(
            routine,
            ticks,
            completed,
            shots = summary.shots_fired,
            heading_deg = summary.heading_deg,
            "autonomous run finished"
        );
        Ok(summary)
    }

    pub fn robot(&self) -> &Robot<MockTime, SimRobot> {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut Robot<MockTime, SimRobot> {
        &mut self.robot
    }

    pub fn sim(&self) -> &SimRobot {
        &self.sim
    }

    pub fn time(&self) -> &MockTime {
        &self.time
    }

    pub fn step_us(&self) -> u64 {
        self.step_us
    }
}
