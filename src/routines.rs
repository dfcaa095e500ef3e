//! Autonomous routine catalog
//!
//! Routines are built declaratively from the core task library each time
//! autonomous starts, so every run gets fresh task instances. The robot
//! file selects one by name.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use tickbot_core::builder::boxed;
use tickbot_core::composite::{Conditional, DefaultOutputs, Retry, Timeout};
use tickbot_core::tasks::{
    CenteringConfig, CenteringStrategy, PathFollowerTask, PidTask, Segment,
    SensorConditionedTask, TimedTask, Trajectory, VisionCenteringTask,
};
use tickbot_core::traits::DigitalSensor;
use tickbot_core::{ConfigError, Macro, MacroBuilder, Operation, RobotConfig};

use crate::error::RobotError;

/// Builds a routine against the loaded configuration
pub type RoutineFactory = fn(&RobotConfig) -> Result<Macro, ConfigError>;

/// Distance covered by `drive_forward` (m)
const DRIVE_FORWARD_M: f64 = 2.0;

/// Sample period of generated trajectories (s)
const PATH_TIMESTEP_S: f64 = 0.02;

pub struct RoutineCatalog {
    routines: BTreeMap<&'static str, RoutineFactory>,
}

impl RoutineCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self {
            routines: BTreeMap::new(),
        }
    }

    /// Catalog holding every built-in routine
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.register("do_nothing", do_nothing);
        catalog.register("drive_forward", drive_forward);
        catalog.register("center_and_shoot", center_and_shoot);
        catalog.register("follow_s_curve", follow_s_curve);
        catalog
    }

    /// Add or replace a routine
    pub fn register(&mut self, name: &'static str, factory: RoutineFactory) {
        if self.routines.insert(name, factory).is_some() {
            tracing::debug!(routine = name, "replaced routine");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routines.keys().copied()
    }

    /// Build a fresh instance of the named routine
    pub fn build(&self, name: &str, config: &RobotConfig) -> Result<Macro, RobotError> {
        let factory = self
            .routines
            .get(name)
            .ok_or_else(|| RobotError::UnknownRoutine(name.to_string()))?;
        Ok(factory(config)?)
    }
}

impl Default for RoutineCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Completes on its first tick with every output idle
pub fn do_nothing(_config: &RobotConfig) -> Result<Macro, ConfigError> {
    MacroBuilder::new("do_nothing")
        .then(TimedTask::wait(0.0)?)
        .build()
}

/// Closed-loop drive straight ahead, bounded to five seconds
pub fn drive_forward(config: &RobotConfig) -> Result<Macro, ConfigError> {
    MacroBuilder::new("drive_forward")
        .then(PidTask::drive_distance(DRIVE_FORWARD_M, &config.drive)?)
        .with_timeout(5.0)
        .build()
}

/// Spin up while centering on the target, then feed one game piece
///
/// Centering only runs when a target is visible at the start of the step
/// and is retried once if the target drops out. The vision light stays on
/// for the whole routine.
pub fn center_and_shoot(config: &RobotConfig) -> Result<Macro, ConfigError> {
    let centering = CenteringConfig::from_robot(CenteringStrategy::Continuous, config);
    let aim = Retry::new(2, move || {
        let task = VisionCenteringTask::new(centering.clone())?;
        Ok(boxed(Timeout::new(boxed(task), 3.0)?))
    })?
    .named("aim");
    let aim_if_visible = Conditional::new(
        |ctx| ctx.digital(DigitalSensor::VisionTargetValid).unwrap_or(false),
        boxed(aim),
    )
    .named("aim_if_visible");

    let spin_up = TimedTask::new("spin_up", 1.0)?.holding(Operation::ShooterSpeed, 1.0)?;
    let fire = TimedTask::new("fire", 0.5)?
        .holding(Operation::ShooterSpeed, 1.0)?
        .holding(Operation::ShooterFeed, true)?;

    let body = tickbot_core::sequence![tickbot_core::parallel![aim_if_visible, spin_up]?, fire]?
        .named("center_and_shoot");
    let root = DefaultOutputs::new(boxed(body))
        .with_default(Operation::VisionLight, true)?
        .named("center_and_shoot");

    Macro::new("center_and_shoot", boxed(root)).with_timeout(8.0)
}

/// Follow an S-shaped path while running the intake until loaded
pub fn follow_s_curve(_config: &RobotConfig) -> Result<Macro, ConfigError> {
    let trajectory = s_curve(3.0, 1.0, 0.3)?;
    MacroBuilder::new("follow_s_curve")
        .then(PathFollowerTask::new(trajectory).named("s_curve"))
        .alongside(SensorConditionedTask::intake_until_loaded(0.8)?.with_timeout(3.0)?)
        .build()
}

/// Trajectory whose sides differ by a full sine period of `swing` m/s
fn s_curve(secs: f64, speed: f64, swing: f64) -> Result<Trajectory, ConfigError> {
    let count = (secs / PATH_TIMESTEP_S).ceil() as usize;
    let omega = 2.0 * PI / secs;

    let mut left = Vec::with_capacity(count);
    let mut right = Vec::with_capacity(count);
    let (mut left_pos, mut right_pos) = (0.0, 0.0);
    for i in 1..=count {
        let t = i as f64 * PATH_TIMESTEP_S;
        let delta_v = swing * (omega * t).sin();
        let delta_a = swing * omega * (omega * t).cos();
        left_pos += (speed + delta_v) * PATH_TIMESTEP_S;
        right_pos += (speed - delta_v) * PATH_TIMESTEP_S;
        left.push(Segment::new(left_pos, speed + delta_v, delta_a));
        right.push(Segment::new(right_pos, speed - delta_v, -delta_a));
    }

    Trajectory::new(PATH_TIMESTEP_S, left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_routines_build() {
        let catalog = RoutineCatalog::standard();
        let config = RobotConfig::default();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(
            names,
            ["center_and_shoot", "do_nothing", "drive_forward", "follow_s_curve"]
        );
        for name in names {
            let routine = catalog.build(name, &config).unwrap();
            assert_eq!(routine.name(), name);
        }
    }

    #[test]
    fn test_unknown_routine() {
        let catalog = RoutineCatalog::standard();
        let err = catalog.build("moonwalk", &RobotConfig::default()).unwrap_err();
        assert!(matches!(err, RobotError::UnknownRoutine(ref name) if name == "moonwalk"));
    }

    #[test]
    fn test_timeouts() {
        let config = RobotConfig::default();
        assert_eq!(drive_forward(&config).unwrap().timeout_secs(), Some(5.0));
        assert_eq!(do_nothing(&config).unwrap().timeout_secs(), None);
    }

    #[test]
    fn test_s_curve_shape() {
        let trajectory = s_curve(3.0, 1.0, 0.3).unwrap();
        assert_eq!(trajectory.len(), 150);
        let (left, right) = trajectory.segment(trajectory.len() - 1);
        // Both sides cover the same distance over a full period
        assert!((left.position - 3.0).abs() < 0.01);
        assert!((right.position - 3.0).abs() < 0.01);
        let (left, right) = trajectory.segment(37);
        assert!(left.velocity > right.velocity);
    }

    #[test]
    fn test_register_custom() {
        let mut catalog = RoutineCatalog::new();
        assert!(!catalog.contains("do_nothing"));
        catalog.register("idle", do_nothing);
        assert!(catalog.contains("idle"));
    }
}
