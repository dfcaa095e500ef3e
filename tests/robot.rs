//! Robot-level tests against mock time and sensors

use std::fs;

use tickbot::tickbot_core::operation::Operation;
use tickbot::tickbot_core::RunStatus;
use tickbot::tickbot_core::traits::{AnalogSensor, DigitalSensor, MockSensors, MockTime};
use tickbot::{logging, Robot, RobotError, RobotFile, RobotMode, RoutineCatalog};

const PERIOD_US: u64 = 20_000;

fn run_until_disabled(
    robot: &mut Robot<MockTime, MockSensors>,
    time: &MockTime,
    max: usize,
) -> usize {
    for tick in 1..=max {
        robot.tick();
        time.advance(PERIOD_US);
        if robot.mode() == &RobotMode::Disabled {
            return tick;
        }
    }
    max
}

#[test]
fn sample_robot_file_is_valid() {
    let file = RobotFile::from_yaml_str(include_str!("../config/robot.yaml")).unwrap();
    let config = file.robot_config().unwrap();
    assert!(config.is_valid());
    assert!(RoutineCatalog::standard().contains(&file.auto_routine));
}

#[test]
fn robot_from_file_on_disk() {
    logging::init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("robot.yaml");
    fs::write(&path, "auto_routine: do_nothing\nparameters:\n  DRV_MAX_OUT: 0.5\n").unwrap();

    let file = RobotFile::load(&path).unwrap();
    let time = MockTime::new();
    let mut robot = Robot::from_file(time.clone(), MockSensors::new(), &file).unwrap();
    assert!((robot.driver().config().drive.max_output - 0.5).abs() < 1e-6);

    robot.enter_autonomous().unwrap();
    assert_eq!(run_until_disabled(&mut robot, &time, 10), 1);
    assert!(robot.operation_state().is_idle());
}

#[test]
fn rejected_file_surfaces_as_robot_error() {
    let file = RobotFile::from_yaml_str("parameters:\n  SCHED_RATE_HZ: 200\n").unwrap();
    let err = Robot::from_file(MockTime::new(), MockSensors::new(), &file)
        .err()
        .unwrap();
    assert!(matches!(err, RobotError::Config(_)));
}

#[test]
fn center_and_shoot_without_target_still_fires() {
    logging::init_for_tests();
    let time = MockTime::new();
    let mut robot = Robot::new(time.clone(), MockSensors::new(), Default::default());
    robot.select_routine("center_and_shoot").unwrap();
    robot.enter_autonomous().unwrap();

    let mut fired = false;
    let mut light_on = true;
    for _ in 0..200 {
        robot.tick();
        time.advance(PERIOD_US);
        if robot.mode() == &RobotMode::Disabled {
            break;
        }
        let state = robot.operation_state();
        fired |= state.digital(Operation::ShooterFeed);
        light_on &= state.digital(Operation::VisionLight);
    }

    assert_eq!(robot.mode(), &RobotMode::Disabled);
    assert!(fired);
    assert!(light_on);
    assert!(robot.operation_state().is_idle());
}

#[test]
fn drive_forward_times_out_when_stalled() {
    let time = MockTime::new();
    let mut robot = Robot::new(time.clone(), MockSensors::new(), Default::default());
    robot.select_routine("drive_forward").unwrap();
    robot.enter_autonomous().unwrap();

    // Encoders never move, so only the routine timeout can end the run
    let ticks = run_until_disabled(&mut robot, &time, 1_000);
    assert_eq!(ticks, 251);
    assert_eq!(robot.driver().stats().runs_completed, 0);
    assert_eq!(robot.driver().stats().runs_interrupted, 1);
    assert_eq!(robot.driver().status(), RunStatus::Interrupted);
}

#[test]
fn teleop_runs_until_disabled() {
    let time = MockTime::new();
    let mut robot = Robot::new(time.clone(), MockSensors::new(), Default::default());
    robot.set_mode(RobotMode::Teleop).unwrap();

    robot.sensors_mut().set_analog(AnalogSensor::DriverThrottle, -0.5);
    robot.sensors_mut().set_digital(DigitalSensor::DriverIntake, true);
    for _ in 0..50 {
        robot.tick();
        time.advance(PERIOD_US);
    }
    assert_eq!(robot.mode(), &RobotMode::Teleop);
    let state = robot.operation_state();
    assert!(state.analog(Operation::DriveLeftPercent) < 0.0);
    assert!(state.digital(Operation::IntakeExtend));

    robot.set_mode(RobotMode::Disabled).unwrap();
    assert!(robot.operation_state().is_idle());
}
