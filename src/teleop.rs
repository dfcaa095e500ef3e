//! Operator-control root task
//!
//! Installed by the robot while in teleop. It never completes; each update
//! maps the live driver inputs onto drivetrain, intake and shooter
//! operations. A driver input that cannot be read is treated as released.

use tickbot_core::control::{deadband, DifferentialDrive};
use tickbot_core::traits::{AnalogSensor, DigitalSensor};
use tickbot_core::{ControlTask, Operation, TaskContext, TaskError};

/// Roller output while the intake button is held
const INTAKE_ROLLER: f64 = 0.8;

/// Flywheel output while the fire button is held
const SHOOTER_SPEED: f64 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct TeleopTask {
    updates: u64,
}

impl TeleopTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates since `begin`
    pub fn updates(&self) -> u64 {
        self.updates
    }

    fn axis(ctx: &TaskContext<'_>, sensor: AnalogSensor) -> f64 {
        match ctx.analog(sensor) {
            Ok(value) if value.is_finite() => value.clamp(-1.0, 1.0),
            Ok(_) | Err(_) => 0.0,
        }
    }

    fn button(ctx: &TaskContext<'_>, sensor: DigitalSensor) -> bool {
        ctx.digital(sensor).unwrap_or(false)
    }
}

impl ControlTask for TeleopTask {
    fn name(&self) -> &str {
        "teleop"
    }

    fn begin(&mut self, _ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.updates = 0;
        Ok(())
    }

    fn update(&mut self, ctx: &mut TaskContext<'_>) -> Result<(), TaskError> {
        self.updates += 1;

        let band = ctx.config().drive.deadband;
        let throttle = deadband(Self::axis(ctx, AnalogSensor::DriverThrottle), band);
        let turn = deadband(Self::axis(ctx, AnalogSensor::DriverTurn), band);
        let (left, right) = DifferentialDrive::mix(turn, throttle);
        ctx.set_analog(Operation::DriveLeftPercent, left)?;
        ctx.set_analog(Operation::DriveRightPercent, right)?;
        ctx.set_digital(
            Operation::DriveHighGear,
            Self::button(ctx, DigitalSensor::DriverShift),
        )?;

        if Self::button(ctx, DigitalSensor::DriverIntake) {
            ctx.set_digital(Operation::IntakeExtend, true)?;
            ctx.set_analog(Operation::IntakeRoller, INTAKE_ROLLER)?;
        }

        if Self::button(ctx, DigitalSensor::DriverFire) {
            ctx.set_analog(Operation::ShooterSpeed, SHOOTER_SPEED)?;
            ctx.set_digital(Operation::ShooterFeed, true)?;
        }

        Ok(())
    }

    fn has_completed(&self, _ctx: &TaskContext<'_>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbot_core::traits::{MockSensors, MockTime};
    use tickbot_core::{RobotConfig, RunDriver};

    fn driver(sensors: MockSensors) -> RunDriver<MockTime, MockSensors> {
        let mut driver = RunDriver::new(MockTime::new(), sensors, RobotConfig::default());
        driver.start_task(Box::new(TeleopTask::new()));
        driver
    }

    #[test]
    fn test_arcade_mix() {
        let mut sensors = MockSensors::new();
        sensors.set_analog(AnalogSensor::DriverThrottle, 0.5);
        sensors.set_analog(AnalogSensor::DriverTurn, 0.5);
        let mut driver = driver(sensors);
        driver.advance_one_tick();

        let state = driver.operation_state();
        assert!(state.analog(Operation::DriveLeftPercent) > 0.9);
        assert!(state.analog(Operation::DriveRightPercent).abs() < 1e-9);
    }

    #[test]
    fn test_deadband_holds_still() {
        let mut sensors = MockSensors::new();
        sensors.set_analog(AnalogSensor::DriverThrottle, 0.03);
        let mut driver = driver(sensors);
        driver.advance_one_tick();

        assert_eq!(driver.operation_state().analog(Operation::DriveLeftPercent), 0.0);
    }

    #[test]
    fn test_buttons() {
        let mut driver = driver(MockSensors::new());
        driver.advance_one_tick();
        assert!(!driver.operation_state().digital(Operation::IntakeExtend));

        driver.sensors_mut().set_digital(DigitalSensor::DriverIntake, true);
        driver.sensors_mut().set_digital(DigitalSensor::DriverShift, true);
        driver.advance_one_tick();
        let state = driver.operation_state();
        assert!(state.digital(Operation::IntakeExtend));
        assert!(state.digital(Operation::DriveHighGear));
        assert_eq!(state.analog(Operation::IntakeRoller), INTAKE_ROLLER);
        assert!(!state.digital(Operation::ShooterFeed));

        driver.sensors_mut().set_digital(DigitalSensor::DriverIntake, false);
        driver.sensors_mut().set_digital(DigitalSensor::DriverFire, true);
        driver.advance_one_tick();
        let state = driver.operation_state();
        assert_eq!(state.analog(Operation::IntakeRoller), 0.0);
        assert!(state.digital(Operation::ShooterFeed));
    }

    #[test]
    fn test_missing_input_is_released() {
        let mut sensors = MockSensors::new();
        sensors.clear_analog(AnalogSensor::DriverThrottle);
        sensors.clear_digital(DigitalSensor::DriverFire);
        let mut driver = driver(sensors);
        driver.advance_one_tick();

        assert!(!driver.is_run_complete());
        assert_eq!(driver.operation_state().analog(Operation::DriveLeftPercent), 0.0);
        assert!(!driver.operation_state().digital(Operation::ShooterFeed));
    }

    #[test]
    fn test_never_completes() {
        let mut driver = driver(MockSensors::new());
        for _ in 0..100 {
            driver.advance_one_tick();
        }
        assert!(!driver.is_run_complete());
    }
}
