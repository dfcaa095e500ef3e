//! Sensor accessors
//!
//! Tasks read mechanism-exposed sensors only inside `begin`/`update`, via
//! the [`SensorSource`] handed to them in the task context. Live driver
//! input is exposed the same way.

use core::fmt;

use crate::error::SensorError;

/// Scalar sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogSensor {
    /// Left drive encoder distance (m)
    LeftDistance,
    /// Right drive encoder distance (m)
    RightDistance,
    /// Left drive velocity (m/s)
    LeftVelocity,
    /// Right drive velocity (m/s)
    RightVelocity,
    /// Gyro heading (deg, clockwise positive)
    Heading,
    /// Horizontal angle to the vision target (deg, right positive)
    VisionAngle,
    /// Distance to the vision target (m)
    VisionDistance,
    /// Driver throttle axis (-1.0 to +1.0, forward positive)
    DriverThrottle,
    /// Driver turn axis (-1.0 to +1.0, right positive)
    DriverTurn,
}

impl AnalogSensor {
    pub const COUNT: usize = 9;

    pub const fn name(self) -> &'static str {
        match self {
            AnalogSensor::LeftDistance => "left_distance",
            AnalogSensor::RightDistance => "right_distance",
            AnalogSensor::LeftVelocity => "left_velocity",
            AnalogSensor::RightVelocity => "right_velocity",
            AnalogSensor::Heading => "heading",
            AnalogSensor::VisionAngle => "vision_angle",
            AnalogSensor::VisionDistance => "vision_distance",
            AnalogSensor::DriverThrottle => "driver_throttle",
            AnalogSensor::DriverTurn => "driver_turn",
        }
    }
}

impl fmt::Display for AnalogSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On/off sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitalSensor {
    /// Game piece present in the intake
    IntakeBeamBreak,
    /// Vision pipeline currently sees a target
    VisionTargetValid,
    /// Driver intake button
    DriverIntake,
    /// Driver shift-to-high-gear button
    DriverShift,
    /// Driver fire button
    DriverFire,
}

impl DigitalSensor {
    pub const COUNT: usize = 5;

    pub const fn name(self) -> &'static str {
        match self {
            DigitalSensor::IntakeBeamBreak => "intake_beam_break",
            DigitalSensor::VisionTargetValid => "vision_target_valid",
            DigitalSensor::DriverIntake => "driver_intake",
            DigitalSensor::DriverShift => "driver_shift",
            DigitalSensor::DriverFire => "driver_fire",
        }
    }
}

impl fmt::Display for DigitalSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to the robot's sensors
pub trait SensorSource {
    /// Read a scalar sensor
    ///
    /// Vision readings without a valid target return [`SensorError::NoTarget`].
    fn analog(&self, sensor: AnalogSensor) -> Result<f64, SensorError>;

    /// Read an on/off sensor
    fn digital(&self, sensor: DigitalSensor) -> Result<bool, SensorError>;
}

impl<T: SensorSource + ?Sized> SensorSource for &T {
    fn analog(&self, sensor: AnalogSensor) -> Result<f64, SensorError> {
        (**self).analog(sensor)
    }

    fn digital(&self, sensor: DigitalSensor) -> Result<bool, SensorError> {
        (**self).digital(sensor)
    }
}

/// Settable sensor values for tests
///
/// Every sensor starts at zero/false except the vision angle, which starts
/// with no target.
#[derive(Debug, Clone)]
pub struct MockSensors {
    analog: [Option<f64>; AnalogSensor::COUNT],
    digital: [Option<bool>; DigitalSensor::COUNT],
}

impl MockSensors {
    pub fn new() -> Self {
        let mut analog = [Some(0.0); AnalogSensor::COUNT];
        analog[AnalogSensor::VisionAngle as usize] = None;
        Self {
            analog,
            digital: [Some(false); DigitalSensor::COUNT],
        }
    }

    pub fn set_analog(&mut self, sensor: AnalogSensor, value: f64) {
        self.analog[sensor as usize] = Some(value);
    }

    pub fn set_digital(&mut self, sensor: DigitalSensor, value: bool) {
        self.digital[sensor as usize] = Some(value);
    }

    /// Make a scalar sensor fail (or lose its vision target)
    pub fn clear_analog(&mut self, sensor: AnalogSensor) {
        self.analog[sensor as usize] = None;
    }

    pub fn clear_digital(&mut self, sensor: DigitalSensor) {
        self.digital[sensor as usize] = None;
    }
}

impl Default for MockSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for MockSensors {
    fn analog(&self, sensor: AnalogSensor) -> Result<f64, SensorError> {
        match self.analog[sensor as usize] {
            Some(value) => Ok(value),
            None if sensor == AnalogSensor::VisionAngle => Err(SensorError::NoTarget),
            None => Err(SensorError::AnalogUnavailable(sensor)),
        }
    }

    fn digital(&self, sensor: DigitalSensor) -> Result<bool, SensorError> {
        self.digital[sensor as usize].ok_or(SensorError::DigitalUnavailable(sensor))
    }
}
