//! Simulated robot hardware.
//!
//! [`SimRobot`] is a cheap, cloneable handle to one simulated world. The
//! robot reads it as its [`SensorSource`]; the mechanism adapters in
//! [`crate::mechanisms`] write the frozen operation state into it; the
//! harness advances its physics between ticks.

mod drivetrain;
mod intake;
mod vision;

pub use drivetrain::{DriveCommand, SimDrivetrain};
pub use intake::SimIntake;
pub use vision::SimVision;

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickbot_core::traits::{AnalogSensor, DigitalSensor, SensorSource};
use tickbot_core::SensorError;

/// Configuration for the simulated robot.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Distance between wheels in meters.
    pub track_width_m: f64,
    /// Side speed at full output, low gear (m/s).
    pub low_gear_speed: f64,
    /// Side speed at full output, high gear (m/s).
    pub high_gear_speed: f64,
    /// Encoder noise standard deviation in meters.
    pub encoder_noise_m: f64,
    /// Gyro noise standard deviation in degrees.
    pub gyro_noise_deg: f64,
    /// Vision target bearing from the starting heading (deg).
    pub target_bearing_deg: f64,
    pub target_distance_m: f64,
    /// Camera horizontal field of view (deg).
    pub camera_fov_deg: f64,
    /// Roller time needed to pick up a piece (s).
    pub pickup_secs: f64,
    /// Start with a piece in the robot.
    pub preloaded: bool,
    /// RNG seed for deterministic mode. None = random.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            track_width_m: 0.6,
            low_gear_speed: 2.0,
            high_gear_speed: 4.0,
            encoder_noise_m: 0.0,
            gyro_noise_deg: 0.0,
            target_bearing_deg: 0.0,
            target_distance_m: 3.0,
            camera_fov_deg: 60.0,
            pickup_secs: 0.5,
            preloaded: true,
            seed: Some(0),
        }
    }
}

/// Driver station inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriverInputs {
    pub throttle: f64,
    pub turn: f64,
    pub intake: bool,
    pub shift: bool,
    pub fire: bool,
}

/// Noisy readings sampled once per physics step.
#[derive(Debug, Clone, Copy, Default)]
struct Readings {
    left_distance: f64,
    right_distance: f64,
    heading_deg: f64,
}

/// Complete simulated world state.
#[derive(Debug)]
pub struct SimWorld {
    config: SimConfig,
    pub drivetrain: SimDrivetrain,
    pub intake: SimIntake,
    pub vision: SimVision,
    pub driver: DriverInputs,
    readings: Readings,
    rng: StdRng,
    sim_time_us: u64,
    step_count: u64,
}

impl SimWorld {
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut intake = SimIntake::new(config.pickup_secs);
        if config.preloaded {
            intake.preload();
        }
        Self {
            drivetrain: SimDrivetrain::new(
                config.track_width_m,
                config.low_gear_speed,
                config.high_gear_speed,
            ),
            intake,
            vision: SimVision::new(
                config.target_bearing_deg,
                config.target_distance_m,
                config.camera_fov_deg,
            ),
            driver: DriverInputs::default(),
            readings: Readings::default(),
            rng,
            sim_time_us: 0,
            step_count: 0,
            config,
        }
    }

    /// Advance physics by `dt_us` and resample the sensors.
    pub fn step(&mut self, dt_us: u64) {
        let dt = dt_us as f64 / 1_000_000.0;
        self.drivetrain.integrate(dt);
        self.intake.step(dt);
        self.sim_time_us += dt_us;
        self.step_count += 1;

        let (encoder, gyro) = (self.config.encoder_noise_m, self.config.gyro_noise_deg);
        self.readings = Readings {
            left_distance: self.drivetrain.left_distance() + self.gaussian_noise(encoder),
            right_distance: self.drivetrain.right_distance() + self.gaussian_noise(encoder),
            heading_deg: self.drivetrain.heading_deg() + self.gaussian_noise(gyro),
        };
    }

    /// Generate Gaussian noise using Box-Muller transform.
    fn gaussian_noise(&mut self, stddev: f64) -> f64 {
        if stddev == 0.0 {
            return 0.0;
        }
        let u1: f64 = self.rng.gen::<f64>().max(f64::EPSILON);
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        z * stddev
    }

    pub fn sim_time_us(&self) -> u64 {
        self.sim_time_us
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    fn analog(&self, sensor: AnalogSensor) -> Result<f64, SensorError> {
        let value = match sensor {
            AnalogSensor::LeftDistance => self.readings.left_distance,
            AnalogSensor::RightDistance => self.readings.right_distance,
            AnalogSensor::LeftVelocity => self.drivetrain.left_velocity(),
            AnalogSensor::RightVelocity => self.drivetrain.right_velocity(),
            AnalogSensor::Heading => self.readings.heading_deg,
            AnalogSensor::VisionAngle => self
                .vision
                .observe(self.readings.heading_deg)
                .ok_or(SensorError::NoTarget)?,
            AnalogSensor::VisionDistance => {
                self.vision
                    .observe(self.readings.heading_deg)
                    .ok_or(SensorError::NoTarget)?;
                self.vision.distance_m()
            }
            AnalogSensor::DriverThrottle => self.driver.throttle,
            AnalogSensor::DriverTurn => self.driver.turn,
        };
        Ok(value)
    }

    fn digital(&self, sensor: DigitalSensor) -> bool {
        match sensor {
            DigitalSensor::IntakeBeamBreak => self.intake.loaded(),
            DigitalSensor::VisionTargetValid => {
                self.vision.observe(self.readings.heading_deg).is_some()
            }
            DigitalSensor::DriverIntake => self.driver.intake,
            DigitalSensor::DriverShift => self.driver.shift,
            DigitalSensor::DriverFire => self.driver.fire,
        }
    }
}

/// Shared handle to a simulated world.
#[derive(Debug, Clone)]
pub struct SimRobot {
    world: Rc<RefCell<SimWorld>>,
}

impl SimRobot {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: Rc::new(RefCell::new(SimWorld::new(config))),
        }
    }

    pub fn world(&self) -> Ref<'_, SimWorld> {
        self.world.borrow()
    }

    pub fn world_mut(&self) -> RefMut<'_, SimWorld> {
        self.world.borrow_mut()
    }

    pub fn step(&self, dt_us: u64) {
        self.world.borrow_mut().step(dt_us);
    }

    pub fn set_driver(&self, inputs: DriverInputs) {
        self.world.borrow_mut().driver = inputs;
    }
}

impl SensorSource for SimRobot {
    fn analog(&self, sensor: AnalogSensor) -> Result<f64, SensorError> {
        self.world.borrow().analog(sensor)
    }

    fn digital(&self, sensor: DigitalSensor) -> Result<bool, SensorError> {
        Ok(self.world.borrow().digital(sensor))
    }
}
