//! Operation catalog
//!
//! Every controllable channel of the robot is an [`Operation`]. The catalog
//! is fixed at compile time: each operation has a kind (digital on/off or
//! analog scalar) and exactly one owning mechanism. There is no dynamic
//! registration.

mod state;

pub use state::{OperationState, Phase};

use core::fmt;

/// Value type carried by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// On/off channel (solenoid, light, enable flag)
    Digital,
    /// Scalar channel (percent output, setpoint)
    Analog,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Digital => write!(f, "digital"),
            OperationKind::Analog => write!(f, "analog"),
        }
    }
}

/// Mechanism family that consumes an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanismId {
    Drivetrain,
    Intake,
    Shooter,
    Climber,
    Vision,
}

impl MechanismId {
    /// Mechanism name for logging
    pub const fn name(self) -> &'static str {
        match self {
            MechanismId::Drivetrain => "drivetrain",
            MechanismId::Intake => "intake",
            MechanismId::Shooter => "shooter",
            MechanismId::Climber => "climber",
            MechanismId::Vision => "vision",
        }
    }
}

impl fmt::Display for MechanismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, typed control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Operation {
    /// Left drive open-loop output (-1.0 to +1.0)
    DriveLeftPercent,
    /// Right drive open-loop output (-1.0 to +1.0)
    DriveRightPercent,
    /// Closed-loop position mode enable for both drive sides
    DrivePositionMode,
    /// Left position setpoint (meters, absolute encoder frame)
    DriveLeftPosition,
    /// Right position setpoint (meters, absolute encoder frame)
    DriveRightPosition,
    /// Left velocity feed (m/s)
    DriveLeftVelocity,
    /// Right velocity feed (m/s)
    DriveRightVelocity,
    /// Left acceleration feed (m/s^2)
    DriveLeftAcceleration,
    /// Right acceleration feed (m/s^2)
    DriveRightAcceleration,
    /// Gearbox shifter (true = high gear)
    DriveHighGear,
    /// Intake roller output (-1.0 to +1.0)
    IntakeRoller,
    /// Intake deploy piston
    IntakeExtend,
    /// Shooter flywheel output (0.0 to 1.0)
    ShooterSpeed,
    /// Shooter feed gate
    ShooterFeed,
    /// Climber winch output (-1.0 to +1.0)
    ClimberWinch,
    /// Climber release latch
    ClimberRelease,
    /// Vision illumination ring
    VisionLight,
}

impl Operation {
    /// Number of operations in the catalog
    pub const COUNT: usize = 17;

    /// Every operation, in catalog order
    pub const ALL: [Operation; Self::COUNT] = [
        Operation::DriveLeftPercent,
        Operation::DriveRightPercent,
        Operation::DrivePositionMode,
        Operation::DriveLeftPosition,
        Operation::DriveRightPosition,
        Operation::DriveLeftVelocity,
        Operation::DriveRightVelocity,
        Operation::DriveLeftAcceleration,
        Operation::DriveRightAcceleration,
        Operation::DriveHighGear,
        Operation::IntakeRoller,
        Operation::IntakeExtend,
        Operation::ShooterSpeed,
        Operation::ShooterFeed,
        Operation::ClimberWinch,
        Operation::ClimberRelease,
        Operation::VisionLight,
    ];

    /// Dense index into per-operation tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn kind(self) -> OperationKind {
        match self {
            Operation::DrivePositionMode
            | Operation::DriveHighGear
            | Operation::IntakeExtend
            | Operation::ShooterFeed
            | Operation::ClimberRelease
            | Operation::VisionLight => OperationKind::Digital,
            _ => OperationKind::Analog,
        }
    }

    pub const fn mechanism(self) -> MechanismId {
        match self {
            Operation::DriveLeftPercent
            | Operation::DriveRightPercent
            | Operation::DrivePositionMode
            | Operation::DriveLeftPosition
            | Operation::DriveRightPosition
            | Operation::DriveLeftVelocity
            | Operation::DriveRightVelocity
            | Operation::DriveLeftAcceleration
            | Operation::DriveRightAcceleration
            | Operation::DriveHighGear => MechanismId::Drivetrain,
            Operation::IntakeRoller | Operation::IntakeExtend => MechanismId::Intake,
            Operation::ShooterSpeed | Operation::ShooterFeed => MechanismId::Shooter,
            Operation::ClimberWinch | Operation::ClimberRelease => MechanismId::Climber,
            Operation::VisionLight => MechanismId::Vision,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Operation::DriveLeftPercent => "drive_left_percent",
            Operation::DriveRightPercent => "drive_right_percent",
            Operation::DrivePositionMode => "drive_position_mode",
            Operation::DriveLeftPosition => "drive_left_position",
            Operation::DriveRightPosition => "drive_right_position",
            Operation::DriveLeftVelocity => "drive_left_velocity",
            Operation::DriveRightVelocity => "drive_right_velocity",
            Operation::DriveLeftAcceleration => "drive_left_acceleration",
            Operation::DriveRightAcceleration => "drive_right_acceleration",
            Operation::DriveHighGear => "drive_high_gear",
            Operation::IntakeRoller => "intake_roller",
            Operation::IntakeExtend => "intake_extend",
            Operation::ShooterSpeed => "shooter_speed",
            Operation::ShooterFeed => "shooter_feed",
            Operation::ClimberWinch => "climber_winch",
            Operation::ClimberRelease => "climber_release",
            Operation::VisionLight => "vision_light",
        }
    }

    /// Idle/neutral value applied when no task commands this channel
    pub const fn idle(self) -> OperationValue {
        OperationValue::idle(self.kind())
    }

    /// Operations owned by a mechanism, in catalog order
    pub fn owned_by(mechanism: MechanismId) -> impl Iterator<Item = Operation> {
        Self::ALL
            .into_iter()
            .filter(move |op| op.mechanism() == mechanism)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Commanded value of an operation for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationValue {
    Digital(bool),
    Analog(f64),
}

impl OperationValue {
    /// Idle value for a kind: `false` / `0.0`
    pub const fn idle(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Digital => OperationValue::Digital(false),
            OperationKind::Analog => OperationValue::Analog(0.0),
        }
    }

    pub const fn kind(&self) -> OperationKind {
        match self {
            OperationValue::Digital(_) => OperationKind::Digital,
            OperationValue::Analog(_) => OperationKind::Analog,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            OperationValue::Digital(v) => Some(*v),
            OperationValue::Analog(_) => None,
        }
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            OperationValue::Analog(v) => Some(*v),
            OperationValue::Digital(_) => None,
        }
    }

    /// True when the value equals the idle value of its kind
    pub fn is_idle(&self) -> bool {
        *self == Self::idle(self.kind())
    }
}

impl From<bool> for OperationValue {
    fn from(value: bool) -> Self {
        OperationValue::Digital(value)
    }
}

impl From<f64> for OperationValue {
    fn from(value: f64) -> Self {
        OperationValue::Analog(value)
    }
}
