//! Mechanism adapters that feed the frozen operation state into the
//! simulated hardware.

use tickbot_core::operation::{MechanismId, Operation, OperationState};
use tickbot_core::traits::Mechanism;

use crate::sim::{DriveCommand, SimRobot};

fn finite(value: f64, what: &'static str) -> Result<f64, &'static str> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(what)
    }
}

pub struct SimDrivetrainMechanism {
    sim: SimRobot,
}

impl SimDrivetrainMechanism {
    pub fn new(sim: SimRobot) -> Self {
        Self { sim }
    }
}

impl Mechanism for SimDrivetrainMechanism {
    fn id(&self) -> MechanismId {
        MechanismId::Drivetrain
    }

    fn apply(&mut self, state: &OperationState) -> Result<(), &'static str> {
        const OUTPUT: &str = "non-finite drive output";
        const SETPOINT: &str = "non-finite setpoint";
        let command = DriveCommand {
            left_percent: finite(state.analog(Operation::DriveLeftPercent), OUTPUT)?,
            right_percent: finite(state.analog(Operation::DriveRightPercent), OUTPUT)?,
            position_mode: state.digital(Operation::DrivePositionMode),
            left_position: finite(state.analog(Operation::DriveLeftPosition), SETPOINT)?,
            right_position: finite(state.analog(Operation::DriveRightPosition), SETPOINT)?,
            high_gear: state.digital(Operation::DriveHighGear),
        };
        self.sim.world_mut().drivetrain.command(command);
        Ok(())
    }
}

pub struct SimIntakeMechanism {
    sim: SimRobot,
}

impl SimIntakeMechanism {
    pub fn new(sim: SimRobot) -> Self {
        Self { sim }
    }
}

impl Mechanism for SimIntakeMechanism {
    fn id(&self) -> MechanismId {
        MechanismId::Intake
    }

    fn apply(&mut self, state: &OperationState) -> Result<(), &'static str> {
        let roller = finite(state.analog(Operation::IntakeRoller), "non-finite roller output")?;
        self.sim
            .world_mut()
            .intake
            .command_intake(state.digital(Operation::IntakeExtend), roller);
        Ok(())
    }
}

pub struct SimShooterMechanism {
    sim: SimRobot,
}

impl SimShooterMechanism {
    pub fn new(sim: SimRobot) -> Self {
        Self { sim }
    }
}

impl Mechanism for SimShooterMechanism {
    fn id(&self) -> MechanismId {
        MechanismId::Shooter
    }

    fn apply(&mut self, state: &OperationState) -> Result<(), &'static str> {
        let speed = finite(state.analog(Operation::ShooterSpeed), "non-finite shooter speed")?;
        self.sim
            .world_mut()
            .intake
            .command_shooter(speed, state.digital(Operation::ShooterFeed));
        Ok(())
    }
}

pub struct SimVisionMechanism {
    sim: SimRobot,
}

impl SimVisionMechanism {
    pub fn new(sim: SimRobot) -> Self {
        Self { sim }
    }
}

impl Mechanism for SimVisionMechanism {
    fn id(&self) -> MechanismId {
        MechanismId::Vision
    }

    fn apply(&mut self, state: &OperationState) -> Result<(), &'static str> {
        self.sim
            .world_mut()
            .vision
            .set_light(state.digital(Operation::VisionLight));
        Ok(())
    }
}

/// One adapter per simulated mechanism, all bound to `sim`
pub fn all(sim: &SimRobot) -> Vec<Box<dyn Mechanism>> {
    vec![
        Box::new(SimDrivetrainMechanism::new(sim.clone())),
        Box::new(SimIntakeMechanism::new(sim.clone())),
        Box::new(SimShooterMechanism::new(sim.clone())),
        Box::new(SimVisionMechanism::new(sim.clone())),
    ]
}
