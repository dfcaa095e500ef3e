use tickbot::RobotError;

/// Errors that can occur during simulator operations.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("routine `{routine}` still running after {steps} steps")]
    RunTimeout { routine: String, steps: u64 },

    #[error(transparent)]
    Robot(#[from] RobotError),
}
