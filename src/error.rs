//! Error types for loading and running the robot

use std::path::PathBuf;

use thiserror::Error;
use tickbot_core::parameters::ParameterError;

/// Errors from reading and applying the robot file
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("parameter {name} rejected: {source}")]
    Parameter {
        name: String,
        #[source]
        source: ParameterError,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from the robot layer
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("unknown autonomous routine `{0}`")]
    UnknownRoutine(String),

    #[error("routine construction failed: {0}")]
    Routine(#[from] tickbot_core::ConfigError),

    #[error(transparent)]
    Config(#[from] ConfigLoadError),
}
