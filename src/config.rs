//! Robot file loading
//!
//! The robot file is YAML:
//!
//! ```yaml
//! log_filter: "info,tickbot_core=debug"
//! auto_routine: center_and_shoot
//! parameters:
//!   DRV_KP: 1.2
//!   VIS_TOL_DEG: 2
//! ```
//!
//! Every key is optional. Parameter overrides are applied on top of the
//! registered defaults; names that are not registered and read-only
//! parameters are rejected. The resulting [`RobotConfig`] is immutable.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tickbot_core::parameters::{ParamValue, ParameterStore};
use tickbot_core::RobotConfig;

use crate::error::ConfigLoadError;

/// Parameter override as written in YAML
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamOverride {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ParamOverride {
    fn to_value(self, name: &str) -> Result<ParamValue, ConfigLoadError> {
        match self {
            ParamOverride::Bool(v) => Ok(ParamValue::Bool(v)),
            ParamOverride::Int(v) => i32::try_from(v).map(ParamValue::Int).map_err(|_| {
                ConfigLoadError::Invalid(format!("{name}: integer {v} out of range"))
            }),
            ParamOverride::Float(v) if v.is_finite() => Ok(ParamValue::Float(v)),
            ParamOverride::Float(v) => Err(ConfigLoadError::Invalid(format!(
                "{name}: value {v} is not finite"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotFile {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Routine started when autonomous is entered
    pub auto_routine: String,
    pub parameters: BTreeMap<String, ParamOverride>,
}

impl Default for RobotFile {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            auto_routine: "do_nothing".to_string(),
            parameters: BTreeMap::new(),
        }
    }
}

impl RobotFile {
    /// Read and validate a robot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            routine = %file.auto_routine,
            overrides = file.parameters.len(),
            "loaded robot file"
        );
        Ok(file)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigLoadError> {
        let file: Self = serde_yaml::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigLoadError::Invalid("log_filter must not be empty".into()));
        }
        if self.auto_routine.trim().is_empty() {
            return Err(ConfigLoadError::Invalid("auto_routine must not be empty".into()));
        }
        Ok(())
    }

    /// Apply the overrides to a store that already holds the defaults
    pub fn apply(&self, store: &mut ParameterStore) -> Result<(), ConfigLoadError> {
        for (name, value) in &self.parameters {
            let value = value.to_value(name)?;
            store
                .set(name, value)
                .map_err(|source| ConfigLoadError::Parameter {
                    name: name.clone(),
                    source,
                })?;
            tracing::debug!(parameter = %name, ?value, "parameter override");
        }
        Ok(())
    }

    /// Defaults plus overrides, frozen into the tick configuration
    pub fn robot_config(&self) -> Result<RobotConfig, ConfigLoadError> {
        let mut store = RobotConfig::default_store().map_err(|source| {
            ConfigLoadError::Parameter {
                name: "<defaults>".to_string(),
                source,
            }
        })?;
        self.apply(&mut store)?;

        let config = RobotConfig::from_store(&store);
        if !config.is_valid() {
            return Err(ConfigLoadError::Invalid(
                "parameters produce an invalid configuration".into(),
            ));
        }
        Ok(config)
    }
}
