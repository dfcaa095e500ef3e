//! Drivetrain Parameter Definitions
//!
//! # Parameters
//!
//! - `DRV_TRACK_M` - Effective track width in meters
//! - `DRV_KP`, `DRV_KI`, `DRV_KD` - Distance PID gains
//! - `DRV_TOL_M` - Distance tolerance for position completion in meters
//! - `DRV_MAX_OUT` - Output clamp for closed-loop drive commands
//! - `DRV_DEADBAND` - Joystick deadband for operator control

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::control::PidGains;

const DEFAULT_TRACK_M: f64 = 0.6;
const DEFAULT_KP: f64 = 1.5;
const DEFAULT_KI: f64 = 0.0;
const DEFAULT_KD: f64 = 0.1;
const DEFAULT_TOL_M: f64 = 0.05;
const DEFAULT_MAX_OUT: f64 = 1.0;
const DEFAULT_DEADBAND: f64 = 0.05;

const MIN_TRACK_M: f64 = 0.1;
const MAX_TRACK_M: f64 = 2.0;

/// Drivetrain tuning loaded from the parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct DriveParams {
    /// Effective track width in meters
    pub track_width_m: f64,
    /// Distance PID gains
    pub gains: PidGains,
    /// Position tolerance in meters
    pub tolerance_m: f64,
    /// Absolute output clamp for closed-loop commands
    pub max_output: f64,
    /// Operator stick deadband
    pub deadband: f64,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            track_width_m: DEFAULT_TRACK_M,
            gains: PidGains::new(
                DEFAULT_KP,
                DEFAULT_KI,
                DEFAULT_KD,
            ),
            tolerance_m: DEFAULT_TOL_M,
            max_output: DEFAULT_MAX_OUT,
            deadband: DEFAULT_DEADBAND,
        }
    }
}

impl DriveParams {
    /// Register drivetrain parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let float = |v: f64| ParamValue::Float(v);
        store.register("DRV_TRACK_M", float(DEFAULT_TRACK_M), ParamFlags::empty())?;
        store.register("DRV_KP", float(DEFAULT_KP), ParamFlags::empty())?;
        store.register("DRV_KI", float(DEFAULT_KI), ParamFlags::empty())?;
        store.register("DRV_KD", float(DEFAULT_KD), ParamFlags::empty())?;
        store.register("DRV_TOL_M", float(DEFAULT_TOL_M), ParamFlags::empty())?;
        store.register("DRV_MAX_OUT", float(DEFAULT_MAX_OUT), ParamFlags::empty())?;
        store.register("DRV_DEADBAND", float(DEFAULT_DEADBAND), ParamFlags::HIDDEN)?;
        Ok(())
    }

    /// Load drivetrain parameters, clamping to usable ranges
    pub fn from_store(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        let get = |name: &str, fallback: f64| store.get_f64(name).unwrap_or(fallback);

        Self {
            track_width_m: get("DRV_TRACK_M", defaults.track_width_m)
                .clamp(MIN_TRACK_M, MAX_TRACK_M),
            gains: PidGains::new(
                get("DRV_KP", defaults.gains.kp),
                get("DRV_KI", defaults.gains.ki),
                get("DRV_KD", defaults.gains.kd),
            ),
            tolerance_m: get("DRV_TOL_M", defaults.tolerance_m).max(0.0),
            max_output: get("DRV_MAX_OUT", defaults.max_output).clamp(0.0, 1.0),
            deadband: get("DRV_DEADBAND", defaults.deadband).clamp(0.0, 0.5),
        }
    }

    pub fn is_valid(&self) -> bool {
        (MIN_TRACK_M..=MAX_TRACK_M).contains(&self.track_width_m)
            && self.gains.is_finite()
            && self.tolerance_m >= 0.0
            && self.max_output > 0.0
            && self.max_output <= 1.0
    }
}
