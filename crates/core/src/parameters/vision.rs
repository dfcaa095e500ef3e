//! Vision Centering Parameter Definitions
//!
//! - `VIS_KP`, `VIS_KI`, `VIS_KD` - Gains used by direct angle centering
//! - `VIS_TOL_DEG` - Angle tolerance for continuous centering

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::control::PidGains;

const DEFAULT_KP: f64 = 0.02;
const DEFAULT_KI: f64 = 0.0;
const DEFAULT_KD: f64 = 0.002;
const DEFAULT_TOL_DEG: f64 = 1.0;

const MAX_TOL_DEG: f64 = 15.0;

/// Vision centering tuning loaded from the parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct VisionParams {
    pub gains: PidGains,
    /// Acceptable residual target angle in degrees
    pub tolerance_deg: f64,
}

impl Default for VisionParams {
    fn default() -> Self {
        Self {
            gains: PidGains::new(
                DEFAULT_KP,
                DEFAULT_KI,
                DEFAULT_KD,
            ),
            tolerance_deg: DEFAULT_TOL_DEG,
        }
    }
}

impl VisionParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("VIS_KP", ParamValue::Float(DEFAULT_KP), ParamFlags::empty())?;
        store.register("VIS_KI", ParamValue::Float(DEFAULT_KI), ParamFlags::empty())?;
        store.register("VIS_KD", ParamValue::Float(DEFAULT_KD), ParamFlags::empty())?;
        store.register(
            "VIS_TOL_DEG",
            ParamValue::Float(DEFAULT_TOL_DEG),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        let defaults = Self::default();
        let get = |name: &str, fallback: f64| store.get_f64(name).unwrap_or(fallback);

        Self {
            gains: PidGains::new(
                get("VIS_KP", defaults.gains.kp),
                get("VIS_KI", defaults.gains.ki),
                get("VIS_KD", defaults.gains.kd),
            ),
            tolerance_deg: get("VIS_TOL_DEG", defaults.tolerance_deg).clamp(0.0, MAX_TOL_DEG),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.gains.is_finite() && (0.0..=MAX_TOL_DEG).contains(&self.tolerance_deg)
    }
}
