//! Scheduler timing parameters
//!
//! - `SCHED_RATE_HZ` - Tick rate of the control loop (read-only)
//! - `SCHED_BUDGET_US` - Tick duration above which an overrun is counted

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

const DEFAULT_RATE_HZ: i32 = 50;
const DEFAULT_BUDGET_US: i32 = 15_000;

const MIN_RATE_HZ: u32 = 1;
const MAX_RATE_HZ: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerParams {
    pub rate_hz: u32,
    pub budget_us: u32,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            rate_hz: DEFAULT_RATE_HZ as u32,
            budget_us: DEFAULT_BUDGET_US as u32,
        }
    }
}

impl SchedulerParams {
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(
            "SCHED_RATE_HZ",
            ParamValue::Int(DEFAULT_RATE_HZ),
            ParamFlags::READ_ONLY,
        )?;
        store.register(
            "SCHED_BUDGET_US",
            ParamValue::Int(DEFAULT_BUDGET_US),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        let rate_hz = match store.get("SCHED_RATE_HZ") {
            Some(ParamValue::Int(v)) => (*v).max(0) as u32,
            _ => DEFAULT_RATE_HZ as u32,
        };
        let budget_us = match store.get("SCHED_BUDGET_US") {
            Some(ParamValue::Int(v)) => (*v).max(0) as u32,
            _ => DEFAULT_BUDGET_US as u32,
        };

        Self {
            rate_hz: rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ),
            budget_us,
        }
    }

    /// Nominal tick period in microseconds
    pub fn period_us(&self) -> u64 {
        1_000_000 / u64::from(self.rate_hz.max(MIN_RATE_HZ))
    }

    pub fn is_valid(&self) -> bool {
        (MIN_RATE_HZ..=MAX_RATE_HZ).contains(&self.rate_hz) && self.budget_us > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period() {
        let params = SchedulerParams::default();
        assert_eq!(params.period_us(), 20_000);
        assert!(params.is_valid());
    }

    #[test]
    fn test_rate_is_read_only() {
        let mut store = ParameterStore::new();
        SchedulerParams::register_defaults(&mut store).unwrap();
        assert_eq!(
            store.set("SCHED_RATE_HZ", ParamValue::Int(100)),
            Err(ParameterError::ReadOnly)
        );
        store.set("SCHED_BUDGET_US", ParamValue::Int(5_000)).unwrap();
        assert_eq!(SchedulerParams::from_store(&store).budget_us, 5_000);
    }
}
