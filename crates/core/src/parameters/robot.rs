//! Aggregate robot configuration
//!
//! `RobotConfig` is built once from a `ParameterStore` and then shared
//! immutably with every task through the tick context.

use super::drive::DriveParams;
use super::error::ParameterError;
use super::scheduling::SchedulerParams;
use super::storage::ParameterStore;
use super::vision::VisionParams;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotConfig {
    pub drive: DriveParams,
    pub vision: VisionParams,
    pub scheduler: SchedulerParams,
}

impl RobotConfig {
    /// Register every parameter group with its default value
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        DriveParams::register_defaults(store)?;
        VisionParams::register_defaults(store)?;
        SchedulerParams::register_defaults(store)?;
        Ok(())
    }

    /// A store pre-populated with every default
    pub fn default_store() -> Result<ParameterStore, ParameterError> {
        let mut store = ParameterStore::new();
        Self::register_defaults(&mut store)?;
        Ok(store)
    }

    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            drive: DriveParams::from_store(store),
            vision: VisionParams::from_store(store),
            scheduler: SchedulerParams::from_store(store),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.drive.is_valid() && self.vision.is_valid() && self.scheduler.is_valid()
    }
}
