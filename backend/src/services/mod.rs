//! Business logic services

pub mod batch;
pub mod harvest;
pub mod reporting;
pub mod target;

pub use batch::BatchService;
pub use harvest::HarvestService;
pub use reporting::ReportingService;
pub use target::TargetService;

use config::ConfigError;
use shared::LocalClock;

use crate::config::InventoryConfig;

/// Lifecycle settings every stock service evaluates against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockPolicy {
    pub validity_days: i32,
    pub near_expiry_days: i64,
    pub clock: LocalClock,
}

impl TryFrom<&InventoryConfig> for StockPolicy {
    type Error = ConfigError;

    fn try_from(config: &InventoryConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            validity_days: config.validity_days,
            near_expiry_days: config.near_expiry_days,
            clock: config.clock()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_default_inventory() {
        let policy = StockPolicy::try_from(&InventoryConfig::default()).unwrap();
        assert_eq!(policy.validity_days, 7);
        assert_eq!(policy.near_expiry_days, 2);
        assert_eq!(policy.clock.offset_hours(), -3);
    }

    #[test]
    fn test_policy_refuses_offset_it_cannot_honour() {
        let inventory = InventoryConfig {
            utc_offset_hours: 30,
            ..InventoryConfig::default()
        };
        assert!(StockPolicy::try_from(&inventory).is_err());
    }
}
