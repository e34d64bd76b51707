use crate::error::{Result, ShopfloorError};

/// Engine configuration with environment overrides.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bounded retry count for reconciler writes that hit a version conflict.
    pub reconcile_retry_limit: u32,
    /// Capacity of the broadcast channel used by the event publisher.
    pub event_channel_capacity: usize,
    /// When a workday has no configured shifts, count the whole day (00:00-24:00)
    /// as working time. Disable once the business confirms the empty-shift case
    /// should contribute zero instead.
    pub whole_day_when_no_shifts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconcile_retry_limit: 3,
            event_channel_capacity: 1000,
            whole_day_when_no_shifts: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("SHOPFLOOR_RECONCILE_RETRY_LIMIT") {
            config.reconcile_retry_limit = limit.parse().map_err(|e| {
                ShopfloorError::Configuration(format!("Invalid reconcile_retry_limit: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("SHOPFLOOR_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.parse().map_err(|e| {
                ShopfloorError::Configuration(format!("Invalid event_channel_capacity: {e}"))
            })?;
        }

        if let Ok(flag) = std::env::var("SHOPFLOOR_WHOLE_DAY_WHEN_NO_SHIFTS") {
            config.whole_day_when_no_shifts = flag.parse().map_err(|e| {
                ShopfloorError::Configuration(format!("Invalid whole_day_when_no_shifts: {e}"))
            })?;
        }

        Ok(config)
    }
}
