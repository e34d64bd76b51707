use crate::models::station::StationId;
use crate::state_machine::states::ItemStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a batch-at-station aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunKey {
    pub order_id: String,
    pub batch_code: String,
    pub station_id: StationId,
}

impl RunKey {
    pub fn new(
        order_id: impl Into<String>,
        batch_code: impl Into<String>,
        station_id: StationId,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            batch_code: batch_code.into(),
            station_id,
        }
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.order_id, self.batch_code, self.station_id
        )
    }
}

/// Convenience aggregate for "this batch at this station". Always
/// recomputable from its constituent production items; the stored row must
/// never diverge from that derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRun {
    pub order_id: String,
    pub batch_code: String,
    pub station_id: StationId,
    pub status: ItemStatus,
    /// Set once, the first time the derived status becomes in_progress.
    pub started_at: Option<DateTime<Utc>>,
    /// Set once, when the derived status becomes done.
    pub done_at: Option<DateTime<Utc>>,
    /// Sum of constituent item durations, set together with `done_at`.
    pub duration_minutes: Option<i64>,
}

impl BatchRun {
    pub fn new(key: RunKey) -> Self {
        Self {
            order_id: key.order_id,
            batch_code: key.batch_code,
            station_id: key.station_id,
            status: ItemStatus::Queued,
            started_at: None,
            done_at: None,
            duration_minutes: None,
        }
    }

    pub fn key(&self) -> RunKey {
        RunKey {
            order_id: self.order_id.clone(),
            batch_code: self.batch_code.clone(),
            station_id: self.station_id,
        }
    }
}
