use crate::models::station::StationId;
use crate::state_machine::states::ItemStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one construction/line-row of an order+batch, stable across
/// stations. This is the unit tracked for dependency purposes: the same
/// logical item exists once per station it must visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalItemKey {
    pub order_id: String,
    pub batch_code: String,
    pub row_key: String,
}

impl LogicalItemKey {
    pub fn new(
        order_id: impl Into<String>,
        batch_code: impl Into<String>,
        row_key: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            batch_code: batch_code.into(),
            row_key: row_key.into(),
        }
    }
}

impl fmt::Display for LogicalItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.order_id, self.batch_code, self.row_key)
    }
}

/// One unit of work at one station: a row per `(LogicalItemKey, station_id)`.
///
/// Invariants:
/// - `duration_minutes` is set only when `status` is done, and equals the
///   working minutes between `started_at` and `done_at`.
/// - `started_at` is set exactly once, on first transition into in_progress,
///   and never cleared. A blocked item retains its prior `started_at`
///   (pause, not reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionItem {
    pub id: Uuid,
    pub order_id: String,
    pub batch_code: String,
    pub row_key: String,
    pub item_name: String,
    pub qty: u32,
    pub material: Option<String>,
    pub station_id: StationId,
    pub status: ItemStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub blocked_reason: Option<String>,
    pub blocked_reason_id: Option<i64>,
    pub blocked_at: Option<DateTime<Utc>>,
    pub blocked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency version, bumped by every committed write.
    pub version: u64,
}

impl ProductionItem {
    /// Create a fresh item at a station, in the default state.
    pub fn new(
        key: LogicalItemKey,
        station_id: StationId,
        item_name: impl Into<String>,
        qty: u32,
        material: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: key.order_id,
            batch_code: key.batch_code,
            row_key: key.row_key,
            item_name: item_name.into(),
            qty,
            material,
            station_id,
            status: ItemStatus::default(),
            started_at: None,
            done_at: None,
            duration_minutes: None,
            blocked_reason: None,
            blocked_reason_id: None,
            blocked_at: None,
            blocked_by: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    pub fn logical_key(&self) -> LogicalItemKey {
        LogicalItemKey {
            order_id: self.order_id.clone(),
            batch_code: self.batch_code.clone(),
            row_key: self.row_key.clone(),
        }
    }

    /// Clear the operator-reported obstruction fields on resume.
    pub fn clear_blocked_fields(&mut self) {
        self.blocked_reason = None;
        self.blocked_reason_id = None;
        self.blocked_at = None;
        self.blocked_by = None;
    }
}
