//! Dependency eligibility resolution.
//!
//! Pure and side-effect free: given a station's upstream dependency list and
//! the statuses of the same logical item at those stations, decide whether
//! the item may run. Only invoked for items currently pending or queued; an
//! item already started is left untouched.

use crate::models::{ProductionItem, StationId};
use crate::state_machine::states::ItemStatus;
use std::collections::HashMap;

/// `Queued` iff every dependency station maps to a done sibling (an empty
/// dependency list is always eligible), `Pending` otherwise. A dependency
/// station with no sibling item yet (not released there) blocks.
pub fn eligibility(
    dependencies: &[StationId],
    sibling_statuses: &HashMap<StationId, ItemStatus>,
) -> ItemStatus {
    let all_met = dependencies.iter().all(|dep| {
        sibling_statuses
            .get(dep)
            .is_some_and(|status| status.satisfies_dependencies())
    });

    if all_met {
        ItemStatus::Queued
    } else {
        ItemStatus::Pending
    }
}

/// Collapse the sibling items of one logical key into a station -> status map.
pub fn sibling_status_map(items: &[ProductionItem]) -> HashMap<StationId, ItemStatus> {
    items
        .iter()
        .map(|item| (item.station_id, item.status))
        .collect()
}
