use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use shopfloor_core::calendar::working_minutes;
use shopfloor_core::models::{ProductionItem, ShiftWindow, StationId, WorkingCalendar};
use shopfloor_core::models::LogicalItemKey;
use shopfloor_core::orchestration::{eligibility, run_status};
use shopfloor_core::state_machine::ItemStatus;
use std::collections::HashMap;

fn status_strategy() -> impl Strategy<Value = ItemStatus> {
    prop_oneof![
        Just(ItemStatus::Pending),
        Just(ItemStatus::Queued),
        Just(ItemStatus::InProgress),
        Just(ItemStatus::Blocked),
        Just(ItemStatus::Done),
    ]
}

fn sibling_map_strategy() -> impl Strategy<Value = HashMap<StationId, ItemStatus>> {
    prop::collection::hash_map((1i64..20).prop_map(StationId), status_strategy(), 0..8)
}

fn item_with_status(status: ItemStatus) -> ProductionItem {
    let mut item = ProductionItem::new(
        LogicalItemKey::new("MO-1", "B1", "row-1"),
        StationId(1),
        "frame",
        1,
        None,
    );
    item.status = status;
    item
}

proptest! {
    /// Eligibility is queued iff every dependency station has a done sibling.
    #[test]
    fn eligibility_matches_dependency_definition(
        deps in prop::collection::vec((1i64..20).prop_map(StationId), 0..6),
        siblings in sibling_map_strategy(),
    ) {
        let result = eligibility(&deps, &siblings);
        let expected_met = deps.iter().all(|dep| {
            siblings.get(dep).map(|s| *s == ItemStatus::Done).unwrap_or(false)
        });
        if expected_met {
            prop_assert_eq!(result, ItemStatus::Queued);
        } else {
            prop_assert_eq!(result, ItemStatus::Pending);
        }
    }

    /// An empty dependency list is always eligible.
    #[test]
    fn empty_dependencies_always_queued(siblings in sibling_map_strategy()) {
        prop_assert_eq!(eligibility(&[], &siblings), ItemStatus::Queued);
    }

    /// Working minutes are non-negative and monotone in the end instant.
    #[test]
    fn working_minutes_monotone(
        start_offset_mins in 0i64..(14 * 24 * 60),
        span1_mins in 0i64..(14 * 24 * 60),
        span2_mins in 0i64..(14 * 24 * 60),
    ) {
        let calendar = WorkingCalendar::weekdays_with_shift(
            ShiftWindow::parse("08:00", "17:00").unwrap(),
        );
        let anchor = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let start = anchor + Duration::minutes(start_offset_mins);
        let (near, far) = if span1_mins <= span2_mins {
            (span1_mins, span2_mins)
        } else {
            (span2_mins, span1_mins)
        };
        let m_near = working_minutes(start, Some(start + Duration::minutes(near)), &calendar);
        let m_far = working_minutes(start, Some(start + Duration::minutes(far)), &calendar);

        prop_assert!(m_near >= 0);
        prop_assert!(m_near <= m_far);
        // Working minutes never exceed wall-clock minutes.
        prop_assert!(m_far <= far);
    }

    /// Run status follows the documented priority order.
    #[test]
    fn run_status_respects_priority(statuses in prop::collection::vec(status_strategy(), 0..10)) {
        let items: Vec<ProductionItem> =
            statuses.iter().map(|s| item_with_status(*s)).collect();
        let result = run_status(&items);

        let expected = if items.is_empty() {
            ItemStatus::Queued
        } else if statuses.iter().all(|s| *s == ItemStatus::Done) {
            ItemStatus::Done
        } else if statuses.contains(&ItemStatus::InProgress) {
            ItemStatus::InProgress
        } else if statuses.contains(&ItemStatus::Queued) {
            ItemStatus::Queued
        } else if statuses.contains(&ItemStatus::Pending) {
            ItemStatus::Pending
        } else if statuses.contains(&ItemStatus::Blocked) {
            ItemStatus::Blocked
        } else {
            ItemStatus::Queued
        };

        prop_assert_eq!(result, expected);
    }

    /// Status strings round-trip through Display and FromStr.
    #[test]
    fn status_round_trips(status in status_strategy()) {
        let text = status.to_string();
        prop_assert_eq!(text.parse::<ItemStatus>().unwrap(), status);
    }
}
