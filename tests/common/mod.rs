//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use shopfloor_core::config::EngineConfig;
use shopfloor_core::models::{
    LogicalItemKey, ProductionItem, Station, StationDependency, StationId, WorkingCalendar,
};
use shopfloor_core::orchestration::{ProductionEngine, ReleaseRequest};
use std::sync::Arc;

pub const TENANT: &str = "tenant-1";

pub const CUTTING: StationId = StationId(1);
pub const WELDING: StationId = StationId(2);
pub const ASSEMBLY: StationId = StationId(3);

/// Three stations where assembly depends on both cutting and welding, with a
/// round-the-clock calendar so durations accrue in tests regardless of when
/// they run.
pub fn engine_fixture() -> (Arc<shopfloor_core::store::InMemoryStore>, ProductionEngine) {
    engine_fixture_with(EngineConfig::default())
}

/// Same fixture with custom engine configuration.
pub fn engine_fixture_with(
    config: EngineConfig,
) -> (Arc<shopfloor_core::store::InMemoryStore>, ProductionEngine) {
    let store = Arc::new(shopfloor_core::store::InMemoryStore::new());

    store.add_station(Station {
        id: CUTTING,
        name: "Cutting".to_string(),
        sort_order: 1,
    });
    store.add_station(Station {
        id: WELDING,
        name: "Welding".to_string(),
        sort_order: 2,
    });
    store.add_station(Station {
        id: ASSEMBLY,
        name: "Assembly".to_string(),
        sort_order: 3,
    });
    store.add_dependency(StationDependency {
        id: 1,
        station_id: ASSEMBLY,
        depends_on_station_id: CUTTING,
    });
    store.add_dependency(StationDependency {
        id: 2,
        station_id: ASSEMBLY,
        depends_on_station_id: WELDING,
    });

    store.set_calendar(TENANT, WorkingCalendar::new(1..=7, vec![]));

    let engine = ProductionEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        config,
        TENANT,
    );

    (store, engine)
}

/// Release one row across the full three-station route.
pub async fn release_default_row(
    engine: &ProductionEngine,
    order_id: &str,
    row_key: &str,
) -> Vec<ProductionItem> {
    engine
        .release_row(ReleaseRequest {
            key: LogicalItemKey::new(order_id, "B1", row_key),
            item_name: format!("frame {row_key}"),
            qty: 1,
            material: Some("steel".to_string()),
            stations: vec![CUTTING, WELDING, ASSEMBLY],
        })
        .await
        .expect("release should succeed")
}

/// The released item at one station.
pub fn item_at(items: &[ProductionItem], station: StationId) -> ProductionItem {
    items
        .iter()
        .find(|item| item.station_id == station)
        .cloned()
        .expect("item should exist at station")
}
