use super::{CalendarProvider, DependencyProvider, ItemStore, RunStore};
use crate::error::{Result, ShopfloorError};
use crate::models::{
    BatchRun, LogicalItemKey, ProductionItem, RunKey, Station, StationDependency, StationId,
    WorkingCalendar,
};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory implementation of every store/provider seam.
///
/// Item writes are serialized per item through the shard lock of the item
/// map, which makes the version compare-and-bump atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: DashMap<Uuid, ProductionItem>,
    runs: DashMap<RunKey, BatchRun>,
    stations: DashMap<StationId, Station>,
    dependencies: RwLock<HashMap<StationId, Vec<StationId>>>,
    calendars: RwLock<HashMap<String, WorkingCalendar>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_station(&self, station: Station) {
        self.stations.insert(station.id, station);
    }

    pub fn add_dependency(&self, dependency: StationDependency) {
        self.dependencies
            .write()
            .entry(dependency.station_id)
            .or_default()
            .push(dependency.depends_on_station_id);
    }

    pub fn set_calendar(&self, tenant_id: impl Into<String>, calendar: WorkingCalendar) {
        self.calendars.write().insert(tenant_id.into(), calendar);
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<ProductionItem>> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_items_by_logical_key(
        &self,
        key: &LogicalItemKey,
    ) -> Result<Vec<ProductionItem>> {
        let mut items: Vec<ProductionItem> = self
            .items
            .iter()
            .filter(|entry| {
                entry.order_id == key.order_id
                    && entry.batch_code == key.batch_code
                    && entry.row_key == key.row_key
            })
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|item| item.station_id);
        Ok(items)
    }

    async fn list_items_by_run(&self, key: &RunKey) -> Result<Vec<ProductionItem>> {
        let mut items: Vec<ProductionItem> = self
            .items
            .iter()
            .filter(|entry| {
                entry.order_id == key.order_id
                    && entry.batch_code == key.batch_code
                    && entry.station_id == key.station_id
            })
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    async fn list_items_by_order(&self, order_id: &str) -> Result<Vec<ProductionItem>> {
        Ok(self
            .items
            .iter()
            .filter(|entry| entry.order_id == order_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn insert_item(&self, item: &ProductionItem) -> Result<()> {
        self.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn save_item(
        &self,
        item: &ProductionItem,
        expected_version: u64,
    ) -> Result<ProductionItem> {
        let mut entry = self
            .items
            .get_mut(&item.id)
            .ok_or_else(|| ShopfloorError::item_not_found(item.id))?;

        if entry.version != expected_version {
            return Err(ShopfloorError::ConcurrentModification { item_id: item.id });
        }

        let mut updated = item.clone();
        updated.version = expected_version + 1;
        *entry = updated.clone();
        Ok(updated)
    }

    async fn remove_items_by_run(&self, key: &RunKey) -> Result<usize> {
        let ids: Vec<Uuid> = self
            .items
            .iter()
            .filter(|entry| {
                entry.order_id == key.order_id
                    && entry.batch_code == key.batch_code
                    && entry.station_id == key.station_id
            })
            .map(|entry| entry.id)
            .collect();
        for id in &ids {
            self.items.remove(id);
        }
        Ok(ids.len())
    }
}

#[async_trait]
impl RunStore for InMemoryStore {
    async fn get_run(&self, key: &RunKey) -> Result<Option<BatchRun>> {
        Ok(self.runs.get(key).map(|entry| entry.value().clone()))
    }

    async fn save_run(&self, run: &BatchRun) -> Result<()> {
        self.runs.insert(run.key(), run.clone());
        Ok(())
    }

    async fn remove_run(&self, key: &RunKey) -> Result<()> {
        self.runs.remove(key);
        Ok(())
    }
}

#[async_trait]
impl CalendarProvider for InMemoryStore {
    async fn working_calendar(&self, tenant_id: &str) -> Result<WorkingCalendar> {
        self.calendars
            .read()
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| ShopfloorError::NotFound {
                entity: "working calendar",
                id: tenant_id.to_string(),
            })
    }
}

#[async_trait]
impl DependencyProvider for InMemoryStore {
    async fn dependencies_of(&self, station_id: StationId) -> Result<Vec<StationId>> {
        Ok(self
            .dependencies
            .read()
            .get(&station_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn station(&self, station_id: StationId) -> Result<Option<Station>> {
        Ok(self.stations.get(&station_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ProductionItem {
        ProductionItem::new(
            LogicalItemKey::new("MO-1", "B1", "row-1"),
            StationId(1),
            "frame",
            2,
            None,
        )
    }

    #[tokio::test]
    async fn save_item_enforces_version() {
        let store = InMemoryStore::new();
        let item = sample_item();
        store.insert_item(&item).await.unwrap();

        let saved = store.save_item(&item, 0).await.unwrap();
        assert_eq!(saved.version, 1);

        // Stale write loses.
        let stale = store.save_item(&item, 0).await;
        assert!(matches!(
            stale,
            Err(ShopfloorError::ConcurrentModification { .. })
        ));
    }

    #[tokio::test]
    async fn logical_key_lookup_spans_stations() {
        let store = InMemoryStore::new();
        let key = LogicalItemKey::new("MO-1", "B1", "row-1");
        for station in [1, 2, 3] {
            let item =
                ProductionItem::new(key.clone(), StationId(station), "frame", 1, None);
            store.insert_item(&item).await.unwrap();
        }
        let other = ProductionItem::new(
            LogicalItemKey::new("MO-1", "B1", "row-2"),
            StationId(1),
            "panel",
            1,
            None,
        );
        store.insert_item(&other).await.unwrap();

        let siblings = store.list_items_by_logical_key(&key).await.unwrap();
        assert_eq!(siblings.len(), 3);
    }
}
