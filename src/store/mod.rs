//! Persistence and provider seams.
//!
//! The scheduling core never talks to a database directly: the surrounding
//! application supplies transactionally consistent implementations of these
//! traits. [`memory::InMemoryStore`] implements all of them for tests and
//! lightweight embedding.

pub mod memory;

use crate::error::Result;
use crate::models::{
    BatchRun, LogicalItemKey, ProductionItem, RunKey, Station, StationId, WorkingCalendar,
};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryStore;

/// Persistence interface for production items.
///
/// `save_item` must be atomic per item: the write commits only when the
/// stored version equals `expected_version`, and bumps it by one. A mismatch
/// is a `ConcurrentModification` error; the caller re-reads and retries.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_item(&self, id: Uuid) -> Result<Option<ProductionItem>>;

    /// All items sharing one logical key, one per station it visits.
    async fn list_items_by_logical_key(&self, key: &LogicalItemKey)
        -> Result<Vec<ProductionItem>>;

    /// All items of one (order, batch, station) run.
    async fn list_items_by_run(&self, key: &RunKey) -> Result<Vec<ProductionItem>>;

    /// All items of an order across all batches and stations.
    async fn list_items_by_order(&self, order_id: &str) -> Result<Vec<ProductionItem>>;

    async fn insert_item(&self, item: &ProductionItem) -> Result<()>;

    /// Committed write with optimistic version check; returns the stored row.
    async fn save_item(&self, item: &ProductionItem, expected_version: u64)
        -> Result<ProductionItem>;

    /// Queue removal: delete every item of a run. Callers enforce the
    /// no-started-work precondition before invoking this.
    async fn remove_items_by_run(&self, key: &RunKey) -> Result<usize>;
}

/// Persistence interface for batch-run aggregates.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn get_run(&self, key: &RunKey) -> Result<Option<BatchRun>>;
    async fn save_run(&self, run: &BatchRun) -> Result<()>;
    async fn remove_run(&self, key: &RunKey) -> Result<()>;
}

/// Per-tenant working calendar provider.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn working_calendar(&self, tenant_id: &str) -> Result<WorkingCalendar>;
}

/// Station dependency configuration provider.
#[async_trait]
pub trait DependencyProvider: Send + Sync {
    /// Upstream stations that must be done before `station_id` may proceed.
    async fn dependencies_of(&self, station_id: StationId) -> Result<Vec<StationId>>;

    async fn station(&self, station_id: StationId) -> Result<Option<Station>>;
}
