//! Batch-run aggregation: derive a run's status and stamps from the set of
//! item states it contains. The stored aggregate must never diverge from the
//! derivation.

use crate::error::Result;
use crate::models::{BatchRun, ProductionItem, RunKey};
use crate::state_machine::states::ItemStatus;
use crate::store::{ItemStore, RunStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// Deterministic priority order, first match wins: the most advanced
/// incomplete state governs display while unstarted or blocked work stays
/// visible.
pub fn run_status(items: &[ProductionItem]) -> ItemStatus {
    if items.is_empty() {
        return ItemStatus::Queued;
    }
    if items.iter().all(|item| item.status == ItemStatus::Done) {
        return ItemStatus::Done;
    }
    if items.iter().any(|item| item.status == ItemStatus::InProgress) {
        return ItemStatus::InProgress;
    }
    if items.iter().any(|item| item.status == ItemStatus::Queued) {
        return ItemStatus::Queued;
    }
    if items.iter().any(|item| item.status == ItemStatus::Pending) {
        return ItemStatus::Pending;
    }
    if items.iter().any(|item| item.status == ItemStatus::Blocked) {
        return ItemStatus::Blocked;
    }
    ItemStatus::Queued
}

/// Result of one aggregate refresh.
#[derive(Debug, Clone)]
pub struct RunRefresh {
    pub run: BatchRun,
    /// Whether the stored aggregate changed in this pass.
    pub changed: bool,
}

/// Recomputes and stores batch-run aggregates after item transitions.
#[derive(Clone)]
pub struct RunAggregator {
    items: Arc<dyn ItemStore>,
    runs: Arc<dyn RunStore>,
}

impl RunAggregator {
    pub fn new(items: Arc<dyn ItemStore>, runs: Arc<dyn RunStore>) -> Self {
        Self { items, runs }
    }

    /// Recompute the aggregate for one run from its current items and store
    /// it when the derived status differs. Run `started_at` is stamped once,
    /// on the first derivation of in_progress; `done_at`/`duration_minutes`
    /// are stamped once when the derivation reaches done (duration = sum of
    /// constituent item durations).
    #[instrument(skip(self), fields(run = %key))]
    pub async fn refresh(&self, key: &RunKey) -> Result<RunRefresh> {
        let items = self.items.list_items_by_run(key).await?;
        let derived = run_status(&items);

        let mut run = match self.runs.get_run(key).await? {
            Some(run) => run,
            None => BatchRun::new(key.clone()),
        };

        if run.status == derived {
            return Ok(RunRefresh {
                run,
                changed: false,
            });
        }

        run.status = derived;
        match derived {
            ItemStatus::InProgress => {
                if run.started_at.is_none() {
                    run.started_at = Some(Utc::now());
                }
            }
            ItemStatus::Done => {
                if run.done_at.is_none() {
                    run.done_at = Some(Utc::now());
                    run.duration_minutes =
                        Some(items.iter().filter_map(|i| i.duration_minutes).sum());
                }
            }
            _ => {}
        }

        self.runs.save_run(&run).await?;

        tracing::debug!(run = %key, status = %derived, "Batch run aggregate refreshed");

        Ok(RunRefresh { run, changed: true })
    }

    /// Total production duration of an order: `Some(sum)` once every item of
    /// the order is done, `None` while work remains. Recorded for reporting,
    /// never used in scheduling decisions.
    pub async fn order_total_duration(&self, order_id: &str) -> Result<Option<i64>> {
        let items = self.items.list_items_by_order(order_id).await?;
        if items.is_empty() || items.iter().any(|item| item.status != ItemStatus::Done) {
            return Ok(None);
        }
        Ok(Some(items.iter().filter_map(|i| i.duration_minutes).sum()))
    }
}
