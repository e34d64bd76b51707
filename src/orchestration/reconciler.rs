//! Scheduling reconciler: the reactive sweep that re-evaluates dependency
//! eligibility after any item transition.
//!
//! For every sibling of the changed logical item whose status is still
//! system-assigned (pending/queued), the sweep recomputes eligibility and
//! applies the pending<->queued flip. Applied flips feed back into the next
//! pass, so transitive effects settle to a fixed point; re-running on a
//! consistent set produces no further changes.

use super::eligibility::{eligibility, sibling_status_map};
use crate::error::{Result, ShopfloorError};
use crate::models::{LogicalItemKey, ProductionItem, RunKey};
use crate::state_machine::{Actor, ItemEvent, ItemStateMachine, ItemStatus, TransitionOutcome};
use crate::store::{DependencyProvider, ItemStore};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// One applied eligibility flip.
#[derive(Debug, Clone)]
pub struct AppliedFlip {
    pub item: ProductionItem,
    pub from: ItemStatus,
    pub to: ItemStatus,
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub flips: Vec<AppliedFlip>,
}

impl ReconcileReport {
    /// Runs whose aggregates are stale after the flips.
    pub fn affected_runs(&self) -> Vec<RunKey> {
        let mut keys: Vec<RunKey> = Vec::new();
        for flip in &self.flips {
            let key = RunKey::new(
                flip.item.order_id.clone(),
                flip.item.batch_code.clone(),
                flip.item.station_id,
            );
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Reactive eligibility sweep over the siblings of one logical item.
#[derive(Clone)]
pub struct Reconciler {
    items: Arc<dyn ItemStore>,
    dependencies: Arc<dyn DependencyProvider>,
    machine: ItemStateMachine,
    retry_limit: u32,
}

impl Reconciler {
    pub fn new(
        items: Arc<dyn ItemStore>,
        dependencies: Arc<dyn DependencyProvider>,
        machine: ItemStateMachine,
        retry_limit: u32,
    ) -> Self {
        Self {
            items,
            dependencies,
            machine,
            retry_limit,
        }
    }

    /// Sweep the siblings of `key` until eligibility is consistent.
    #[instrument(skip(self), fields(logical_key = %key))]
    pub async fn reconcile(&self, key: &LogicalItemKey) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut passes = 0usize;

        loop {
            let siblings = self.items.list_items_by_logical_key(key).await?;
            let statuses = sibling_status_map(&siblings);
            let mut changed = false;

            for item in siblings.iter().filter(|i| i.status.is_schedulable()) {
                let dependencies = self.dependencies.dependencies_of(item.station_id).await?;
                let desired = eligibility(&dependencies, &statuses);
                if desired == item.status {
                    continue;
                }

                let event = match desired {
                    ItemStatus::Queued => ItemEvent::SetQueued,
                    _ => ItemEvent::SetPending,
                };

                if let Some(flip) = self.apply_flip(item.id, event).await? {
                    changed = true;
                    report.flips.push(flip);
                }
            }

            if !changed {
                break;
            }

            // Flips never produce a done sibling, so the sweep settles fast;
            // the bound only protects against store-level races.
            passes += 1;
            if passes > siblings.len() + 1 {
                tracing::warn!(logical_key = %key, passes, "Reconcile sweep hit pass bound");
                break;
            }
        }

        tracing::debug!(
            logical_key = %key,
            flips = report.flips.len(),
            "Reconciliation settled"
        );

        Ok(report)
    }

    /// Apply one system flip with bounded retries on version conflicts.
    /// A flip that races an operator action is skipped; the next sweep pass
    /// re-evaluates from committed state.
    async fn apply_flip(&self, item_id: Uuid, event: ItemEvent) -> Result<Option<AppliedFlip>> {
        let mut attempts = 0u32;
        loop {
            match self
                .machine
                .transition(item_id, event.clone(), &Actor::system())
                .await
            {
                Ok(TransitionOutcome::Applied { item, from, to }) => {
                    return Ok(Some(AppliedFlip { item, from, to }))
                }
                Ok(TransitionOutcome::NoOp { .. }) => return Ok(None),
                Err(e) => {
                    let err = ShopfloorError::from(e);
                    if err.is_retryable() && attempts < self.retry_limit {
                        attempts += 1;
                        continue;
                    }
                    match err {
                        // The item left the schedulable states between the
                        // read and the write; nothing to flip anymore.
                        ShopfloorError::PreconditionFailed { .. } => return Ok(None),
                        other => return Err(other),
                    }
                }
            }
        }
    }
}
