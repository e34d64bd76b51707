//! # Production Engine
//!
//! Facade over the item state machine, run aggregator, and scheduling
//! reconciler. Every operator operation is a single-item transition followed
//! by the reactive sweep: dependency eligibility for sibling items is
//! re-evaluated, stale run aggregates are refreshed, and terminal events
//! (run completed, order completed) are published.

use super::reconciler::{ReconcileReport, Reconciler};
use super::run_aggregator::{run_status, RunAggregator};
use crate::calendar::working_minutes_with_policy;
use crate::config::EngineConfig;
use crate::error::{Result, ShopfloorError};
use crate::events::publisher::EventPublisher;
use crate::events::{ORDER_COMPLETED, RUN_COMPLETED};
use crate::models::{LogicalItemKey, ProductionItem, RunKey, StationId};
use crate::state_machine::{
    Actor, ItemEvent, ItemStateMachine, ItemStatus, TransitionOutcome,
};
use crate::store::{CalendarProvider, DependencyProvider, ItemStore, RunStore};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Release request: one construction row entering production, creating its
/// per-station items with eligibility already resolved.
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    pub key: LogicalItemKey,
    pub item_name: String,
    pub qty: u32,
    pub material: Option<String>,
    /// Stations this row must visit, in configuration order.
    pub stations: Vec<StationId>,
}

/// The production scheduling and station-dependency engine.
#[derive(Clone)]
pub struct ProductionEngine {
    items: Arc<dyn ItemStore>,
    runs: Arc<dyn RunStore>,
    calendars: Arc<dyn CalendarProvider>,
    event_publisher: EventPublisher,
    machine: ItemStateMachine,
    aggregator: RunAggregator,
    reconciler: Reconciler,
    config: EngineConfig,
    tenant_id: String,
}

impl ProductionEngine {
    pub fn new(
        items: Arc<dyn ItemStore>,
        runs: Arc<dyn RunStore>,
        calendars: Arc<dyn CalendarProvider>,
        dependencies: Arc<dyn DependencyProvider>,
        config: EngineConfig,
        tenant_id: impl Into<String>,
    ) -> Self {
        let tenant_id = tenant_id.into();
        let event_publisher = EventPublisher::new(config.event_channel_capacity);
        let machine = ItemStateMachine::new(
            items.clone(),
            dependencies.clone(),
            calendars.clone(),
            event_publisher.clone(),
            config.whole_day_when_no_shifts,
            tenant_id.clone(),
        );
        let aggregator = RunAggregator::new(items.clone(), runs.clone());
        let reconciler = Reconciler::new(
            items.clone(),
            dependencies,
            machine.clone(),
            config.reconcile_retry_limit,
        );

        Self {
            items,
            runs,
            calendars,
            event_publisher,
            machine,
            aggregator,
            reconciler,
            config,
            tenant_id,
        }
    }

    /// Subscribe to the engine's domain events.
    pub fn event_publisher(&self) -> &EventPublisher {
        &self.event_publisher
    }

    // ---- Operator transitions -------------------------------------------

    /// Begin work on an item. Rejected while upstream dependencies are unmet.
    #[instrument(skip(self, actor), fields(item_id = %item_id, actor = %actor.id))]
    pub async fn start(&self, item_id: Uuid, actor: &Actor) -> Result<TransitionOutcome> {
        self.apply(item_id, ItemEvent::Start, actor).await
    }

    /// Finish work on an item; stamps `done_at` and the working-minutes
    /// duration. Rejected unless the item is in progress.
    #[instrument(skip(self, actor), fields(item_id = %item_id, actor = %actor.id))]
    pub async fn mark_done(&self, item_id: Uuid, actor: &Actor) -> Result<TransitionOutcome> {
        self.apply(item_id, ItemEvent::MarkDone, actor).await
    }

    /// Report an obstruction. Allowed before or during work; progress is
    /// paused, never reset.
    #[instrument(skip(self, actor, reason), fields(item_id = %item_id, actor = %actor.id))]
    pub async fn mark_blocked(
        &self,
        item_id: Uuid,
        reason: impl Into<String>,
        reason_id: Option<i64>,
        actor: &Actor,
    ) -> Result<TransitionOutcome> {
        self.apply(item_id, ItemEvent::blocked_with_reason(reason, reason_id), actor)
            .await
    }

    /// Clear a reported obstruction and continue working.
    #[instrument(skip(self, actor), fields(item_id = %item_id, actor = %actor.id))]
    pub async fn resume(&self, item_id: Uuid, actor: &Actor) -> Result<TransitionOutcome> {
        self.apply(item_id, ItemEvent::Resume, actor).await
    }

    async fn apply(
        &self,
        item_id: Uuid,
        event: ItemEvent,
        actor: &Actor,
    ) -> Result<TransitionOutcome> {
        let outcome = self.machine.transition(item_id, event, actor).await?;

        if let TransitionOutcome::Applied { item, to, .. } = &outcome {
            self.after_transition(item, *to).await?;
        }

        Ok(outcome)
    }

    /// Reactive sweep after a committed transition: reconcile sibling
    /// eligibility, refresh stale run aggregates, emit terminal events.
    async fn after_transition(&self, item: &ProductionItem, to: ItemStatus) -> Result<()> {
        let report = self.reconciler.reconcile(&item.logical_key()).await?;

        let trigger_run = RunKey::new(
            item.order_id.clone(),
            item.batch_code.clone(),
            item.station_id,
        );
        let mut stale_runs = vec![trigger_run];
        for key in report.affected_runs() {
            if !stale_runs.contains(&key) {
                stale_runs.push(key);
            }
        }

        for key in &stale_runs {
            let refresh = self.aggregator.refresh(key).await?;
            if refresh.changed && refresh.run.status == ItemStatus::Done {
                self.publish_run_completed(&refresh.run.key(), refresh.run.duration_minutes);
            }
        }

        if to == ItemStatus::Done {
            if let Some(total) = self.aggregator.order_total_duration(&item.order_id).await? {
                self.publish_order_completed(&item.order_id, total);
            }
        }

        Ok(())
    }

    fn publish_run_completed(&self, key: &RunKey, duration_minutes: Option<i64>) {
        let context = serde_json::json!({
            "order_id": key.order_id,
            "batch_code": key.batch_code,
            "station_id": key.station_id,
            "duration_minutes": duration_minutes,
        });
        self.event_publisher.publish(RUN_COMPLETED, context);
    }

    fn publish_order_completed(&self, order_id: &str, total_duration_minutes: i64) {
        let context = serde_json::json!({
            "order_id": order_id,
            "total_duration_minutes": total_duration_minutes,
        });
        self.event_publisher.publish(ORDER_COMPLETED, context);
    }

    // ---- Release and queue removal --------------------------------------

    /// Release one construction row to production: create its item at every
    /// station on the route and resolve initial eligibility.
    #[instrument(skip(self, request), fields(logical_key = %request.key))]
    pub async fn release_row(&self, request: ReleaseRequest) -> Result<Vec<ProductionItem>> {
        if request.stations.is_empty() {
            return Err(ShopfloorError::precondition(
                "release requires at least one station",
            ));
        }

        for station_id in &request.stations {
            let item = ProductionItem::new(
                request.key.clone(),
                *station_id,
                request.item_name.clone(),
                request.qty,
                request.material.clone(),
            );
            self.items.insert_item(&item).await?;
        }

        // Newly created items are pending; the sweep queues every station
        // whose dependencies are already met (none, typically).
        let report = self.reconciler.reconcile(&request.key).await?;
        for key in report.affected_runs() {
            self.aggregator.refresh(&key).await?;
        }

        self.items.list_items_by_logical_key(&request.key).await
    }

    /// Remove a batch from a station queue. Only permitted while no item in
    /// the run has started: any `started_at`, in-progress, or done item
    /// rejects the removal.
    #[instrument(skip(self), fields(run = %key))]
    pub async fn remove_from_queue(&self, key: &RunKey) -> Result<usize> {
        let items = self.items.list_items_by_run(key).await?;
        let started = items.iter().any(|item| {
            item.started_at.is_some()
                || matches!(item.status, ItemStatus::InProgress | ItemStatus::Done)
        });
        if started {
            return Err(ShopfloorError::precondition(format!(
                "run {key} has started work and cannot be removed from the queue"
            )));
        }

        let logical_keys: Vec<LogicalItemKey> =
            items.iter().map(|item| item.logical_key()).collect();

        let removed = self.items.remove_items_by_run(key).await?;
        self.runs.remove_run(key).await?;

        // Dependents of the removed items lose a sibling; their eligibility
        // regresses to pending on the next sweep.
        for logical_key in logical_keys {
            let report = self.reconciler.reconcile(&logical_key).await?;
            for run_key in report.affected_runs() {
                self.aggregator.refresh(&run_key).await?;
            }
        }

        Ok(removed)
    }

    // ---- Read-only queries ----------------------------------------------

    /// Derived status of one batch-at-station run.
    pub async fn get_run_status(&self, key: &RunKey) -> Result<ItemStatus> {
        let items = self.items.list_items_by_run(key).await?;
        Ok(run_status(&items))
    }

    /// Live working-minutes display for an item: the stored duration once
    /// done, otherwise calendar-aware elapsed minutes since `started_at`.
    pub async fn get_working_minutes_elapsed(&self, item_id: Uuid) -> Result<i64> {
        let item = self
            .items
            .get_item(item_id)
            .await?
            .ok_or_else(|| ShopfloorError::item_not_found(item_id))?;

        if let Some(duration) = item.duration_minutes {
            return Ok(duration);
        }
        let Some(started) = item.started_at else {
            return Ok(0);
        };

        let calendar = self.calendars.working_calendar(&self.tenant_id).await?;
        Ok(working_minutes_with_policy(
            started,
            item.done_at,
            &calendar,
            self.config.whole_day_when_no_shifts,
        ))
    }

    /// Re-run the eligibility sweep for one logical item. Exposed for
    /// embedding systems that mutate items outside an operator action.
    pub async fn reconcile(&self, key: &LogicalItemKey) -> Result<ReconcileReport> {
        self.reconciler.reconcile(key).await
    }
}
