use super::actions::{ActionContext, LogBlockedItemAction, PublishTransitionEventAction, StateAction};
use super::errors::{StateMachineError, StateMachineResult};
use super::events::{Actor, ItemEvent};
use super::guards::{DependenciesMetGuard, GuardContext, StateGuard};
use super::states::ItemStatus;
use crate::calendar::working_minutes_with_policy;
use crate::error::ShopfloorError;
use crate::events::publisher::EventPublisher;
use crate::models::{ProductionItem, WorkingCalendar};
use crate::store::{CalendarProvider, DependencyProvider, ItemStore};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a transition attempt.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The transition was committed.
    Applied {
        item: ProductionItem,
        from: ItemStatus,
        to: ItemStatus,
    },
    /// The item was already in the event's target state; the retry was
    /// absorbed without a write.
    NoOp { current: ItemStatus },
}

impl TransitionOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// The committed item, when a write happened.
    pub fn item(&self) -> Option<&ProductionItem> {
        match self {
            Self::Applied { item, .. } => Some(item),
            Self::NoOp { .. } => None,
        }
    }
}

/// Per-item state machine: the authoritative unit for
/// `(order, batch, construction-row, station)` status transitions.
///
/// A transition is a single read-modify-write against one item, serialized by
/// the store's optimistic version check. Side effects (timestamps, duration,
/// blocked fields) are applied before the write; event publication happens
/// after commit and is best-effort.
#[derive(Clone)]
pub struct ItemStateMachine {
    items: Arc<dyn ItemStore>,
    dependencies: Arc<dyn DependencyProvider>,
    calendars: Arc<dyn CalendarProvider>,
    event_publisher: EventPublisher,
    /// Calendar policy for duration stamping, shared with the live-display
    /// query so both compute the same figure.
    whole_day_when_no_shifts: bool,
    tenant_id: String,
}

impl ItemStateMachine {
    pub fn new(
        items: Arc<dyn ItemStore>,
        dependencies: Arc<dyn DependencyProvider>,
        calendars: Arc<dyn CalendarProvider>,
        event_publisher: EventPublisher,
        whole_day_when_no_shifts: bool,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            items,
            dependencies,
            calendars,
            event_publisher,
            whole_day_when_no_shifts,
            tenant_id: tenant_id.into(),
        }
    }

    /// Attempt to transition the item identified by `item_id`.
    pub async fn transition(
        &self,
        item_id: Uuid,
        event: ItemEvent,
        actor: &Actor,
    ) -> StateMachineResult<TransitionOutcome> {
        let item = self
            .items
            .get_item(item_id)
            .await?
            .ok_or_else(|| StateMachineError::from(ShopfloorError::item_not_found(item_id)))?;
        self.transition_item(item, event, actor).await
    }

    /// Attempt to transition an already-loaded item.
    pub async fn transition_item(
        &self,
        mut item: ProductionItem,
        event: ItemEvent,
        actor: &Actor,
    ) -> StateMachineResult<TransitionOutcome> {
        let from = item.status;

        // Retry idempotence: the same action applied twice is harmless.
        if from == event.target_status() {
            tracing::debug!(
                item_id = %item.id,
                status = %from,
                event = event.event_type(),
                "Item already in target state, absorbing retry"
            );
            return Ok(TransitionOutcome::NoOp { current: from });
        }

        let to = self.determine_target_state(from, &event)?;

        if event.is_operator_action() {
            self.check_guards(&item, from, to, &event).await?;
        }

        let expected_version = item.version;
        self.apply_side_effects(&mut item, from, to, &event, actor)
            .await;
        item.status = to;

        let saved = self.items.save_item(&item, expected_version).await?;

        tracing::info!(
            item_id = %saved.id,
            station = %saved.station_id,
            from = %from,
            to = %to,
            event = event.event_type(),
            actor = %actor.id,
            "Item transitioned"
        );

        self.execute_actions(&saved, from, to, &event, actor).await;

        Ok(TransitionOutcome::Applied {
            item: saved,
            from,
            to,
        })
    }

    /// Determine the target state based on current state and event.
    pub fn determine_target_state(
        &self,
        current: ItemStatus,
        event: &ItemEvent,
    ) -> StateMachineResult<ItemStatus> {
        use ItemStatus::*;

        let target = match (current, event) {
            // Operator starts work; resume doubles as start from blocked
            (Pending | Queued, ItemEvent::Start) => InProgress,
            (Blocked, ItemEvent::Start | ItemEvent::Resume) => InProgress,

            // Finish requires work to be underway
            (InProgress, ItemEvent::MarkDone) => Done,

            // Operators may report an obstruction before or during work
            (InProgress | Pending | Queued, ItemEvent::MarkBlocked { .. }) => Blocked,

            // Reconciler-owned eligibility flips
            (Pending, ItemEvent::SetQueued) => Queued,
            (Queued, ItemEvent::SetPending) => Pending,

            (from, event) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }

    /// Check guard conditions for the transition.
    async fn check_guards(
        &self,
        item: &ProductionItem,
        current: ItemStatus,
        target: ItemStatus,
        event: &ItemEvent,
    ) -> StateMachineResult<()> {
        let ctx = GuardContext {
            items: self.items.as_ref(),
            dependencies: self.dependencies.as_ref(),
        };

        match (current, target, event) {
            // Starting fresh work requires every upstream dependency done.
            (
                ItemStatus::Pending | ItemStatus::Queued,
                ItemStatus::InProgress,
                ItemEvent::Start,
            ) => {
                let guard = DependenciesMetGuard;
                guard.check(item, &ctx).await?;
            }
            // Leaving blocked skips the re-check only when work actually
            // started; an item blocked straight from pending/queued still
            // owes the dependency check.
            (ItemStatus::Blocked, ItemStatus::InProgress, _) if item.started_at.is_none() => {
                let guard = DependenciesMetGuard;
                guard.check(item, &ctx).await?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Apply field-level side effects for the transition.
    async fn apply_side_effects(
        &self,
        item: &mut ProductionItem,
        from: ItemStatus,
        to: ItemStatus,
        event: &ItemEvent,
        actor: &Actor,
    ) {
        let now = Utc::now();

        match to {
            ItemStatus::InProgress => {
                if item.started_at.is_none() {
                    item.started_at = Some(now);
                }
                if from == ItemStatus::Blocked {
                    item.clear_blocked_fields();
                }
            }
            ItemStatus::Done => {
                item.done_at = Some(now);
                let calendar = self.resolve_calendar().await;
                item.duration_minutes = Some(match item.started_at {
                    Some(started) => working_minutes_with_policy(
                        started,
                        item.done_at,
                        &calendar,
                        self.whole_day_when_no_shifts,
                    ),
                    None => 0,
                });
            }
            ItemStatus::Blocked => {
                if let ItemEvent::MarkBlocked { reason, reason_id } = event {
                    item.blocked_reason = Some(reason.clone());
                    item.blocked_reason_id = *reason_id;
                }
                item.blocked_at = Some(now);
                item.blocked_by = Some(actor.id.clone());
            }
            ItemStatus::Pending | ItemStatus::Queued => {}
        }
    }

    /// Resolve the tenant calendar; configuration trouble degrades to the
    /// whole-day fallback with a warning rather than failing the transition.
    async fn resolve_calendar(&self) -> WorkingCalendar {
        match self.calendars.working_calendar(&self.tenant_id).await {
            Ok(calendar) => calendar,
            Err(e) => {
                tracing::warn!(
                    tenant = %self.tenant_id,
                    error = %e,
                    "Working calendar unavailable, falling back to whole-day policy"
                );
                WorkingCalendar::new(1..=7, vec![])
            }
        }
    }

    /// Execute actions after a committed transition. Notification is
    /// best-effort relative to the state machine: actions never fail it.
    async fn execute_actions(
        &self,
        item: &ProductionItem,
        from: ItemStatus,
        to: ItemStatus,
        event: &ItemEvent,
        actor: &Actor,
    ) {
        let station_name = match self.dependencies.station(item.station_id).await {
            Ok(Some(station)) => station.name,
            _ => item.station_id.to_string(),
        };

        let ctx = ActionContext {
            from,
            to,
            event,
            actor,
            station_name: &station_name,
        };

        let actions: Vec<Box<dyn StateAction>> = vec![
            Box::new(PublishTransitionEventAction::new(
                self.event_publisher.clone(),
            )),
            Box::new(LogBlockedItemAction),
        ];

        for action in actions {
            tracing::trace!(
                item_id = %item.id,
                action = action.description(),
                "Running post-transition action"
            );
            action.execute(item, &ctx).await;
        }
    }
}
