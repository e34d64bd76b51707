use super::events::{Actor, ItemEvent};
use super::states::ItemStatus;
use crate::events::publisher::EventPublisher;
use crate::events::{ITEM_BLOCKED, ITEM_DONE, ITEM_RESUMED, ITEM_TRANSITIONED};
use crate::models::ProductionItem;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

/// Context handed to post-transition actions.
pub struct ActionContext<'a> {
    pub from: ItemStatus,
    pub to: ItemStatus,
    pub event: &'a ItemEvent,
    pub actor: &'a Actor,
    pub station_name: &'a str,
}

/// Trait for implementing state transition actions. Actions run after the
/// transition is committed and never fail it; anything that goes wrong is
/// logged inside the action.
#[async_trait]
pub trait StateAction: Send + Sync {
    /// Execute the action.
    async fn execute(&self, item: &ProductionItem, ctx: &ActionContext<'_>);

    /// Get a description of this action for logging.
    fn description(&self) -> &'static str;
}

/// Action to publish lifecycle events when state transitions occur.
pub struct PublishTransitionEventAction {
    event_publisher: EventPublisher,
}

impl PublishTransitionEventAction {
    pub fn new(event_publisher: EventPublisher) -> Self {
        Self { event_publisher }
    }
}

#[async_trait]
impl StateAction for PublishTransitionEventAction {
    async fn execute(&self, item: &ProductionItem, ctx: &ActionContext<'_>) {
        let context = build_transition_context(item, ctx);
        self.event_publisher.publish(ITEM_TRANSITIONED, context);

        if let Some(event_name) = determine_event_name(ctx.from, ctx.to) {
            let context = build_lifecycle_context(item, ctx);
            self.event_publisher.publish(event_name, context);
        }
    }

    fn description(&self) -> &'static str {
        "Publish lifecycle event for item transition"
    }
}

/// Action to log operator-reported stoppages for the activity trail.
pub struct LogBlockedItemAction;

#[async_trait]
impl StateAction for LogBlockedItemAction {
    async fn execute(&self, item: &ProductionItem, ctx: &ActionContext<'_>) {
        if ctx.to == ItemStatus::Blocked {
            tracing::warn!(
                item_id = %item.id,
                station = ctx.station_name,
                reason = ctx.event.blocked_reason().unwrap_or("unspecified"),
                reported_by = %ctx.actor.name,
                "Production item blocked"
            );
        }
    }

    fn description(&self) -> &'static str {
        "Log operator-reported stoppage"
    }
}

// Helper functions for event payloads

/// Map a (from, to) pair onto the specific lifecycle event it represents.
pub fn determine_event_name(from: ItemStatus, to: ItemStatus) -> Option<&'static str> {
    match (from, to) {
        (ItemStatus::Blocked, ItemStatus::InProgress) => Some(ITEM_RESUMED),
        (_, ItemStatus::Blocked) => Some(ITEM_BLOCKED),
        (_, ItemStatus::Done) => Some(ITEM_DONE),
        _ => None,
    }
}

fn build_transition_context(item: &ProductionItem, ctx: &ActionContext<'_>) -> Value {
    serde_json::json!({
        "item_id": item.id,
        "order_id": item.order_id,
        "batch_code": item.batch_code,
        "row_key": item.row_key,
        "station_id": item.station_id,
        "from_status": ctx.from,
        "to_status": ctx.to,
        "event": ctx.event.event_type(),
        "reason": ctx.event.blocked_reason(),
        "actor_id": ctx.actor.id,
        "transitioned_at": Utc::now(),
    })
}

fn build_lifecycle_context(item: &ProductionItem, ctx: &ActionContext<'_>) -> Value {
    serde_json::json!({
        "item_id": item.id,
        "item_name": item.item_name,
        "station_name": ctx.station_name,
        "reason": ctx.event.blocked_reason(),
        "actor_name": ctx.actor.name,
        "occurred_at": Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_determination() {
        assert_eq!(
            determine_event_name(ItemStatus::InProgress, ItemStatus::Blocked),
            Some(ITEM_BLOCKED)
        );
        assert_eq!(
            determine_event_name(ItemStatus::Queued, ItemStatus::Blocked),
            Some(ITEM_BLOCKED)
        );
        assert_eq!(
            determine_event_name(ItemStatus::Blocked, ItemStatus::InProgress),
            Some(ITEM_RESUMED)
        );
        assert_eq!(
            determine_event_name(ItemStatus::InProgress, ItemStatus::Done),
            Some(ITEM_DONE)
        );
        assert_eq!(
            determine_event_name(ItemStatus::Pending, ItemStatus::Queued),
            None
        );
        assert_eq!(
            determine_event_name(ItemStatus::Queued, ItemStatus::InProgress),
            None
        );
    }
}
