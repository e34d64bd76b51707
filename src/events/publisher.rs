use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcast publisher for domain lifecycle events.
///
/// Emission is fire-and-forget relative to the state machine: a transition is
/// never rolled back or retried because a subscriber is missing or slow, so
/// publishing is infallible.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// One emitted domain event. `name` is always one of the constants declared
/// in [`crate::events`].
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: &'static str,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to every current subscriber. Returns the number of
    /// subscribers reached; zero subscribers is not an error.
    pub fn publish(&self, event_name: &'static str, context: Value) -> usize {
        let event = PublishedEvent {
            name: event_name,
            context,
            published_at: chrono::Utc::now(),
        };
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ITEM_BLOCKED, ITEM_TRANSITIONED};

    #[test]
    fn publish_without_subscribers_reaches_no_one() {
        let publisher = EventPublisher::default();
        let delivered = publisher.publish(ITEM_TRANSITIONED, serde_json::json!({"ok": true}));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let publisher = EventPublisher::new(16);
        let mut rx = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 1);

        let delivered = publisher.publish(
            ITEM_BLOCKED,
            serde_json::json!({"reason": "missing material"}),
        );
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, ITEM_BLOCKED);
        assert_eq!(event.context["reason"], "missing material");
    }
}
