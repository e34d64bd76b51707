//! Domain events consumed by the surrounding system to drive user-facing
//! notifications (push/toast) and activity logs.

pub mod publisher;

pub use publisher::{EventPublisher, PublishedEvent};

/// Emitted for every accepted transition, with the full transition payload.
pub const ITEM_TRANSITIONED: &str = "item.transitioned";
/// Emitted when an operator reports a stoppage.
pub const ITEM_BLOCKED: &str = "item.blocked";
/// Emitted when a blocked item returns to work.
pub const ITEM_RESUMED: &str = "item.resumed";
/// Emitted when an item finishes at a station.
pub const ITEM_DONE: &str = "item.done";
/// Emitted when a batch-run's derived status reaches done.
pub const RUN_COMPLETED: &str = "run.completed";
/// Emitted when every item of an order, across all stations, is done.
pub const ORDER_COMPLETED: &str = "order.completed";
