use super::states::ItemStatus;
use serde::{Deserialize, Serialize};

/// Identity of the person driving an operator action, carried into event
/// payloads and the blocked_by stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Actor used for reconciler-driven transitions.
    pub fn system() -> Self {
        Self {
            id: "system".to_string(),
            name: "scheduler".to_string(),
        }
    }
}

/// Events that can trigger item state transitions.
///
/// `Start`, `MarkDone`, `MarkBlocked`, and `Resume` are operator actions and
/// run the full guard set. `SetQueued`/`SetPending` are reconciler-only
/// eligibility flips, exempt from the operator guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ItemEvent {
    /// Begin work on the item (also resumes from blocked).
    Start,
    /// Finish work at this station.
    MarkDone,
    /// Report an obstruction with a human-readable reason.
    MarkBlocked {
        reason: String,
        reason_id: Option<i64>,
    },
    /// Clear a reported obstruction and continue working.
    Resume,
    /// System flip: dependencies are now met.
    SetQueued,
    /// System flip: a dependency regressed to unmet.
    SetPending,
}

impl ItemEvent {
    /// String form of the event type for logging and transition records.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::MarkDone => "mark_done",
            Self::MarkBlocked { .. } => "mark_blocked",
            Self::Resume => "resume",
            Self::SetQueued => "set_queued",
            Self::SetPending => "set_pending",
        }
    }

    /// Whether this event comes from an operator action (guarded) rather
    /// than the reconciler.
    pub fn is_operator_action(&self) -> bool {
        !matches!(self, Self::SetQueued | Self::SetPending)
    }

    /// The state this event drives toward, used to no-op idempotent retries:
    /// the same action applied twice must be harmless.
    pub fn target_status(&self) -> ItemStatus {
        match self {
            Self::Start | Self::Resume => ItemStatus::InProgress,
            Self::MarkDone => ItemStatus::Done,
            Self::MarkBlocked { .. } => ItemStatus::Blocked,
            Self::SetQueued => ItemStatus::Queued,
            Self::SetPending => ItemStatus::Pending,
        }
    }

    /// Extract the obstruction reason if this is a blocking event.
    pub fn blocked_reason(&self) -> Option<&str> {
        match self {
            Self::MarkBlocked { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl ItemEvent {
    /// Create a blocking event with the given reason.
    pub fn blocked_with_reason(reason: impl Into<String>, reason_id: Option<i64>) -> Self {
        Self::MarkBlocked {
            reason: reason.into(),
            reason_id,
        }
    }
}
