use crate::state_machine::errors::{GuardError, StateMachineError};
use thiserror::Error;
use uuid::Uuid;

/// Crate-level error taxonomy surfaced to embedding applications.
///
/// Guard violations and missing records come back as typed variants so the
/// calling UI/API layer decides presentation; they never escape a transition
/// boundary as panics.
#[derive(Debug, Error)]
pub enum ShopfloorError {
    /// Referenced item, run, or station does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A transition guard was violated; no state change occurred.
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// Optimistic version mismatch on write; caller should re-read and retry.
    #[error("concurrent modification of item {item_id}")]
    ConcurrentModification { item_id: Uuid },

    /// Malformed working-calendar configuration (unparseable shift times).
    #[error("invalid working calendar: {reason}")]
    CalendarConfigInvalid { reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Catch-all for store implementations to map backend failures into.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopfloorError {
    pub fn item_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "production item",
            id: id.to_string(),
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    /// True when the caller may retry the operation after a fresh read.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

impl From<StateMachineError> for ShopfloorError {
    fn from(err: StateMachineError) -> Self {
        match err {
            StateMachineError::InvalidTransition { from, event } => Self::PreconditionFailed {
                reason: format!("invalid transition from {from} on {event}"),
            },
            StateMachineError::Guard(GuardError::DependenciesNotMet { reason }) => {
                Self::PreconditionFailed { reason }
            }
            StateMachineError::Guard(GuardError::Store(inner)) => *inner,
            StateMachineError::Store(inner) => *inner,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopfloorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::errors::dependencies_not_met;

    #[test]
    fn only_version_conflicts_are_retryable() {
        let conflict = ShopfloorError::ConcurrentModification {
            item_id: Uuid::new_v4(),
        };
        assert!(conflict.is_retryable());

        assert!(!ShopfloorError::precondition("guard failed").is_retryable());
        assert!(!ShopfloorError::item_not_found(Uuid::new_v4()).is_retryable());
        assert!(!ShopfloorError::Internal("store unavailable".to_string()).is_retryable());
    }

    #[test]
    fn guard_failures_flatten_to_precondition() {
        let err: ShopfloorError =
            StateMachineError::Guard(dependencies_not_met("waiting on station 2")).into();
        assert!(matches!(err, ShopfloorError::PreconditionFailed { .. }));

        let err: ShopfloorError = StateMachineError::InvalidTransition {
            from: "done".to_string(),
            event: "start".to_string(),
        }
        .into();
        assert!(matches!(err, ShopfloorError::PreconditionFailed { .. }));
    }

    #[test]
    fn store_errors_pass_through_unchanged() {
        let id = Uuid::new_v4();
        let inner = ShopfloorError::item_not_found(id);
        let err: ShopfloorError = StateMachineError::from(inner).into();
        assert!(matches!(err, ShopfloorError::NotFound { .. }));
    }
}
