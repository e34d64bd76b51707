use crate::error::ShopfloorError;
use thiserror::Error;

/// Errors raised while evaluating transition guards.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("dependencies not met: {reason}")]
    DependenciesNotMet { reason: String },

    #[error(transparent)]
    Store(#[from] Box<ShopfloorError>),
}

pub type GuardResult<T> = Result<T, GuardError>;

/// Helper for building the common guard failure.
pub fn dependencies_not_met(reason: impl Into<String>) -> GuardError {
    GuardError::DependenciesNotMet {
        reason: reason.into(),
    }
}

/// Errors raised by the item state machine itself.
#[derive(Debug, Error)]
pub enum StateMachineError {
    #[error("invalid transition from {from} on event {event}")]
    InvalidTransition { from: String, event: String },

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Store(#[from] Box<ShopfloorError>),
}

impl From<ShopfloorError> for StateMachineError {
    fn from(err: ShopfloorError) -> Self {
        Self::Store(Box::new(err))
    }
}

impl From<ShopfloorError> for GuardError {
    fn from(err: ShopfloorError) -> Self {
        Self::Store(Box::new(err))
    }
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
