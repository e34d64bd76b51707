// State machine module for production item transitions
//
// Per-item transition pipeline: determine target state, check guards, apply
// side effects, persist with an optimistic version check, then run
// best-effort actions (event publication, logging).

pub mod actions;
pub mod errors;
pub mod events;
pub mod guards;
pub mod item_state_machine;
pub mod states;

// Re-export main types for convenient access
pub use errors::{GuardError, StateMachineError, StateMachineResult};
pub use events::{Actor, ItemEvent};
pub use item_state_machine::{ItemStateMachine, TransitionOutcome};
pub use states::ItemStatus;

// Common traits
pub use actions::StateAction;
pub use guards::StateGuard;
