//! Scheduling orchestration: dependency eligibility, batch-run aggregation,
//! the reactive reconciler, and the engine facade tying them together.

pub mod eligibility;
pub mod engine;
pub mod reconciler;
pub mod run_aggregator;

pub use eligibility::{eligibility, sibling_status_map};
pub use engine::{ProductionEngine, ReleaseRequest};
pub use reconciler::{AppliedFlip, ReconcileReport, Reconciler};
pub use run_aggregator::{run_status, RunAggregator, RunRefresh};
