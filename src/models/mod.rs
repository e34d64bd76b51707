//! Data layer: stations, production items, batch-run aggregates, and the
//! per-tenant working calendar.

pub mod batch_run;
pub mod calendar;
pub mod production_item;
pub mod station;

pub use batch_run::{BatchRun, RunKey};
pub use calendar::{ShiftWindow, WorkingCalendar};
pub use production_item::{LogicalItemKey, ProductionItem};
pub use station::{Station, StationDependency, StationId};
