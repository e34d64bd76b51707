//! # Shopfloor Core
//!
//! Production scheduling and station-dependency engine for tracking
//! manufacturing orders as construction line-items flow through a sequence
//! of workstations.
//!
//! ## Overview
//!
//! For every unit of work at every station the engine decides whether it is
//! `queued` (ready to start), `pending` (blocked by an upstream station
//! dependency), `in_progress`, `blocked` (operator-reported stoppage), or
//! `done`; aggregates item-level states into batch-run states; and computes
//! calendar-aware working minutes for scheduling and reporting.
//!
//! ## Module Organization
//!
//! - [`models`] - Stations, production items, batch runs, working calendars
//! - [`state_machine`] - Per-item transitions with guards and actions
//! - [`orchestration`] - Eligibility resolution, run aggregation, the
//!   scheduling reconciler, and the [`orchestration::ProductionEngine`] facade
//! - [`calendar`] - Working-minutes arithmetic
//! - [`events`] - Broadcast publisher and domain event names
//! - [`store`] - Persistence/provider seams plus an in-memory implementation
//! - [`config`] / [`error`] / [`logging`] - Engine configuration, typed
//!   errors, structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shopfloor_core::config::EngineConfig;
//! use shopfloor_core::orchestration::ProductionEngine;
//! use shopfloor_core::store::InMemoryStore;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let engine = ProductionEngine::new(
//!     store.clone(),
//!     store.clone(),
//!     store.clone(),
//!     store,
//!     EngineConfig::default(),
//!     "tenant-1",
//! );
//! let _ = engine;
//! ```
//!
//! The pure computations (eligibility, run aggregation, working minutes) are
//! synchronous and perform no I/O; durable writes go through the [`store`]
//! seams supplied by the embedding application.

pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod state_machine;
pub mod store;

pub use config::EngineConfig;
pub use error::{Result, ShopfloorError};
pub use orchestration::{ProductionEngine, ReleaseRequest};
pub use state_machine::{Actor, ItemEvent, ItemStatus, TransitionOutcome};
