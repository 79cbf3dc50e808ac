//! # Agenda Engine
//!
//! The conflict-aware scheduling engine. It keeps the in-memory model of a
//! meeting's sessions, timeslots, groups, people and constraints, and after
//! every change to which session sits in which slot it recomputes which
//! sessions now conflict and how badly.
//!
//! ## Architecture
//!
//! - **Store**: arena of entities keyed by id, with lazy group/person entries
//! - **Table**: the session/timeslot assignment relation and extension links
//! - **Evaluator**: group-constraint and person-availability conflict passes
//! - **Propagation**: picks the sessions a change can affect and re-evaluates them
//! - **Orchestrator**: validates, applies and propagates moves and extensions
//! - **Loader**: async bulk load, memoised lazy fetches and backend sync
//!
//! All mutation is synchronous. Async work only fetches data, then applies it
//! in one step under the [`SharedAgenda`] write lock.

pub mod agenda;
pub mod evaluator;
pub mod fetch;
pub mod loader;
pub mod orchestrator;
pub mod propagation;
pub mod store;
pub mod table;

pub use agenda::{Agenda, SharedAgenda};
pub use fetch::{FetchFailure, FetchOnce};
pub use loader::{LoadSummary, ScheduleLoader};
pub use orchestrator::{MoveCheck, MoveOptions, MoveOutcome, MoveReport};
pub use propagation::ConflictsChanged;
