//! # Agenda Core
//!
//! Domain model for the conflict-aware meeting agenda: sessions, timeslots,
//! assignments, groups, people and the constraints that tie them together,
//! plus the wire records exchanged with the scheduling backend and the UI.
//!
//! Cross-entity references are plain identifiers. Resolution happens in the
//! engine's entity store, never through embedded object pointers.

pub mod errors;
pub mod models;
