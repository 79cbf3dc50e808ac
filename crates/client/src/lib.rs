//! # Agenda Client
//!
//! The boundary between the scheduling engine and the backend that owns the
//! schedule. [`source::AgendaSource`] is what the engine consumes; the HTTP
//! implementation talks to the backend's JSON endpoints and [`mock`]
//! provides mockall doubles for tests.

pub mod config;
pub mod http;
pub mod source;

pub mod mock;

pub use config::SourceConfig;
pub use http::HttpAgendaSource;
pub use source::AgendaSource;
