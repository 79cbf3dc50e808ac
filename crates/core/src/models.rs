pub mod assignment;
pub mod backend;
pub mod conflict;
pub mod constraint;
pub mod group;
pub mod ids;
pub mod person;
pub mod responses;
pub mod session;
pub mod time_slot;
