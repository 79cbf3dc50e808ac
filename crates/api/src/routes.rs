pub mod assignments;
pub mod conflicts;
pub mod health;
pub mod moves;
pub mod schedule;
