pub mod assignments;
pub mod conflicts;
pub mod moves;
pub mod schedule;
