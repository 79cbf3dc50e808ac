use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TimeSlotId;

/// A (date, start time) column of the schedule grid.
///
/// Two sessions in the same time column but different rooms are running
/// concurrently, which is what conflict detection cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeColumn {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TimeColumn {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

impl fmt::Display for TimeColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.date.format("%Y-%m-%d"), self.time.format("%H%M"))
    }
}

/// The (room, date, time) key of a slot, used as the conflict comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnClass {
    pub room: String,
    pub column: TimeColumn,
}

impl ColumnClass {
    pub fn new(room: impl Into<String>, column: TimeColumn) -> Self {
        Self {
            room: room.into(),
            column,
        }
    }

    pub fn same_time(&self, other: &ColumnClass) -> bool {
        self.column == other.column
    }

    /// Same time in a different room. Same time in the same room is a
    /// co-location, not a conflict.
    pub fn clashes_with(&self, other: &ColumnClass) -> bool {
        self.same_time(other) && self.room != other.room
    }
}

impl fmt::Display for ColumnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.room, self.column)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub room: String,
    /// Seats in the room, `None` when unknown (treated as unlimited).
    pub capacity: Option<u32>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub domid: String,
    /// True iff no assignment references this slot.
    pub empty: bool,
    /// Next slot in the same room on the same date.
    pub following: Option<TimeSlotId>,
    pub unscheduled_box: bool,
}

impl TimeSlot {
    pub fn column(&self) -> TimeColumn {
        TimeColumn::new(self.date, self.time)
    }

    pub fn column_class(&self) -> ColumnClass {
        ColumnClass::new(self.room.clone(), self.column())
    }

    /// Whether `attendees` people fit in the room.
    pub fn fits(&self, attendees: Option<u32>) -> bool {
        match (self.capacity, attendees) {
            (Some(capacity), Some(attendees)) => attendees <= capacity,
            _ => true,
        }
    }
}
