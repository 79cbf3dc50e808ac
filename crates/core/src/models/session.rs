use serde::{Deserialize, Serialize};

use super::conflict::ConflictState;
use super::constraint::SessionConstraints;
use super::ids::{GroupRef, SessionId};
use super::time_slot::{ColumnClass, TimeColumn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub group: GroupRef,
    /// Requested duration in minutes.
    pub requested_duration: Option<u32>,
    pub attendees: Option<u32>,
    pub special_request: bool,
    pub bof: bool,
    pub double_wide: bool,
    /// Column classes of the slot(s) currently holding this session, empty
    /// while it sits in the unassigned bucket.
    pub column_classes: Vec<ColumnClass>,
    /// `None` until the session's constraints have been loaded.
    pub constraints: Option<SessionConstraints>,
    pub conflict: ConflictState,
}

impl Session {
    pub fn is_scheduled(&self) -> bool {
        !self.column_classes.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &TimeColumn> {
        self.column_classes.iter().map(|cc| &cc.column)
    }

    pub fn shares_column_with(&self, columns: &[ColumnClass]) -> bool {
        self.column_classes
            .iter()
            .any(|ours| columns.iter().any(|theirs| ours.same_time(theirs)))
    }
}
