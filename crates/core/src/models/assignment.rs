use serde::{Deserialize, Serialize};

use super::ids::{AssignmentId, RemoteAssignmentId, SessionId, TimeSlotId};

/// Binds one session to one timeslot.
///
/// Never edited in place: a move deletes the old assignment and creates a
/// new one. Extension links always come in mutual pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    /// Backend row id once the backend has acknowledged this assignment.
    pub remote_id: Option<RemoteAssignmentId>,
    pub session: SessionId,
    pub timeslot: TimeSlotId,
    pub extendedfrom: Option<AssignmentId>,
    pub extendedto: Option<AssignmentId>,
    pub pinned: bool,
}

impl Assignment {
    pub fn new(session: SessionId, timeslot: TimeSlotId) -> Self {
        Self {
            id: AssignmentId::new(),
            remote_id: None,
            session,
            timeslot,
            extendedfrom: None,
            extendedto: None,
            pinned: false,
        }
    }

    pub fn is_extension(&self) -> bool {
        self.extendedfrom.is_some()
    }
}

/// Where a session sits: a concrete slot or the unassigned bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKey {
    Unassigned,
    Slot(TimeSlotId),
}

impl SlotKey {
    pub fn timeslot(self) -> Option<TimeSlotId> {
        match self {
            SlotKey::Slot(id) => Some(id),
            SlotKey::Unassigned => None,
        }
    }
}
