//! Shapes handed to the UI collaborator.

use serde::{Deserialize, Serialize};

use super::assignment::SlotKey;
use super::conflict::{ConflictHit, ConflictLevel};
use super::ids::{AssignmentId, SessionId, TimeSlotId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub session_id: SessionId,
    pub from: SlotKey,
    pub to: SlotKey,
    /// Operator confirmed a too-small or occupied destination.
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Applied,
    NeedsConfirmation,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResponse {
    pub status: MoveStatus,
    pub too_small: bool,
    pub occupied: bool,
    /// Sessions whose conflict state was recomputed.
    pub recomputed: Vec<SessionId>,
    pub revision: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictStateResponse {
    pub session_id: SessionId,
    pub conflicted: bool,
    pub level: ConflictLevel,
    pub ours: ConflictLevel,
    pub theirs: ConflictLevel,
    pub person_conflicted: bool,
    pub hits: Vec<ConflictHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictSnapshotResponse {
    pub revision: u64,
    pub sessions: Vec<ConflictStateResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionResponse {
    pub session_id: SessionId,
    pub extended: bool,
    pub timeslots: Vec<TimeSlotId>,
    pub revision: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinRequest {
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinResponse {
    pub assignment_id: AssignmentId,
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnscheduleResponse {
    pub unscheduled: Vec<SessionId>,
    pub revision: u64,
}
