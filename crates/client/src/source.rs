use async_trait::async_trait;
use eyre::Result;
use agenda_core::models::{
    backend::{
        AssignmentRecord, ConstraintRecord, CreateAssignmentRequest, GroupRecord, PersonRecord,
        SessionRecord, TimeSlotRecord,
    },
    ids::{GroupRef, PersonRef, RemoteAssignmentId, SessionId},
};

/// Everything the engine needs from the backend.
///
/// Implementations do plain I/O; memoisation, timeouts and stale-response
/// handling belong to the engine's loader.
#[async_trait]
pub trait AgendaSource: Send + Sync {
    async fn fetch_timeslots(&self) -> Result<Vec<TimeSlotRecord>>;

    async fn fetch_sessions(&self) -> Result<Vec<SessionRecord>>;

    async fn fetch_assignments(&self) -> Result<Vec<AssignmentRecord>>;

    async fn fetch_constraints(&self, session: SessionId) -> Result<Vec<ConstraintRecord>>;

    async fn fetch_group(&self, href: GroupRef) -> Result<GroupRecord>;

    async fn fetch_person(&self, href: PersonRef) -> Result<PersonRecord>;

    /// Creates a row and returns its canonical form, server id included.
    async fn create_assignment(&self, request: CreateAssignmentRequest) -> Result<AssignmentRecord>;

    async fn delete_assignment(&self, id: RemoteAssignmentId) -> Result<()>;

    async fn set_pinned(&self, id: RemoteAssignmentId, pinned: bool) -> Result<()>;
}
