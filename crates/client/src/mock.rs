use async_trait::async_trait;
use mockall::mock;
use agenda_core::models::{
    backend::{
        AssignmentRecord, ConstraintRecord, CreateAssignmentRequest, GroupRecord, PersonRecord,
        SessionRecord, TimeSlotRecord,
    },
    ids::{GroupRef, PersonRef, RemoteAssignmentId, SessionId},
};

use crate::source::AgendaSource;

// Mock backend for testing
mock! {
    pub Source {}

    #[async_trait]
    impl AgendaSource for Source {
        async fn fetch_timeslots(&self) -> eyre::Result<Vec<TimeSlotRecord>>;

        async fn fetch_sessions(&self) -> eyre::Result<Vec<SessionRecord>>;

        async fn fetch_assignments(&self) -> eyre::Result<Vec<AssignmentRecord>>;

        async fn fetch_constraints(&self, session: SessionId) -> eyre::Result<Vec<ConstraintRecord>>;

        async fn fetch_group(&self, href: GroupRef) -> eyre::Result<GroupRecord>;

        async fn fetch_person(&self, href: PersonRef) -> eyre::Result<PersonRecord>;

        async fn create_assignment(
            &self,
            request: CreateAssignmentRequest,
        ) -> eyre::Result<AssignmentRecord>;

        async fn delete_assignment(&self, id: RemoteAssignmentId) -> eyre::Result<()>;

        async fn set_pinned(&self, id: RemoteAssignmentId, pinned: bool) -> eyre::Result<()>;
    }
}
