use std::collections::BTreeSet;
use std::sync::Arc;

use agenda_core::{
    errors::{AgendaError, AgendaResult},
    models::{
        assignment::{Assignment, SlotKey},
        backend::{
            AssignmentRecord, ConstraintRecord, GroupRecord, PersonRecord, SessionRecord,
            TimeSlotRecord,
        },
        ids::{AssignmentId, GroupRef, PersonRef, RemoteAssignmentId, SessionId},
        responses::{ConflictSnapshotResponse, ConflictStateResponse},
    },
};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

use crate::{
    evaluator,
    orchestrator::{MoveCheck, MoveOptions, MoveOrchestrator, MoveOutcome, MoveReport},
    propagation::{self, ConflictNotifier, ConflictsChanged},
    store::EntityStore,
    table::{AssignmentTable, Reconcile},
};

/// Handle shared between the loader and the API. Every mutation happens
/// synchronously while holding the write lock.
pub type SharedAgenda = Arc<RwLock<Agenda>>;

/// The engine facade: entity store, assignment table and the redraw
/// channel, behind one owner.
#[derive(Debug, Default)]
pub struct Agenda {
    store: EntityStore,
    table: AssignmentTable,
    notifier: ConflictNotifier,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedAgenda {
        Arc::new(RwLock::new(self))
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }

    pub fn revision(&self) -> u64 {
        self.notifier.revision()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConflictsChanged> {
        self.notifier.subscribe()
    }

    fn orchestrator(&mut self) -> MoveOrchestrator<'_> {
        MoveOrchestrator {
            store: &mut self.store,
            table: &mut self.table,
            notifier: &mut self.notifier,
        }
    }

    pub fn load_timeslots(&mut self, records: Vec<TimeSlotRecord>) {
        let count = records.len();
        for record in records {
            self.store.insert_timeslot(record);
        }
        self.store.link_following_slots();
        info!("Loaded {} timeslots", count);
    }

    pub fn load_sessions(&mut self, records: Vec<SessionRecord>) {
        let count = records.len();
        for record in records {
            self.store.insert_session(record);
        }
        info!("Loaded {} sessions", count);
    }

    /// Loads backend assignment rows, primaries before extensions so the
    /// extension links can resolve. Returns how many rows were new.
    pub fn load_assignments(&mut self, records: Vec<AssignmentRecord>) -> usize {
        let (primaries, extensions): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|record| record.extendedfrom_id.is_none());

        let inserted = primaries
            .iter()
            .chain(extensions.iter())
            .filter_map(|record| self.table.load_remote(&mut self.store, record))
            .count();
        info!("Loaded {} assignments", inserted);
        inserted
    }

    /// Stores a session's constraints and, if it is on the grid,
    /// recomputes it and its time-column neighbours. Returns `false` for a
    /// stale duplicate.
    pub fn apply_constraints(&mut self, session: SessionId, records: Vec<ConstraintRecord>) -> bool {
        if !self.store.set_constraints(session, records) {
            return false;
        }
        let columns = self
            .store
            .session(session)
            .map(|entry| entry.column_classes.clone())
            .unwrap_or_default();
        if !columns.is_empty() {
            let recomputed = propagation::propagate(&mut self.store, session, &columns, &columns);
            self.notifier.notify(&recomputed);
        }
        true
    }

    pub fn apply_group(&mut self, record: GroupRecord) {
        self.store.apply_group_record(record);
    }

    pub fn mark_group_failed(&mut self, href: &GroupRef) {
        self.store.mark_group_failed(href);
    }

    pub fn apply_person(&mut self, record: PersonRecord) {
        self.store.apply_person_record(record);
    }

    pub fn mark_person_failed(&mut self, href: &PersonRef) {
        self.store.mark_person_failed(href);
    }

    pub fn validate_move(&mut self, session: SessionId, to: SlotKey) -> AgendaResult<MoveCheck> {
        self.orchestrator().validate(session, to)
    }

    pub fn move_session(
        &mut self,
        session: SessionId,
        from: SlotKey,
        to: SlotKey,
        options: MoveOptions,
    ) -> AgendaResult<MoveOutcome> {
        self.orchestrator().move_session(session, from, to, options)
    }

    pub fn extend_session(&mut self, session: SessionId) -> AgendaResult<MoveReport> {
        self.orchestrator().extend(session)
    }

    pub fn clear_extension(&mut self, session: SessionId) -> AgendaResult<MoveReport> {
        self.orchestrator().clear_extension(session)
    }

    pub fn can_extend_right(&self, session: SessionId) -> bool {
        self.table.can_extend_right(&self.store, session)
    }

    pub fn unschedule_all(&mut self) -> MoveReport {
        self.orchestrator().unschedule_all()
    }

    pub fn set_pinned(&mut self, assignment: AssignmentId, pinned: bool) -> AgendaResult<Assignment> {
        self.table.set_pinned(assignment, pinned).cloned()
    }

    /// Full recompute of every session. Returns the new revision.
    pub fn recalculate_all(&mut self) -> u64 {
        let recomputed = evaluator::recompute_all(&mut self.store);
        debug!("Recalculated conflicts for {} sessions", recomputed.len());
        self.notifier.notify(&recomputed)
    }

    pub fn confirm_assignment(&mut self, local: AssignmentId, remote: RemoteAssignmentId) -> Reconcile {
        self.table.confirm_remote(local, remote)
    }

    pub fn remote_id(&self, assignment: AssignmentId) -> Option<RemoteAssignmentId> {
        self.table.get(assignment).and_then(|entry| entry.remote_id)
    }

    pub fn conflict_state(&self, session: SessionId) -> AgendaResult<ConflictStateResponse> {
        let entry = self
            .store
            .session(session)
            .ok_or_else(|| AgendaError::NotFound(format!("{session} not found")))?;
        Ok(ConflictStateResponse {
            session_id: entry.id,
            conflicted: entry.conflict.conflicted,
            level: entry.conflict.level(),
            ours: entry.conflict.ours,
            theirs: entry.conflict.theirs,
            person_conflicted: entry.conflict.person_conflicted,
            hits: entry.conflict.hits.clone(),
        })
    }

    pub fn conflict_snapshot(&self) -> ConflictSnapshotResponse {
        ConflictSnapshotResponse {
            revision: self.revision(),
            sessions: self
                .store
                .session_ids()
                .into_iter()
                .filter_map(|session| self.conflict_state(session).ok())
                .collect(),
        }
    }

    /// Sessions whose constraints have not been loaded yet.
    pub fn sessions_missing_constraints(&self) -> BTreeSet<SessionId> {
        self.store
            .sessions()
            .filter(|session| session.constraints.is_none())
            .map(|session| session.id)
            .collect()
    }
}
