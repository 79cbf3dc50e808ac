use std::collections::HashMap;

use agenda_core::{
    errors::{AgendaError, AgendaResult},
    models::{
        assignment::{Assignment, SlotKey},
        backend::AssignmentRecord,
        ids::{AssignmentId, RemoteAssignmentId, SessionId, TimeSlotId},
        time_slot::ColumnClass,
    },
};
use tracing::{debug, warn};

use crate::store::EntityStore;

/// Options for [`AssignmentTable::place`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceOptions {
    /// Place even if another session already holds the slot.
    pub force: bool,
    /// Link the new assignment as the extension of this one.
    pub extension_of: Option<AssignmentId>,
}

/// Assignments created and deleted by one table operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentChange {
    pub removed: Vec<Assignment>,
    pub created: Vec<Assignment>,
}

impl AssignmentChange {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.created.is_empty()
    }

    pub fn absorb(&mut self, other: AssignmentChange) {
        self.removed.extend(other.removed);
        self.created.extend(other.created);
    }
}

/// What to do with a backend row once its create request returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The local assignment still exists and now carries the row id.
    Confirmed,
    /// The local assignment is gone; the backend row is stale.
    Orphaned(RemoteAssignmentId),
}

/// The many-to-many relation between sessions and timeslots.
///
/// Every mutation keeps three things in step: the slot's `empty` flag, the
/// session's column-class list, and the owning group's column index.
#[derive(Debug, Default)]
pub struct AssignmentTable {
    assignments: HashMap<AssignmentId, Assignment>,
    by_slot: HashMap<TimeSlotId, Vec<AssignmentId>>,
    by_session: HashMap<SessionId, Vec<AssignmentId>>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// The session's assignments, primary first.
    pub fn for_session(&self, session: SessionId) -> Vec<&Assignment> {
        let mut assignments: Vec<&Assignment> = self
            .by_session
            .get(&session)
            .into_iter()
            .flatten()
            .filter_map(|id| self.assignments.get(id))
            .collect();
        assignments.sort_by_key(|assignment| assignment.is_extension());
        assignments
    }

    pub fn primary_for(&self, session: SessionId) -> Option<&Assignment> {
        self.for_session(session)
            .into_iter()
            .find(|assignment| !assignment.is_extension())
    }

    pub fn at_slot(&self, slot: TimeSlotId) -> Vec<&Assignment> {
        self.by_slot
            .get(&slot)
            .into_iter()
            .flatten()
            .filter_map(|id| self.assignments.get(id))
            .collect()
    }

    /// Distinct sessions currently held by `slot`.
    pub fn occupants(&self, slot: TimeSlotId) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self
            .at_slot(slot)
            .into_iter()
            .map(|assignment| assignment.session)
            .collect();
        sessions.sort();
        sessions.dedup();
        sessions
    }

    /// Whether a session other than `except` holds the slot.
    pub fn is_occupied_by_other(&self, slot: TimeSlotId, except: SessionId) -> bool {
        self.occupants(slot).into_iter().any(|session| session != except)
    }

    pub fn find_remote(&self, remote: RemoteAssignmentId) -> Option<AssignmentId> {
        self.assignments
            .values()
            .find(|assignment| assignment.remote_id == Some(remote))
            .map(|assignment| assignment.id)
    }

    /// Creates an assignment of `session` to `slot`.
    ///
    /// Fails on an occupied slot unless `force` is set. Placing a session
    /// where it already sits returns the existing assignment.
    pub fn place(
        &mut self,
        store: &mut EntityStore,
        session: SessionId,
        slot: TimeSlotId,
        options: PlaceOptions,
    ) -> AgendaResult<AssignmentId> {
        self.check_placeable(store, session, slot, options)?;

        if let Some(existing) = self
            .at_slot(slot)
            .into_iter()
            .find(|assignment| assignment.session == session)
        {
            debug!("{} already holds {}, keeping {}", slot, session, existing.id);
            return Ok(existing.id);
        }

        let mut assignment = Assignment::new(session, slot);
        if let Some(source) = options.extension_of {
            assignment.extendedfrom = Some(source);
            if let Some(primary) = self.assignments.get_mut(&source) {
                primary.extendedto = Some(assignment.id);
            }
        }

        let id = assignment.id;
        debug!("Placing {} in {} as {}", session, slot, id);
        self.insert(store, assignment);
        self.sync_session(store, session);
        Ok(id)
    }

    /// Everything `place` would reject, checked without mutating.
    pub fn check_placeable(
        &self,
        store: &EntityStore,
        session: SessionId,
        slot: TimeSlotId,
        options: PlaceOptions,
    ) -> AgendaResult<()> {
        if store.session(session).is_none() {
            return Err(AgendaError::NotFound(format!("{session} not found")));
        }
        let timeslot = store
            .timeslot(slot)
            .ok_or_else(|| AgendaError::NotFound(format!("{slot} not found")))?;
        if timeslot.unscheduled_box {
            return Err(AgendaError::Validation(format!(
                "{slot} is the unassigned bucket, not a placeable slot"
            )));
        }
        if !options.force && self.is_occupied_by_other(slot, session) {
            return Err(AgendaError::SlotOccupied(format!(
                "{slot} already holds another session"
            )));
        }
        if let Some(source) = options.extension_of {
            let primary = self
                .assignments
                .get(&source)
                .ok_or_else(|| AgendaError::NotFound(format!("{source} not found")))?;
            if primary.session != session {
                return Err(AgendaError::Validation(format!(
                    "{source} belongs to {}, not {session}",
                    primary.session
                )));
            }
            if primary.extendedto.is_some() {
                return Err(AgendaError::Validation(format!("{source} is already extended")));
            }
        }
        Ok(())
    }

    /// Deletes the session's assignments at `slot`.
    ///
    /// Removing a primary also removes its extension, and removing an
    /// extension unlinks its primary. Matching nothing is a no-op: the
    /// session may already have been moved by another operation.
    pub fn remove(
        &mut self,
        store: &mut EntityStore,
        session: SessionId,
        slot: TimeSlotId,
    ) -> Vec<Assignment> {
        let targets: Vec<AssignmentId> = self
            .at_slot(slot)
            .into_iter()
            .filter(|assignment| assignment.session == session)
            .map(|assignment| assignment.id)
            .collect();
        if targets.is_empty() {
            debug!("No assignment of {} at {}, nothing to remove", session, slot);
            return Vec::new();
        }

        let removed: Vec<Assignment> = targets
            .into_iter()
            .flat_map(|id| self.remove_chain(store, id))
            .collect();
        self.sync_session(store, session);
        removed
    }

    /// Deletes every assignment the session holds.
    pub fn remove_all(&mut self, store: &mut EntityStore, session: SessionId) -> Vec<Assignment> {
        let ids: Vec<AssignmentId> = self.by_session.get(&session).cloned().unwrap_or_default();
        let removed: Vec<Assignment> = ids
            .into_iter()
            .flat_map(|id| self.remove_chain(store, id))
            .collect();
        self.sync_session(store, session);
        removed
    }

    /// `remove` then `place`, validated up front so that a rejected
    /// destination leaves the session where it was.
    ///
    /// Moving to [`SlotKey::Unassigned`] only removes. If the session still
    /// holds assignments elsewhere after removing from `from` (the caller's
    /// idea of its position was stale), those are removed too so the session
    /// never ends up in two places.
    pub fn move_session(
        &mut self,
        store: &mut EntityStore,
        session: SessionId,
        from: SlotKey,
        to: SlotKey,
        force: bool,
    ) -> AgendaResult<AssignmentChange> {
        let options = PlaceOptions {
            force,
            extension_of: None,
        };
        if let SlotKey::Slot(slot) = to {
            self.check_placeable(store, session, slot, options)?;
        } else if store.session(session).is_none() {
            return Err(AgendaError::NotFound(format!("{session} not found")));
        }

        let mut change = AssignmentChange::default();
        if let SlotKey::Slot(slot) = from {
            change.removed.extend(self.remove(store, session, slot));
        }
        if self.by_session.get(&session).is_some_and(|ids| !ids.is_empty()) {
            warn!("{} was not only at {:?}, clearing its other assignments", session, from);
            change.removed.extend(self.remove_all(store, session));
        }

        if let SlotKey::Slot(slot) = to {
            let id = self.place(store, session, slot, options)?;
            if let Some(created) = self.assignments.get(&id) {
                change.created.push(created.clone());
            }
        }
        Ok(change)
    }

    /// Whether the slot after the session's primary slot is free.
    pub fn can_extend_right(&self, store: &EntityStore, session: SessionId) -> bool {
        self.extension_target(store, session).is_ok()
    }

    fn extension_target(
        &self,
        store: &EntityStore,
        session: SessionId,
    ) -> AgendaResult<(AssignmentId, TimeSlotId)> {
        let primary = self
            .primary_for(session)
            .ok_or_else(|| AgendaError::Validation(format!("{session} is not scheduled")))?;
        if primary.extendedto.is_some() {
            return Err(AgendaError::Validation(format!("{session} is already extended")));
        }
        let next = store
            .timeslot(primary.timeslot)
            .and_then(|slot| slot.following)
            .ok_or_else(|| {
                AgendaError::Validation(format!("{} has no following slot", primary.timeslot))
            })?;
        let free = store.timeslot(next).is_some_and(|slot| slot.empty);
        if !free {
            return Err(AgendaError::SlotOccupied(format!(
                "{next} following {} is not empty",
                primary.timeslot
            )));
        }
        Ok((primary.id, next))
    }

    /// Creates the linked second assignment in the following slot.
    pub fn extend(&mut self, store: &mut EntityStore, session: SessionId) -> AgendaResult<Assignment> {
        let (primary, next) = self.extension_target(store, session)?;
        let id = self.place(
            store,
            session,
            next,
            PlaceOptions {
                force: false,
                extension_of: Some(primary),
            },
        )?;
        if let Some(entry) = store.session_mut(session) {
            entry.double_wide = true;
        }
        self.assignments
            .get(&id)
            .cloned()
            .ok_or_else(|| AgendaError::NotFound(format!("{id} vanished after placement")))
    }

    /// Removes the session's extension and both links.
    pub fn clear_extension(&mut self, store: &mut EntityStore, session: SessionId) -> Vec<Assignment> {
        let extensions: Vec<AssignmentId> = self
            .for_session(session)
            .into_iter()
            .filter(|assignment| assignment.is_extension())
            .map(|assignment| assignment.id)
            .collect();
        let removed: Vec<Assignment> = extensions
            .into_iter()
            .flat_map(|id| self.remove_chain(store, id))
            .collect();
        if let Some(entry) = store.session_mut(session) {
            entry.double_wide = false;
        }
        self.sync_session(store, session);
        removed
    }

    pub fn set_pinned(&mut self, id: AssignmentId, pinned: bool) -> AgendaResult<&Assignment> {
        let assignment = self
            .assignments
            .get_mut(&id)
            .ok_or_else(|| AgendaError::NotFound(format!("{id} not found")))?;
        assignment.pinned = pinned;
        Ok(assignment)
    }

    pub fn is_pinned(&self, session: SessionId) -> bool {
        self.for_session(session)
            .into_iter()
            .any(|assignment| assignment.pinned)
    }

    /// Adds a row from the backend.
    ///
    /// Rows already known by id, or duplicating a session/slot pair already
    /// present, are skipped: a bulk response can race with local moves. A row
    /// for a session whose local placement is still waiting on its create
    /// response is stale and skipped too.
    /// Rows naming unknown sessions or slots are logged and skipped.
    pub fn load_remote(
        &mut self,
        store: &mut EntityStore,
        record: &AssignmentRecord,
    ) -> Option<AssignmentId> {
        if self.find_remote(record.assignment_id).is_some() {
            debug!("{} already loaded", record.assignment_id);
            return None;
        }
        if store.session(record.session_id).is_none() {
            warn!(
                "{} refers to unknown {}, leaving the slot empty",
                record.assignment_id, record.session_id
            );
            return None;
        }
        if store.timeslot(record.timeslot_id).is_none() {
            warn!(
                "{} refers to unknown {}, skipping",
                record.assignment_id, record.timeslot_id
            );
            return None;
        }
        if let Some(existing) = self
            .at_slot(record.timeslot_id)
            .into_iter()
            .find(|assignment| assignment.session == record.session_id)
            .map(|assignment| assignment.id)
        {
            debug!(
                "{} duplicates {} for {}, skipping",
                record.assignment_id, existing, record.session_id
            );
            if let Some(assignment) = self.assignments.get_mut(&existing) {
                assignment.remote_id.get_or_insert(record.assignment_id);
            }
            return None;
        }
        if self
            .for_session(record.session_id)
            .iter()
            .any(|assignment| assignment.remote_id.is_none())
        {
            debug!(
                "{} has a local placement the backend has not acknowledged, skipping {}",
                record.session_id, record.assignment_id
            );
            return None;
        }

        let mut assignment = Assignment::new(record.session_id, record.timeslot_id);
        assignment.remote_id = Some(record.assignment_id);
        assignment.pinned = record.pinned;

        if let Some(source_remote) = record.extendedfrom_id {
            match self.find_remote(source_remote) {
                Some(source)
                    if self.assignments.get(&source).is_some_and(|primary| {
                        primary.session == record.session_id && primary.extendedto.is_none()
                    }) =>
                {
                    assignment.extendedfrom = Some(source);
                    if let Some(primary) = self.assignments.get_mut(&source) {
                        primary.extendedto = Some(assignment.id);
                    }
                    if let Some(session) = store.session_mut(record.session_id) {
                        session.double_wide = true;
                    }
                }
                _ => warn!(
                    "{} extends {} which is not a linkable primary, loading it unlinked",
                    record.assignment_id, source_remote
                ),
            }
        }

        let id = assignment.id;
        let session = assignment.session;
        self.insert(store, assignment);
        self.sync_session(store, session);
        Some(id)
    }

    /// Attaches the backend row id to a locally created assignment.
    pub fn confirm_remote(&mut self, local: AssignmentId, remote: RemoteAssignmentId) -> Reconcile {
        match self.assignments.get_mut(&local) {
            Some(assignment) => {
                assignment.remote_id = Some(remote);
                Reconcile::Confirmed
            }
            None => {
                warn!("{} was removed before {} was acknowledged", local, remote);
                Reconcile::Orphaned(remote)
            }
        }
    }

    /// Checks slot emptiness and extension mutuality across the table.
    pub fn verify(&self, store: &EntityStore) -> AgendaResult<()> {
        for slot in store.timeslots() {
            let held = !self.at_slot(slot.id).is_empty();
            if slot.empty == held {
                return Err(AgendaError::Validation(format!(
                    "{} empty={} but holds assignments={}",
                    slot.id, slot.empty, held
                )));
            }
        }
        for assignment in self.assignments.values() {
            if let Some(next) = assignment.extendedto {
                let linked = self
                    .assignments
                    .get(&next)
                    .is_some_and(|other| other.extendedfrom == Some(assignment.id));
                if !linked {
                    return Err(AgendaError::Validation(format!(
                        "{} extends to {} without a back link",
                        assignment.id, next
                    )));
                }
            }
            if let Some(previous) = assignment.extendedfrom {
                let linked = self
                    .assignments
                    .get(&previous)
                    .is_some_and(|other| other.extendedto == Some(assignment.id));
                if !linked {
                    return Err(AgendaError::Validation(format!(
                        "{} extends from {} without a forward link",
                        assignment.id, previous
                    )));
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, store: &mut EntityStore, assignment: Assignment) {
        let id = assignment.id;
        let slot = assignment.timeslot;
        self.by_slot.entry(slot).or_default().push(id);
        self.by_session.entry(assignment.session).or_default().push(id);
        self.assignments.insert(id, assignment);
        self.refresh_slot(store, slot);
    }

    /// Removes one assignment together with the extension hanging off it,
    /// and unlinks the primary it extends.
    fn remove_chain(&mut self, store: &mut EntityStore, id: AssignmentId) -> Vec<Assignment> {
        let Some(assignment) = self.assignments.remove(&id) else {
            return Vec::new();
        };
        if let Some(ids) = self.by_slot.get_mut(&assignment.timeslot) {
            ids.retain(|other| *other != id);
        }
        if let Some(ids) = self.by_session.get_mut(&assignment.session) {
            ids.retain(|other| *other != id);
        }
        self.refresh_slot(store, assignment.timeslot);

        if let Some(primary) = assignment
            .extendedfrom
            .and_then(|source| self.assignments.get_mut(&source))
        {
            primary.extendedto = None;
        }

        let mut removed = vec![assignment.clone()];
        if let Some(next) = assignment.extendedto {
            removed.extend(self.remove_chain(store, next));
        }
        removed
    }

    fn refresh_slot(&mut self, store: &mut EntityStore, slot: TimeSlotId) {
        let empty = self.by_slot.get(&slot).is_none_or(|ids| ids.is_empty());
        if let Some(timeslot) = store.timeslot_mut(slot) {
            timeslot.empty = empty;
        }
    }

    /// Rebuilds the session's column classes from its current assignments.
    fn sync_session(&self, store: &mut EntityStore, session: SessionId) {
        let mut column_classes: Vec<ColumnClass> = self
            .for_session(session)
            .into_iter()
            .filter_map(|assignment| store.timeslot(assignment.timeslot))
            .map(|slot| slot.column_class())
            .collect();
        column_classes.sort_by(|a, b| a.column.cmp(&b.column));
        column_classes.dedup();

        let still_extended = self
            .for_session(session)
            .into_iter()
            .any(|assignment| assignment.is_extension());
        if let Some(entry) = store.session_mut(session) {
            if !still_extended {
                entry.double_wide = false;
            }
        }
        store.set_column_classes(session, column_classes);
    }
}
