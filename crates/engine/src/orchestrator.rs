//! # Move Orchestrator
//!
//! Each move attempt goes through a small state machine:
//!
//! - **Validate**: is the destination too small for the session, and is it
//!   already held by someone else?
//! - **Confirm**: either condition hands the two flags back to the caller,
//!   who must ask the operator. Re-issuing the move with `confirmed` set
//!   applies it as a co-location: both sessions share the slot.
//! - **Apply**: mutate the assignment table, propagate conflicts over the
//!   affected sessions, notify subscribers.
//! - **Abort**: identical source and destination, or a pinned session,
//!   leave everything untouched.
//!
//! Extension requests are their own transition and only succeed when the
//! following slot in the same room is empty.

use std::collections::BTreeSet;

use agenda_core::{
    errors::{AgendaError, AgendaResult},
    models::{assignment::SlotKey, ids::SessionId, time_slot::ColumnClass},
};
use tracing::{debug, info};

use crate::{
    evaluator,
    propagation::{self, ConflictNotifier},
    store::EntityStore,
    table::{AssignmentChange, AssignmentTable},
};

/// The two confirmable conditions of a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveCheck {
    /// Requested attendees exceed the destination room's capacity.
    pub too_small: bool,
    /// Another session already holds the destination slot.
    pub occupied: bool,
}

impl MoveCheck {
    pub fn needs_confirmation(&self) -> bool {
        self.too_small || self.occupied
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveOptions {
    pub confirmed: bool,
}

/// What an applied change did.
#[derive(Debug, Clone, Default)]
pub struct MoveReport {
    pub session: Option<SessionId>,
    pub check: MoveCheck,
    pub change: AssignmentChange,
    pub recomputed: BTreeSet<SessionId>,
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub enum MoveOutcome {
    Applied(MoveReport),
    NeedsConfirmation(MoveCheck),
    Unchanged,
}

/// Borrows the engine's state for the duration of one operation.
pub struct MoveOrchestrator<'a> {
    pub store: &'a mut EntityStore,
    pub table: &'a mut AssignmentTable,
    pub notifier: &'a mut ConflictNotifier,
}

impl MoveOrchestrator<'_> {
    pub fn validate(&self, session: SessionId, to: SlotKey) -> AgendaResult<MoveCheck> {
        let entry = self
            .store
            .session(session)
            .ok_or_else(|| AgendaError::NotFound(format!("{session} not found")))?;

        let SlotKey::Slot(slot) = to else {
            return Ok(MoveCheck::default());
        };
        let timeslot = self
            .store
            .timeslot(slot)
            .ok_or_else(|| AgendaError::NotFound(format!("{slot} not found")))?;
        if timeslot.unscheduled_box {
            return Ok(MoveCheck::default());
        }

        Ok(MoveCheck {
            too_small: !timeslot.fits(entry.attendees),
            occupied: self.table.is_occupied_by_other(slot, session),
        })
    }

    pub fn move_session(
        &mut self,
        session: SessionId,
        from: SlotKey,
        to: SlotKey,
        options: MoveOptions,
    ) -> AgendaResult<MoveOutcome> {
        let from = self.normalise(from);
        let to = self.normalise(to);
        if from == to {
            debug!("{} source and destination are both {:?}", session, to);
            return Ok(MoveOutcome::Unchanged);
        }
        if self.table.is_pinned(session) {
            return Err(AgendaError::Validation(format!(
                "{session} is pinned and cannot be moved"
            )));
        }

        let check = self.validate(session, to)?;
        if check.needs_confirmation() && !options.confirmed {
            debug!(
                "{} to {:?} held for confirmation: too_small={} occupied={}",
                session, to, check.too_small, check.occupied
            );
            return Ok(MoveOutcome::NeedsConfirmation(check));
        }

        let (old, was_double_wide) = self.position(session);
        let mut change = self
            .table
            .move_session(self.store, session, from, to, options.confirmed)?;
        if change.is_empty() {
            return Ok(MoveOutcome::Unchanged);
        }

        if was_double_wide && to != SlotKey::Unassigned {
            if self.table.can_extend_right(self.store, session) {
                let extension = self.table.extend(self.store, session)?;
                change.created.push(extension);
            } else {
                info!("{} no longer fits double-wide at {:?}, dropping its extension", session, to);
            }
        }

        let mut report = self.finish(session, &old, change);
        report.check = check;
        Ok(MoveOutcome::Applied(report))
    }

    /// Makes the session double-wide by taking the following slot.
    pub fn extend(&mut self, session: SessionId) -> AgendaResult<MoveReport> {
        let (old, _) = self.position(session);
        let extension = self.table.extend(self.store, session)?;
        let change = AssignmentChange {
            removed: Vec::new(),
            created: vec![extension],
        };
        Ok(self.finish(session, &old, change))
    }

    pub fn clear_extension(&mut self, session: SessionId) -> AgendaResult<MoveReport> {
        if self.store.session(session).is_none() {
            return Err(AgendaError::NotFound(format!("{session} not found")));
        }
        let (old, _) = self.position(session);
        let removed = self.table.clear_extension(self.store, session);
        let change = AssignmentChange {
            removed,
            created: Vec::new(),
        };
        Ok(self.finish(session, &old, change))
    }

    /// Moves every session without a pinned assignment to the bucket, then
    /// recomputes everything once.
    pub fn unschedule_all(&mut self) -> MoveReport {
        let mut change = AssignmentChange::default();
        for session in self.store.session_ids() {
            if self.table.for_session(session).is_empty() || self.table.is_pinned(session) {
                continue;
            }
            change.removed.extend(self.table.remove_all(self.store, session));
        }
        info!("Unscheduled {} assignments", change.removed.len());

        let recomputed = evaluator::recompute_all(self.store);
        let revision = self.notifier.notify(&recomputed);
        MoveReport {
            session: None,
            check: MoveCheck::default(),
            change,
            recomputed,
            revision,
        }
    }

    /// The bucket pseudo-slot and `Unassigned` mean the same thing.
    fn normalise(&self, key: SlotKey) -> SlotKey {
        match key {
            SlotKey::Slot(slot)
                if self
                    .store
                    .timeslot(slot)
                    .is_some_and(|timeslot| timeslot.unscheduled_box) =>
            {
                SlotKey::Unassigned
            }
            other => other,
        }
    }

    fn position(&self, session: SessionId) -> (Vec<ColumnClass>, bool) {
        self.store
            .session(session)
            .map(|entry| (entry.column_classes.clone(), entry.double_wide))
            .unwrap_or_default()
    }

    fn finish(&mut self, session: SessionId, old: &[ColumnClass], change: AssignmentChange) -> MoveReport {
        let new = self
            .store
            .session(session)
            .map(|entry| entry.column_classes.clone())
            .unwrap_or_default();
        let recomputed = propagation::propagate(self.store, session, old, &new);
        let revision = self.notifier.notify(&recomputed);
        MoveReport {
            session: Some(session),
            check: MoveCheck::default(),
            change,
            recomputed,
            revision,
        }
    }
}
