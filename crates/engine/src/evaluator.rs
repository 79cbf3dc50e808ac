//! # Conflict Evaluator
//!
//! Works out, for one session at a time, which declared group conflicts are
//! live given where every session currently sits, and whether any required
//! attendee is needed in two rooms at once.
//!
//! ## Group conflicts
//!
//! For every time column the session occupies and every group conflict it
//! carries (outgoing "ours" and incoming "theirs"):
//!
//! 1. Look up the group on the far side of the constraint
//! 2. Skip it quickly unless that group occupies the same time column
//! 3. For each session of that group in the same column but a different
//!    room, record a hit tagged with the constraint's direction and level
//!
//! Every hit is mirrored onto the peer with its direction reversed, so a
//! peer is flagged even when its own copy of the constraint never loaded.
//! The displayed level per direction is the most severe hit; hit order
//! does not matter.
//!
//! ## Person availability
//!
//! Each person keeps a map of time column to the rooms they are required
//! in. A session is person-conflicted when one of its required attendees is
//! needed in more than one room during a column the session occupies. The
//! map must reflect every session's final position, so this pass runs after
//! the group pass over the same set of sessions.

use std::collections::{BTreeMap, BTreeSet};

use agenda_core::models::{conflict::ConflictHit, ids::SessionId, time_slot::ColumnClass};
use tracing::{debug, warn};

use crate::store::EntityStore;

/// Group-conflict hits for `session` against the current placement.
///
/// Returns an empty list for unscheduled sessions and for sessions whose
/// constraints have not been loaded yet.
pub fn group_conflict_hits(store: &EntityStore, session_id: SessionId) -> Vec<ConflictHit> {
    let Some(session) = store.session(session_id) else {
        return Vec::new();
    };
    let Some(constraints) = &session.constraints else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for ours in &session.column_classes {
        for constraint in &constraints.conflicts {
            if constraint.other_group == session.group {
                warn!(
                    "{} on {} points back at its own group {}, ignoring",
                    constraint.id, session_id, session.group
                );
                continue;
            }
            let Some(group) = store.group(&constraint.other_group) else {
                continue;
            };
            if !group.occupies(&ours.column) {
                continue;
            }

            for peer_id in &group.sessions {
                if *peer_id == session_id {
                    continue;
                }
                let Some(peer) = store.session(*peer_id) else {
                    warn!("{} lists unknown {}", group.href, peer_id);
                    continue;
                };
                for theirs in &peer.column_classes {
                    if ours.clashes_with(theirs) {
                        hits.push(ConflictHit {
                            peer: *peer_id,
                            direction: constraint.direction,
                            level: constraint.level,
                            column: ours.column,
                        });
                    }
                }
            }
        }
    }
    hits
}

/// Sessions in `sessions` plus everyone sharing a time column with them.
///
/// A clash is found from whichever side holds the constraint, so both sides
/// have to be evaluated to rebuild either one's flags.
fn column_neighbours(store: &EntityStore, sessions: &BTreeSet<SessionId>) -> BTreeSet<SessionId> {
    let columns: Vec<ColumnClass> = sessions
        .iter()
        .filter_map(|id| store.session(*id))
        .flat_map(|session| session.column_classes.iter().cloned())
        .collect();

    store
        .sessions()
        .filter(|session| sessions.contains(&session.id) || session.shares_column_with(&columns))
        .map(|session| session.id)
        .collect()
}

/// Clears and recomputes the group-conflict flags of every session in
/// `sessions`.
///
/// Each hit is recorded on the session that carries the constraint and,
/// reversed, on the peer it clashes with. A peer whose own constraints are
/// missing or failed to load is still flagged. Sessions outside the set
/// keep their flags.
pub fn recompute_group_conflicts(store: &mut EntityStore, sessions: &BTreeSet<SessionId>) {
    let mut found: BTreeMap<SessionId, Vec<ConflictHit>> =
        sessions.iter().map(|id| (*id, Vec::new())).collect();

    for origin in column_neighbours(store, sessions) {
        for hit in group_conflict_hits(store, origin) {
            if let Some(peer_hits) = found.get_mut(&hit.peer) {
                peer_hits.push(hit.seen_from(origin));
            }
            if let Some(own_hits) = found.get_mut(&origin) {
                own_hits.push(hit);
            }
        }
    }

    for (session_id, hits) in found {
        let Some(session) = store.session_mut(session_id) else {
            continue;
        };
        session.conflict.clear_group_conflicts();
        for hit in hits {
            session.conflict.record(hit);
        }
        if session.conflict.conflicted {
            debug!(
                "{} conflicted: ours={:?} theirs={:?} ({} hits)",
                session_id,
                session.conflict.ours,
                session.conflict.theirs,
                session.conflict.hits.len()
            );
        }
    }
}

/// Re-registers where the session's required attendees must be.
pub fn refresh_person_requirements(store: &mut EntityStore, session_id: SessionId) {
    let Some(session) = store.session(session_id) else {
        return;
    };
    let people = session
        .constraints
        .as_ref()
        .map(|constraints| constraints.bethere.clone())
        .unwrap_or_default();
    let placements: Vec<_> = session
        .column_classes
        .iter()
        .map(|cc| (cc.column, cc.room.clone()))
        .collect();

    for href in people {
        let person = store.get_or_create_person(&href);
        person.release(session_id);
        for (column, room) in &placements {
            person.require(*column, room, session_id);
        }
    }
}

/// Whether any required attendee of the session is double-booked during a
/// column the session occupies.
pub fn is_person_conflicted(store: &EntityStore, session_id: SessionId) -> bool {
    let Some(session) = store.session(session_id) else {
        return false;
    };
    let Some(constraints) = &session.constraints else {
        return false;
    };

    constraints.bethere.iter().any(|href| {
        store.person(href).is_some_and(|person| {
            session
                .columns()
                .any(|column| person.is_double_booked(column))
        })
    })
}

pub fn recompute_person_conflict(store: &mut EntityStore, session_id: SessionId) {
    let conflicted = is_person_conflicted(store, session_id);
    if let Some(session) = store.session_mut(session_id) {
        session.conflict.person_conflicted = conflicted;
    }
}

/// Recomputes every flag of every session in `sessions`.
///
/// Person requirements are re-registered for the whole set before any
/// person flag is read, so the availability pass sees final positions.
pub fn recompute(store: &mut EntityStore, sessions: &BTreeSet<SessionId>) {
    for session in sessions {
        refresh_person_requirements(store, *session);
    }
    recompute_group_conflicts(store, sessions);
    for session in sessions {
        recompute_person_conflict(store, *session);
    }
}

/// Full recompute: every person map rebuilt from scratch and every session
/// re-evaluated. Reserved for initial load and explicit refresh.
pub fn recompute_all(store: &mut EntityStore) -> BTreeSet<SessionId> {
    for person in store.people_mut() {
        person.required.clear();
    }
    let all: BTreeSet<SessionId> = store.session_ids().into_iter().collect();
    recompute(store, &all);
    all
}
