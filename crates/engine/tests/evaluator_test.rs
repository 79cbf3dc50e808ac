mod common;

use agenda_core::models::{
    assignment::SlotKey,
    conflict::{ConflictLevel, Direction},
    constraint::ConstraintKind,
    ids::{SessionId, TimeSlotId},
};
use agenda_engine::{Agenda, MoveOptions, MoveOutcome, evaluator};
use fake::{Fake, faker::lorem::en::Sentence};
use pretty_assertions::assert_eq;
use rstest::rstest;

use common::*;

fn place(agenda: &mut Agenda, session: i64, slot: TimeSlotId) {
    let outcome = agenda
        .move_session(
            SessionId(session),
            SlotKey::Unassigned,
            SlotKey::Slot(slot),
            MoveOptions { confirmed: true },
        )
        .unwrap();
    assert!(matches!(outcome, MoveOutcome::Applied(_)));
}

#[rstest]
#[case::strong_first(vec![ConstraintKind::Conflict, ConstraintKind::Conflic3])]
#[case::weak_first(vec![ConstraintKind::Conflic3, ConstraintKind::Conflict])]
#[case::all_tiers(vec![ConstraintKind::Conflic3, ConstraintKind::Conflic2, ConstraintKind::Conflict])]
fn test_most_severe_hit_wins_regardless_of_order(#[case] kinds: Vec<ConstraintKind>) {
    let targets = ["beta", "gamma", "delta"];
    let mut sessions = vec![session(1, "alpha", None)];
    for (index, target) in targets.iter().enumerate().take(kinds.len()) {
        sessions.push(session(index as i64 + 2, target, None));
    }
    let mut agenda = agenda_with(sessions);

    let slots = [MON_10_R2, MON_10_R3];
    place(&mut agenda, 1, MON_10_R1);
    for index in 0..kinds.len() {
        // The third peer shares R3 with the second; co-location is confirmed.
        place(&mut agenda, index as i64 + 2, slots[index.min(1)]);
    }

    let records = kinds
        .iter()
        .zip(targets)
        .enumerate()
        .map(|(index, (kind, target))| group_conflict(index as i64 + 1, *kind, "alpha", target))
        .collect();
    agenda.apply_constraints(SessionId(1), records);

    let state = agenda.conflict_state(SessionId(1)).unwrap();
    assert!(state.conflicted);
    assert_eq!(state.ours, ConflictLevel::Strong);
    assert_eq!(state.theirs, ConflictLevel::None);
    assert_eq!(state.level, ConflictLevel::Strong);
    assert_eq!(state.hits.len(), kinds.len());
}

#[test]
fn test_incoming_constraint_flags_theirs_direction() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "beta", None)]);
    place(&mut agenda, 1, MON_10_R1);
    place(&mut agenda, 2, MON_10_R2);

    agenda.apply_constraints(
        SessionId(2),
        vec![group_conflict(7, ConstraintKind::Conflic2, "alpha", "beta")],
    );

    let state = agenda.conflict_state(SessionId(2)).unwrap();
    assert_eq!(state.ours, ConflictLevel::None);
    assert_eq!(state.theirs, ConflictLevel::Normal);
    assert_eq!(state.hits[0].peer, SessionId(1));
    assert_eq!(state.hits[0].direction, Direction::Theirs);
}

#[test]
fn test_hit_is_mirrored_onto_unconstrained_peer() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "beta", None)]);
    place(&mut agenda, 1, MON_10_R1);
    place(&mut agenda, 2, MON_10_R2);

    agenda.apply_constraints(
        SessionId(2),
        vec![group_conflict(7, ConstraintKind::Conflic2, "alpha", "beta")],
    );

    let state = agenda.conflict_state(SessionId(1)).unwrap();
    assert!(state.conflicted);
    assert_eq!(state.ours, ConflictLevel::Normal);
    assert_eq!(state.theirs, ConflictLevel::None);
    assert_eq!(state.hits.len(), 1);
    assert_eq!(state.hits[0].peer, SessionId(2));
    assert_eq!(state.hits[0].direction, Direction::Ours);
}

#[test]
fn test_mirrored_hit_does_not_double_count() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "beta", None)]);
    place(&mut agenda, 1, MON_10_R1);
    place(&mut agenda, 2, MON_10_R2);
    let tier1 = group_conflict(1, ConstraintKind::Conflict, "alpha", "beta");

    agenda.apply_constraints(SessionId(1), vec![tier1.clone()]);
    agenda.apply_constraints(SessionId(2), vec![tier1]);

    assert_eq!(agenda.conflict_state(SessionId(1)).unwrap().hits.len(), 1);
    assert_eq!(agenda.conflict_state(SessionId(2)).unwrap().hits.len(), 1);
}

#[test]
fn test_self_conflict_is_skipped() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "alpha", None)]);
    place(&mut agenda, 1, MON_10_R1);
    place(&mut agenda, 2, MON_10_R2);

    agenda.apply_constraints(
        SessionId(1),
        vec![group_conflict(1, ConstraintKind::Conflict, "alpha", "alpha")],
    );

    let session = agenda.store().session(SessionId(1)).unwrap();
    assert!(session.constraints.as_ref().unwrap().conflicts.is_empty());
    assert!(!session.conflict.conflicted);
}

#[test]
fn test_sessions_sharing_a_room_do_not_clash() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "beta", None)]);
    place(&mut agenda, 1, MON_10_R1);
    place(&mut agenda, 2, MON_10_R1);

    agenda.apply_constraints(
        SessionId(1),
        vec![group_conflict(1, ConstraintKind::Conflict, "alpha", "beta")],
    );

    assert!(!agenda.conflict_state(SessionId(1)).unwrap().conflicted);
}

#[test]
fn test_different_time_columns_do_not_clash() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "beta", None)]);
    place(&mut agenda, 1, MON_10_R1);
    place(&mut agenda, 2, MON_11_R2);

    agenda.apply_constraints(
        SessionId(1),
        vec![group_conflict(1, ConstraintKind::Conflict, "alpha", "beta")],
    );

    assert!(!agenda.conflict_state(SessionId(1)).unwrap().conflicted);
}

#[test]
fn test_unscheduled_session_is_never_conflicted() {
    let mut agenda = agenda_with(vec![session(1, "alpha", None), session(2, "beta", None)]);
    place(&mut agenda, 2, MON_10_R2);

    agenda.apply_constraints(
        SessionId(1),
        vec![group_conflict(1, ConstraintKind::Conflict, "alpha", "beta")],
    );
    agenda.recalculate_all();

    assert!(evaluator::group_conflict_hits(agenda.store(), SessionId(1)).is_empty());
    assert!(!agenda.conflict_state(SessionId(1)).unwrap().conflicted);
}

#[test]
fn test_recompute_is_idempotent() {
    let groups = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];
    let mut records = Vec::new();
    for (index, acronym) in groups.iter().enumerate() {
        let mut record = session(index as i64 + 1, acronym, None);
        record.title = Sentence(2..6).fake();
        records.push(record);
    }
    let mut agenda = agenda_with(records);

    let slots = [MON_10_R1, MON_10_R2, MON_10_R3, MON_11_R1, MON_11_R2, MON_10_R1];
    for (index, slot) in slots.iter().enumerate() {
        place(&mut agenda, index as i64 + 1, *slot);
    }
    for (index, acronym) in groups.iter().enumerate() {
        let next = groups[(index + 1) % groups.len()];
        let previous = groups[(index + groups.len() - 1) % groups.len()];
        agenda.apply_constraints(
            SessionId(index as i64 + 1),
            vec![
                group_conflict(index as i64 * 10, ConstraintKind::Conflict, acronym, next),
                group_conflict(
                    (index as i64 + groups.len() as i64 - 1) % groups.len() as i64 * 10,
                    ConstraintKind::Conflict,
                    previous,
                    acronym,
                ),
                bethere(100 + index as i64, acronym, "chair"),
            ],
        );
    }

    let snapshot = |agenda: &Agenda| {
        agenda
            .store()
            .sessions()
            .map(|session| (session.id, session.conflict.clone()))
            .collect::<Vec<_>>()
    };

    agenda.recalculate_all();
    let first = snapshot(&agenda);
    agenda.recalculate_all();
    let second = snapshot(&agenda);

    assert_eq!(first, second);
    assert!(first.iter().any(|(_, state)| state.conflicted));
    assert!(first.iter().any(|(_, state)| state.person_conflicted));
}
