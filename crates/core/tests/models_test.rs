use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;
use serde_json::{from_str, json, to_value};
use serde_test::{Token, assert_de_tokens};
use agenda_core::models::{
    assignment::SlotKey,
    backend::{AssignmentRecord, ConstraintRecord, SessionRecord, TimeSlotRecord, loose_bool},
    conflict::{ConflictHit, ConflictLevel, ConflictState, Direction},
    constraint::{ConstraintKind, ConstraintTarget},
    group::Group,
    ids::{GroupRef, PersonRef, RemoteAssignmentId, SessionId, TimeSlotId},
    person::Person,
    time_slot::{ColumnClass, TimeColumn, TimeSlot},
};

fn monday_at(hour: u32) -> TimeColumn {
    TimeColumn::new(
        NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
    )
}

#[derive(Debug, PartialEq, Deserialize)]
struct Flag {
    #[serde(deserialize_with = "loose_bool::deserialize")]
    value: bool,
}

#[rstest]
#[case(Token::Bool(true), true)]
#[case(Token::Bool(false), false)]
#[case(Token::Str("True"), true)]
#[case(Token::Str("False"), false)]
#[case(Token::Str("true"), true)]
#[case(Token::Str("0"), false)]
#[case(Token::U64(1), true)]
#[case(Token::I64(0), false)]
#[case(Token::Unit, false)]
fn test_loose_bool_normalisation(#[case] token: Token, #[case] expected: bool) {
    assert_de_tokens(
        &Flag { value: expected },
        &[
            Token::Struct { name: "Flag", len: 1 },
            Token::Str("value"),
            token,
            Token::StructEnd,
        ],
    );
}

#[test]
fn test_loose_bool_rejects_garbage() {
    let result: Result<Flag, _> = from_str(r#"{"value": "maybe"}"#);
    assert!(result.is_err());
}

#[rstest]
#[case("10:00")]
#[case("10:00:00")]
#[case("1000")]
fn test_timeslot_record_time_formats(#[case] time: &str) {
    let raw = json!({
        "timeslot_id": 7,
        "room": "Ballroom A",
        "date": "2024-03-18",
        "time": time,
        "domid": "ballrooma_2024-03-18_1000",
    });

    let record: TimeSlotRecord = serde_json::from_value(raw).expect("Failed to deserialize timeslot");

    assert_eq!(record.timeslot_id, TimeSlotId(7));
    assert_eq!(record.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert_eq!(record.capacity, None);
    assert!(!record.unscheduled_box);
}

#[test]
fn test_session_record_with_href_and_string_flags() {
    let raw = r#"{
        "session_id": 12,
        "title": "HTTP API Working Group",
        "group_href": "/api/v1/group/group/1234/",
        "attendees": 80,
        "special_request": "True",
        "bof": "False"
    }"#;

    let record: SessionRecord = from_str(raw).expect("Failed to deserialize session");

    assert_eq!(record.session_id, SessionId(12));
    assert_eq!(record.group_ref(), Some(GroupRef::new("/api/v1/group/group/1234/")));
    assert!(record.special_request);
    assert!(!record.bof);
    assert_eq!(record.requested_duration, None);
}

#[test]
fn test_session_record_inline_group_wins() {
    let raw = json!({
        "session_id": 3,
        "title": "TLS",
        "group": { "href": "/group/tls/", "acronym": "tls", "parent_area": "sec" },
        "group_href": "/group/other/",
    });

    let record: SessionRecord = serde_json::from_value(raw).unwrap();

    assert_eq!(record.group_ref(), Some(GroupRef::new("/group/tls/")));
}

#[test]
fn test_assignment_record_defaults() {
    let record: AssignmentRecord =
        from_str(r#"{"assignment_id": 5, "session_id": 1, "timeslot_id": 2}"#).unwrap();

    assert_eq!(record.assignment_id, RemoteAssignmentId(5));
    assert_eq!(record.extendedfrom_id, None);
    assert!(!record.pinned);
}

#[rstest]
#[case("conflict", ConstraintKind::Conflict, ConflictLevel::Strong)]
#[case("conflic2", ConstraintKind::Conflic2, ConflictLevel::Normal)]
#[case("conflic3", ConstraintKind::Conflic3, ConflictLevel::Weak)]
fn test_constraint_record_group_tiers(
    #[case] name: &str,
    #[case] kind: ConstraintKind,
    #[case] level: ConflictLevel,
) {
    let raw = json!({
        "constraint_id": 1,
        "name": name,
        "source_href": "/group/a/",
        "target_href": "/group/b/",
    });

    let record: ConstraintRecord = serde_json::from_value(raw).unwrap();
    let constraint = record.into_constraint().expect("group constraint");

    assert_eq!(constraint.kind, kind);
    assert_eq!(constraint.kind.level(), level);
    assert_eq!(constraint.target, ConstraintTarget::Group(GroupRef::new("/group/b/")));
    assert_eq!(constraint.direction_for(&GroupRef::new("/group/a/")), Some(Direction::Ours));
    assert_eq!(constraint.direction_for(&GroupRef::new("/group/b/")), Some(Direction::Theirs));
    assert_eq!(constraint.direction_for(&GroupRef::new("/group/c/")), None);
}

#[test]
fn test_bethere_constraint_needs_person() {
    let with_person: ConstraintRecord = serde_json::from_value(json!({
        "constraint_id": 2,
        "name": "bethere",
        "source_href": "/group/a/",
        "person_href": "/person/42/",
    }))
    .unwrap();
    let without_person: ConstraintRecord = serde_json::from_value(json!({
        "constraint_id": 3,
        "name": "bethere",
        "source_href": "/group/a/",
    }))
    .unwrap();

    assert_eq!(
        with_person.into_constraint().unwrap().target_person(),
        Some(&PersonRef::new("/person/42/"))
    );
    assert!(without_person.into_constraint().is_none());
}

#[test]
fn test_conflict_state_never_downgrades() {
    let mut state = ConflictState::default();
    let hit = |level| ConflictHit {
        peer: SessionId(9),
        direction: Direction::Ours,
        level,
        column: monday_at(10),
    };

    state.record(hit(ConflictLevel::Strong));
    state.record(hit(ConflictLevel::Weak));

    assert!(state.conflicted);
    assert_eq!(state.ours, ConflictLevel::Strong);
    assert_eq!(state.theirs, ConflictLevel::None);
    assert_eq!(state.level(), ConflictLevel::Strong);
    assert_eq!(state.level().tier(), Some(1));

    state.clear();
    assert_eq!(state, ConflictState::default());
}

#[test]
fn test_column_class_clash_requires_different_room() {
    let r1 = ColumnClass::new("R1", monday_at(10));
    let r2 = ColumnClass::new("R2", monday_at(10));
    let later = ColumnClass::new("R2", monday_at(11));

    assert!(r1.clashes_with(&r2));
    assert!(!r1.clashes_with(&r1.clone()));
    assert!(!r1.clashes_with(&later));
    assert_eq!(r1.to_string(), "R1_2024-03-18_1000");
}

#[test]
fn test_timeslot_fits_capacity() {
    let slot = TimeSlot {
        id: TimeSlotId(1),
        room: "R1".to_string(),
        capacity: Some(30),
        date: monday_at(10).date,
        time: monday_at(10).time,
        domid: "r1_1000".to_string(),
        empty: true,
        following: None,
        unscheduled_box: false,
    };

    assert!(slot.fits(Some(30)));
    assert!(!slot.fits(Some(50)));
    assert!(slot.fits(None));
}

#[test]
fn test_group_display_name_fallback() {
    let mut group = Group::placeholder(GroupRef::new("/api/v1/group/group/httpbis/"));
    assert_eq!(group.display_name(), "httpbis");

    group.acronym = Some("HTTPBIS".to_string());
    assert_eq!(group.display_name(), "HTTPBIS");
}

#[test]
fn test_person_double_booking() {
    let mut person = Person::placeholder(PersonRef::new("/person/7/"));
    person.require(monday_at(10), "R1", SessionId(1));
    person.require(monday_at(10), "R1", SessionId(2));
    assert!(!person.is_double_booked(&monday_at(10)));

    person.require(monday_at(10), "R2", SessionId(3));
    assert!(person.is_double_booked(&monday_at(10)));

    person.release(SessionId(3));
    assert!(!person.is_double_booked(&monday_at(10)));
    assert_eq!(person.display_name(), "7");
}

#[test]
fn test_slot_key_serialization() {
    assert_eq!(to_value(SlotKey::Unassigned).unwrap(), json!("unassigned"));
    assert_eq!(to_value(SlotKey::Slot(TimeSlotId(4))).unwrap(), json!({ "slot": 4 }));
}
