#![allow(dead_code)]

use agenda_core::models::{
    backend::{AssignmentRecord, ConstraintRecord, SessionRecord, TimeSlotRecord},
    constraint::ConstraintKind,
    ids::{ConstraintId, GroupRef, PersonRef, RemoteAssignmentId, SessionId, TimeSlotId},
};
use agenda_engine::Agenda;
use chrono::{NaiveDate, NaiveTime};

pub const MON_10_R1: TimeSlotId = TimeSlotId(1);
pub const MON_10_R2: TimeSlotId = TimeSlotId(2);
pub const MON_10_R3: TimeSlotId = TimeSlotId(3);
pub const MON_11_R1: TimeSlotId = TimeSlotId(4);
pub const MON_11_R2: TimeSlotId = TimeSlotId(5);
pub const BUCKET: TimeSlotId = TimeSlotId(99);

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 18).unwrap()
}

pub fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

pub fn slot(id: TimeSlotId, room: &str, hour: u32, capacity: Option<u32>) -> TimeSlotRecord {
    TimeSlotRecord {
        timeslot_id: id,
        room: room.to_string(),
        date: monday(),
        time: at(hour),
        domid: format!("{}_{:02}00", room.to_lowercase(), hour),
        capacity,
        unscheduled_box: false,
    }
}

pub fn bucket() -> TimeSlotRecord {
    TimeSlotRecord {
        unscheduled_box: true,
        ..slot(BUCKET, "unassigned", 0, None)
    }
}

/// Three rooms at 10:00, two at 11:00, plus the bucket. R2 seats 30.
pub fn timeslots() -> Vec<TimeSlotRecord> {
    vec![
        slot(MON_10_R1, "R1", 10, Some(100)),
        slot(MON_10_R2, "R2", 10, Some(30)),
        slot(MON_10_R3, "R3", 10, None),
        slot(MON_11_R1, "R1", 11, Some(100)),
        slot(MON_11_R2, "R2", 11, Some(30)),
        bucket(),
    ]
}

pub fn group(acronym: &str) -> GroupRef {
    GroupRef::new(format!("/group/{acronym}/"))
}

pub fn person(name: &str) -> PersonRef {
    PersonRef::new(format!("/person/{name}/"))
}

pub fn session(id: i64, acronym: &str, attendees: Option<u32>) -> SessionRecord {
    SessionRecord {
        session_id: SessionId(id),
        title: format!("{acronym} session"),
        group: None,
        group_href: Some(group(acronym)),
        attendees,
        requested_duration: Some(60),
        special_request: false,
        bof: false,
    }
}

pub fn group_conflict(id: i64, kind: ConstraintKind, source: &str, target: &str) -> ConstraintRecord {
    ConstraintRecord {
        constraint_id: ConstraintId(id),
        name: kind,
        source_href: group(source),
        target_href: Some(group(target)),
        person_href: None,
    }
}

pub fn bethere(id: i64, source: &str, name: &str) -> ConstraintRecord {
    ConstraintRecord {
        constraint_id: ConstraintId(id),
        name: ConstraintKind::BeThere,
        source_href: group(source),
        target_href: None,
        person_href: Some(person(name)),
    }
}

pub fn assignment(id: i64, session: i64, slot: TimeSlotId) -> AssignmentRecord {
    AssignmentRecord {
        assignment_id: RemoteAssignmentId(id),
        session_id: SessionId(session),
        timeslot_id: slot,
        extendedfrom_id: None,
        pinned: false,
    }
}

/// Timeslots plus the given sessions, nothing placed, no constraints.
pub fn agenda_with(sessions: Vec<SessionRecord>) -> Agenda {
    let mut agenda = Agenda::new();
    agenda.load_timeslots(timeslots());
    agenda.load_sessions(sessions);
    agenda
}
