#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agenda_api::{ApiState, build_router};
use agenda_client::mock::MockSource;
use agenda_core::models::{
    backend::{AssignmentRecord, ConstraintRecord, SessionRecord, TimeSlotRecord},
    constraint::ConstraintKind,
    ids::{ConstraintId, GroupRef, RemoteAssignmentId, SessionId, TimeSlotId},
};
use agenda_engine::{Agenda, ScheduleLoader};
use axum_test::TestServer;
use chrono::{NaiveDate, NaiveTime};

pub const MON_10_R1: TimeSlotId = TimeSlotId(1);
pub const MON_10_R2: TimeSlotId = TimeSlotId(2);
pub const MON_11_R1: TimeSlotId = TimeSlotId(3);

fn slot(id: TimeSlotId, room: &str, hour: u32, capacity: Option<u32>) -> TimeSlotRecord {
    TimeSlotRecord {
        timeslot_id: id,
        room: room.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
        time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        domid: format!("{room}_{hour}"),
        capacity,
        unscheduled_box: false,
    }
}

fn session(id: i64, acronym: &str, attendees: Option<u32>) -> SessionRecord {
    SessionRecord {
        session_id: SessionId(id),
        title: format!("{acronym} session"),
        group: None,
        group_href: Some(GroupRef::new(format!("/group/{acronym}/"))),
        attendees,
        requested_duration: None,
        special_request: false,
        bof: false,
    }
}

fn conflict(source: &str, target: &str) -> ConstraintRecord {
    ConstraintRecord {
        constraint_id: ConstraintId(1),
        name: ConstraintKind::Conflict,
        source_href: GroupRef::new(format!("/group/{source}/")),
        target_href: Some(GroupRef::new(format!("/group/{target}/"))),
        person_href: None,
    }
}

/// Sessions 1 (alpha, 80 attendees) and 2 (beta) with a tier-1 conflict
/// between their groups. Session 1 sits in R1 at 10:00 as backend row 10,
/// session 2 starts unassigned. R2 seats 30.
pub struct TestContext {
    pub source: MockSource,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            source: MockSource::new(),
        }
    }

    /// Builds the agenda directly and hands the mock to the loader for the
    /// sync calls a test expects.
    pub fn build_state(self) -> Arc<ApiState> {
        let mut agenda = Agenda::new();
        agenda.load_timeslots(vec![
            slot(MON_10_R1, "R1", 10, Some(100)),
            slot(MON_10_R2, "R2", 10, Some(30)),
            slot(MON_11_R1, "R1", 11, Some(100)),
        ]);
        agenda.load_sessions(vec![session(1, "alpha", Some(80)), session(2, "beta", None)]);
        agenda.load_assignments(vec![AssignmentRecord {
            assignment_id: RemoteAssignmentId(10),
            session_id: SessionId(1),
            timeslot_id: MON_10_R1,
            extendedfrom_id: None,
            pinned: false,
        }]);
        agenda.apply_constraints(SessionId(1), vec![conflict("alpha", "beta")]);
        agenda.apply_constraints(SessionId(2), vec![conflict("alpha", "beta")]);
        agenda.recalculate_all();

        let loader = ScheduleLoader::new(Arc::new(self.source), Duration::from_secs(1));
        Arc::new(ApiState {
            agenda: agenda.shared(),
            loader: Arc::new(loader),
        })
    }

    pub fn server(self) -> (TestServer, Arc<ApiState>) {
        let state = self.build_state();
        let server = TestServer::new(build_router(Arc::clone(&state))).unwrap();
        (server, state)
    }
}

pub fn created(id: i64, session: SessionId, timeslot: TimeSlotId) -> AssignmentRecord {
    AssignmentRecord {
        assignment_id: RemoteAssignmentId(id),
        session_id: session,
        timeslot_id: timeslot,
        extendedfrom_id: None,
        pinned: false,
    }
}
