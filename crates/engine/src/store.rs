use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime};

use agenda_core::models::{
    backend::{ConstraintRecord, GroupRecord, PersonRecord, SessionRecord, TimeSlotRecord},
    conflict::ConflictState,
    constraint::{DirectedConstraint, SessionConstraints},
    group::Group,
    ids::{GroupRef, PersonRef, SessionId, TimeSlotId},
    person::Person,
    session::Session,
    time_slot::{ColumnClass, TimeSlot},
};
use tracing::{debug, warn};

/// Arena of every entity the engine knows about.
///
/// Entities refer to each other by id only. Groups and people may be
/// referenced before they are fetched; [`EntityStore::get_or_create_group`]
/// then hands out a placeholder with `loaded == false` that is filled in
/// place once the fetch completes, so callers should look entries up again
/// instead of keeping copies.
#[derive(Debug, Default)]
pub struct EntityStore {
    sessions: BTreeMap<SessionId, Session>,
    timeslots: BTreeMap<TimeSlotId, TimeSlot>,
    groups: HashMap<GroupRef, Group>,
    people: HashMap<PersonRef, Person>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn timeslot(&self, id: TimeSlotId) -> Option<&TimeSlot> {
        self.timeslots.get(&id)
    }

    pub fn timeslot_mut(&mut self, id: TimeSlotId) -> Option<&mut TimeSlot> {
        self.timeslots.get_mut(&id)
    }

    pub fn timeslots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.timeslots.values()
    }

    pub fn group(&self, href: &GroupRef) -> Option<&Group> {
        self.groups.get(href)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn person(&self, href: &PersonRef) -> Option<&Person> {
        self.people.get(href)
    }

    pub fn person_mut(&mut self, href: &PersonRef) -> Option<&mut Person> {
        self.people.get_mut(href)
    }

    pub fn people_mut(&mut self) -> impl Iterator<Item = &mut Person> {
        self.people.values_mut()
    }

    /// Returns the group for `href`, creating an unloaded placeholder the
    /// first time it is referenced.
    pub fn get_or_create_group(&mut self, href: &GroupRef) -> &mut Group {
        self.groups
            .entry(href.clone())
            .or_insert_with(|| Group::placeholder(href.clone()))
    }

    pub fn get_or_create_person(&mut self, href: &PersonRef) -> &mut Person {
        self.people
            .entry(href.clone())
            .or_insert_with(|| Person::placeholder(href.clone()))
    }

    /// Groups referenced so far whose data has not been fetched.
    pub fn unloaded_groups(&self) -> Vec<GroupRef> {
        self.groups
            .values()
            .filter(|group| !group.loaded)
            .map(|group| group.href.clone())
            .collect()
    }

    pub fn unloaded_people(&self) -> Vec<PersonRef> {
        self.people
            .values()
            .filter(|person| !person.loaded)
            .map(|person| person.href.clone())
            .collect()
    }

    pub fn apply_group_record(&mut self, record: GroupRecord) {
        let group = self.get_or_create_group(&record.href);
        group.acronym = record.acronym;
        group.name = record.name;
        group.parent_area = record.parent_area;
        group.loaded = true;
        group.load_error = false;
    }

    /// Marks a group whose fetch failed. It stays usable and displays its
    /// derived name.
    pub fn mark_group_failed(&mut self, href: &GroupRef) {
        let group = self.get_or_create_group(href);
        group.loaded = true;
        group.load_error = true;
    }

    pub fn apply_person_record(&mut self, record: PersonRecord) {
        let person = self.get_or_create_person(&record.href);
        person.name = record.name;
        person.loaded = true;
        person.load_error = false;
    }

    pub fn mark_person_failed(&mut self, href: &PersonRef) {
        let person = self.get_or_create_person(href);
        person.loaded = true;
        person.load_error = true;
    }

    /// Inserts or refreshes a timeslot. Occupancy and following-slot links
    /// of an existing slot are kept.
    pub fn insert_timeslot(&mut self, record: TimeSlotRecord) -> TimeSlotId {
        let id = record.timeslot_id;
        match self.timeslots.get_mut(&id) {
            Some(slot) => {
                slot.room = record.room;
                slot.capacity = record.capacity;
                slot.date = record.date;
                slot.time = record.time;
                slot.domid = record.domid;
                slot.unscheduled_box = record.unscheduled_box;
            }
            None => {
                self.timeslots.insert(
                    id,
                    TimeSlot {
                        id,
                        room: record.room,
                        capacity: record.capacity,
                        date: record.date,
                        time: record.time,
                        domid: record.domid,
                        empty: true,
                        following: None,
                        unscheduled_box: record.unscheduled_box,
                    },
                );
            }
        }
        id
    }

    /// Links every slot to the chronologically next slot in the same room on
    /// the same date.
    pub fn link_following_slots(&mut self) {
        let mut by_room: BTreeMap<(String, NaiveDate), Vec<(NaiveTime, TimeSlotId)>> =
            BTreeMap::new();
        for slot in self.timeslots.values().filter(|slot| !slot.unscheduled_box) {
            by_room
                .entry((slot.room.clone(), slot.date))
                .or_default()
                .push((slot.time, slot.id));
        }

        for slot in self.timeslots.values_mut() {
            slot.following = None;
        }
        for (_, mut slots) in by_room {
            slots.sort();
            for pair in slots.windows(2) {
                if let Some(slot) = self.timeslots.get_mut(&pair[0].1) {
                    slot.following = Some(pair[1].1);
                }
            }
        }
    }

    /// Inserts a session from a backend record, resolving its group.
    ///
    /// Re-inserting a known session (a late or repeated bulk response)
    /// refreshes its descriptive fields only; assignment-derived state and
    /// conflict flags are left alone.
    pub fn insert_session(&mut self, record: SessionRecord) -> SessionId {
        let id = record.session_id;
        let group = match record.group_ref() {
            Some(group) => group,
            None => {
                warn!("{} has no group reference, treating it as ungrouped", id);
                GroupRef::new(format!("ungrouped/{}", id.0))
            }
        };

        if let Some(inline) = record.group.clone() {
            self.apply_group_record(inline);
        }

        if let Some(session) = self.sessions.get_mut(&id) {
            debug!("Refreshing already known {}", id);
            session.title = record.title;
            session.attendees = record.attendees;
            session.requested_duration = record.requested_duration;
            session.special_request = record.special_request;
            session.bof = record.bof;
            return id;
        }

        let entry = self.get_or_create_group(&group);
        if !entry.sessions.contains(&id) {
            entry.sessions.push(id);
        }
        self.sessions.insert(
            id,
            Session {
                id,
                title: record.title,
                group,
                requested_duration: record.requested_duration,
                attendees: record.attendees,
                special_request: record.special_request,
                bof: record.bof,
                double_wide: false,
                column_classes: Vec::new(),
                constraints: None,
                conflict: ConflictState::default(),
            },
        );
        id
    }

    /// Stores a session's constraints, once.
    ///
    /// Returns `false` when the session is unknown or its constraints were
    /// already loaded, in which case the records are a stale duplicate.
    /// Self-conflicts and rows that do not concern the session's group are
    /// logged and skipped. Referenced groups and people get placeholders.
    pub fn set_constraints(&mut self, session_id: SessionId, records: Vec<ConstraintRecord>) -> bool {
        let group = match self.sessions.get(&session_id) {
            Some(session) if session.constraints.is_some() => {
                debug!("Ignoring duplicate constraint load for {}", session_id);
                return false;
            }
            Some(session) => session.group.clone(),
            None => {
                warn!("Constraints arrived for unknown {}", session_id);
                return false;
            }
        };

        let mut loaded = SessionConstraints::default();
        for record in records {
            let constraint_id = record.constraint_id;
            let Some(constraint) = record.into_constraint() else {
                warn!("{} has no target, skipping", constraint_id);
                continue;
            };

            if !constraint.kind.is_group_conflict() {
                if let Some(person) = constraint.target_person() {
                    self.get_or_create_person(person);
                    if !loaded.bethere.contains(person) {
                        loaded.bethere.push(person.clone());
                    }
                }
                continue;
            }

            if constraint.is_self_referential() {
                warn!(
                    "{} on {} names {} on both sides, skipping",
                    constraint.id, session_id, constraint.source
                );
                continue;
            }
            let Some(direction) = constraint.direction_for(&group) else {
                warn!(
                    "{} does not involve {} of {}, skipping",
                    constraint.id, group, session_id
                );
                continue;
            };
            let Some(other_group) = constraint.other_group(direction).cloned() else {
                continue;
            };
            self.get_or_create_group(&other_group);
            loaded.conflicts.push(DirectedConstraint {
                id: constraint.id,
                level: constraint.kind.level(),
                direction,
                other_group,
            });
        }

        debug!(
            "{} loaded {} group constraints and {} required attendees",
            session_id,
            loaded.conflicts.len(),
            loaded.bethere.len()
        );
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.constraints = Some(loaded);
        }
        true
    }

    /// Replaces a session's column classes and refreshes its group's index.
    pub fn set_column_classes(&mut self, session_id: SessionId, column_classes: Vec<ColumnClass>) {
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return;
        };
        session.column_classes = column_classes;
        let group = session.group.clone();
        self.refresh_group_index(&group);
    }

    /// Rebuilds the column classes a group occupies from its sessions.
    pub fn refresh_group_index(&mut self, href: &GroupRef) {
        let Some(group) = self.groups.get(href) else {
            return;
        };
        let mut column_classes: Vec<ColumnClass> = group
            .sessions
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .flat_map(|session| session.column_classes.iter().cloned())
            .collect();
        column_classes.sort();
        column_classes.dedup();

        if let Some(group) = self.groups.get_mut(href) {
            group.column_classes = column_classes;
        }
    }
}
