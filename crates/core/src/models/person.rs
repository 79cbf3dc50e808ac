use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::ids::{PersonRef, SessionId};
use super::time_slot::TimeColumn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub href: PersonRef,
    pub name: Option<String>,
    pub loaded: bool,
    pub load_error: bool,
    /// For each time column, the rooms this person must be in and the
    /// sessions requiring them there.
    pub required: BTreeMap<TimeColumn, BTreeMap<String, BTreeSet<SessionId>>>,
}

impl Person {
    pub fn placeholder(href: PersonRef) -> Self {
        Self {
            href,
            name: None,
            loaded: false,
            load_error: false,
            required: BTreeMap::new(),
        }
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .href
                .as_str()
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn require(&mut self, column: TimeColumn, room: &str, session: SessionId) {
        self.required
            .entry(column)
            .or_default()
            .entry(room.to_string())
            .or_default()
            .insert(session);
    }

    /// Drops every requirement recorded for `session`.
    pub fn release(&mut self, session: SessionId) {
        self.required.retain(|_, rooms| {
            rooms.retain(|_, sessions| {
                sessions.remove(&session);
                !sessions.is_empty()
            });
            !rooms.is_empty()
        });
    }

    /// Needed in more than one room at the same time.
    pub fn is_double_booked(&self, column: &TimeColumn) -> bool {
        self.required
            .get(column)
            .is_some_and(|rooms| rooms.len() > 1)
    }
}
