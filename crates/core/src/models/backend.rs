//! Records exchanged with the scheduling backend.
//!
//! Booleans arrive in several spellings (`true`, `"True"`, `"1"`, ...) and are
//! normalised here, once, through [`loose_bool`]. Times accept `HH:MM`,
//! `HH:MM:SS` and the compact `HHMM` form.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::constraint::{Constraint, ConstraintKind, ConstraintTarget};
use super::ids::{ConstraintId, GroupRef, PersonRef, RemoteAssignmentId, SessionId, TimeSlotId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotRecord {
    pub timeslot_id: TimeSlotId,
    pub room: String,
    pub date: NaiveDate,
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub domid: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default, deserialize_with = "loose_bool::deserialize")]
    pub unscheduled_box: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub href: GroupRef,
    #[serde(default)]
    pub acronym: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub href: PersonRef,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub title: String,
    /// Inline, fully populated group.
    #[serde(default)]
    pub group: Option<GroupRecord>,
    /// Group known only by reference.
    #[serde(default)]
    pub group_href: Option<GroupRef>,
    #[serde(default)]
    pub attendees: Option<u32>,
    #[serde(default)]
    pub requested_duration: Option<u32>,
    #[serde(default, deserialize_with = "loose_bool::deserialize")]
    pub special_request: bool,
    #[serde(default, deserialize_with = "loose_bool::deserialize")]
    pub bof: bool,
}

impl SessionRecord {
    pub fn group_ref(&self) -> Option<GroupRef> {
        self.group
            .as_ref()
            .map(|group| group.href.clone())
            .or_else(|| self.group_href.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub assignment_id: RemoteAssignmentId,
    pub session_id: SessionId,
    pub timeslot_id: TimeSlotId,
    #[serde(default)]
    pub extendedfrom_id: Option<RemoteAssignmentId>,
    #[serde(default, deserialize_with = "loose_bool::deserialize")]
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub constraint_id: ConstraintId,
    pub name: ConstraintKind,
    pub source_href: GroupRef,
    #[serde(default)]
    pub target_href: Option<GroupRef>,
    #[serde(default)]
    pub person_href: Option<PersonRef>,
}

impl ConstraintRecord {
    /// Converts to a domain constraint. Returns `None` when the row names
    /// neither a target group nor a person.
    pub fn into_constraint(self) -> Option<Constraint> {
        let target = match (self.name, self.target_href, self.person_href) {
            (ConstraintKind::BeThere, _, Some(person)) => ConstraintTarget::Person(person),
            (ConstraintKind::BeThere, _, None) => return None,
            (_, Some(group), _) => ConstraintTarget::Group(group),
            (_, None, _) => return None,
        };
        Some(Constraint {
            id: self.constraint_id,
            kind: self.name,
            source: self.source_href,
            target,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub session_id: SessionId,
    pub timeslot_id: TimeSlotId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extendedfrom_id: Option<RemoteAssignmentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub pinned: bool,
}

/// Lenient boolean decoding for backend payloads.
pub mod loose_bool {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LooseBoolVisitor)
    }

    struct LooseBoolVisitor;

    impl<'de> Visitor<'de> for LooseBoolVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean, 0/1, or a \"True\"/\"False\" string")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Signed(value), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim() {
                "true" | "True" | "TRUE" | "1" | "yes" => Ok(true),
                "false" | "False" | "FALSE" | "0" | "no" | "None" | "" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<bool, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(LooseBoolVisitor)
        }
    }
}

/// Slot start times: `HH:MM`, `HH:MM:SS`, or `HHMM`.
pub mod slot_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid slot time: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H%M"))
            .ok()
    }
}
