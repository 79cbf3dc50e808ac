use serde::{Deserialize, Serialize};

use super::conflict::{ConflictLevel, Direction};
use super::ids::{ConstraintId, GroupRef, PersonRef};

/// Constraint type tag as the backend names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Tier 1, a full conflict.
    #[serde(rename = "conflict")]
    Conflict,
    /// Tier 2.
    #[serde(rename = "conflic2")]
    Conflic2,
    /// Tier 3.
    #[serde(rename = "conflic3")]
    Conflic3,
    /// A person must be able to attend.
    #[serde(rename = "bethere")]
    BeThere,
}

impl ConstraintKind {
    pub fn is_group_conflict(self) -> bool {
        !matches!(self, ConstraintKind::BeThere)
    }

    pub fn level(self) -> ConflictLevel {
        match self {
            ConstraintKind::Conflict => ConflictLevel::Strong,
            ConstraintKind::Conflic2 => ConflictLevel::Normal,
            ConstraintKind::Conflic3 => ConflictLevel::Weak,
            ConstraintKind::BeThere => ConflictLevel::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintTarget {
    Group(GroupRef),
    Person(PersonRef),
}

/// An immutable constraint row, as loaded for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub kind: ConstraintKind,
    pub source: GroupRef,
    pub target: ConstraintTarget,
}

impl Constraint {
    pub fn target_group(&self) -> Option<&GroupRef> {
        match &self.target {
            ConstraintTarget::Group(group) => Some(group),
            ConstraintTarget::Person(_) => None,
        }
    }

    pub fn target_person(&self) -> Option<&PersonRef> {
        match &self.target {
            ConstraintTarget::Person(person) => Some(person),
            ConstraintTarget::Group(_) => None,
        }
    }

    /// Which way this constraint points as seen from `group`.
    pub fn direction_for(&self, group: &GroupRef) -> Option<Direction> {
        if &self.source == group {
            Some(Direction::Ours)
        } else if self.target_group() == Some(group) {
            Some(Direction::Theirs)
        } else {
            None
        }
    }

    /// The group on the far side of the constraint for the given direction.
    pub fn other_group(&self, direction: Direction) -> Option<&GroupRef> {
        match direction {
            Direction::Ours => self.target_group(),
            Direction::Theirs => Some(&self.source),
        }
    }

    pub fn is_self_referential(&self) -> bool {
        self.target_group() == Some(&self.source)
    }
}

/// A group conflict constraint, pre-classified for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedConstraint {
    pub id: ConstraintId,
    pub level: ConflictLevel,
    pub direction: Direction,
    pub other_group: GroupRef,
}

/// Constraints loaded for one session, split by use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConstraints {
    pub conflicts: Vec<DirectedConstraint>,
    pub bethere: Vec<PersonRef>,
}

impl SessionConstraints {
    pub fn in_direction(&self, direction: Direction) -> impl Iterator<Item = &DirectedConstraint> {
        self.conflicts.iter().filter(move |c| c.direction == direction)
    }
}
