use serde::{Deserialize, Serialize};

use super::ids::SessionId;
use super::time_slot::TimeColumn;

/// Displayed severity of a session's group conflicts.
///
/// Ordered so that `max` picks the most severe tier: a tier 1 "conflict"
/// constraint maps to `Strong`, tier 2 to `Normal`, tier 3 to `Weak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictLevel {
    #[default]
    None,
    Weak,
    Normal,
    Strong,
}

impl ConflictLevel {
    /// Tier number shown to operators, 1 being the most severe.
    pub fn tier(self) -> Option<u8> {
        match self {
            ConflictLevel::Strong => Some(1),
            ConflictLevel::Normal => Some(2),
            ConflictLevel::Weak => Some(3),
            ConflictLevel::None => None,
        }
    }
}

/// Direction of a constraint relative to the session being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Declared by our group against another.
    Ours,
    /// Declared by another group against ours.
    Theirs,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Ours => Direction::Theirs,
            Direction::Theirs => Direction::Ours,
        }
    }
}

/// One observed clash between a session and a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictHit {
    pub peer: SessionId,
    pub direction: Direction,
    pub level: ConflictLevel,
    pub column: TimeColumn,
}

impl ConflictHit {
    /// The same clash as recorded on the peer, pointing back at `origin`.
    pub fn seen_from(&self, origin: SessionId) -> Self {
        Self {
            peer: origin,
            direction: self.direction.reversed(),
            level: self.level,
            column: self.column,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictState {
    pub conflicted: bool,
    pub ours: ConflictLevel,
    pub theirs: ConflictLevel,
    pub person_conflicted: bool,
    pub hits: Vec<ConflictHit>,
}

impl ConflictState {
    /// Records a hit. A lower tier never downgrades an already recorded
    /// higher one in the same direction.
    pub fn record(&mut self, hit: ConflictHit) {
        self.conflicted = true;
        let slot = match hit.direction {
            Direction::Ours => &mut self.ours,
            Direction::Theirs => &mut self.theirs,
        };
        *slot = (*slot).max(hit.level);
        if !self.hits.contains(&hit) {
            self.hits.push(hit);
        }
    }

    /// Highest severity across both directions.
    pub fn level(&self) -> ConflictLevel {
        self.ours.max(self.theirs)
    }

    pub fn clear_group_conflicts(&mut self) {
        self.conflicted = false;
        self.ours = ConflictLevel::None;
        self.theirs = ConflictLevel::None;
        self.hits.clear();
    }

    pub fn clear(&mut self) {
        self.clear_group_conflicts();
        self.person_conflicted = false;
    }
}
