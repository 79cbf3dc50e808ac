use std::collections::BTreeSet;

use agenda_core::models::{ids::SessionId, time_slot::ColumnClass};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{evaluator, store::EntityStore};

/// Broadcast after a recompute: "conflicts changed, please redraw".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictsChanged {
    pub revision: u64,
    pub sessions: Vec<SessionId>,
}

/// Sessions whose conflict state can change when `moved` goes from
/// `old` to `new`: the mover itself and anyone sharing an old or new time
/// column with it.
pub fn affected_sessions(
    store: &EntityStore,
    moved: SessionId,
    old: &[ColumnClass],
    new: &[ColumnClass],
) -> BTreeSet<SessionId> {
    let touched: Vec<ColumnClass> = old.iter().chain(new.iter()).cloned().collect();

    let mut affected: BTreeSet<SessionId> = store
        .sessions()
        .filter(|session| session.shares_column_with(&touched))
        .map(|session| session.id)
        .collect();
    affected.insert(moved);
    affected
}

/// Re-evaluates exactly the sessions a change can affect and returns them.
pub fn propagate(
    store: &mut EntityStore,
    moved: SessionId,
    old: &[ColumnClass],
    new: &[ColumnClass],
) -> BTreeSet<SessionId> {
    let affected = affected_sessions(store, moved, old, new);
    debug!(
        "{} changed columns, recomputing {} sessions",
        moved,
        affected.len()
    );
    evaluator::recompute(store, &affected);
    affected
}

/// Revision counter plus the redraw channel.
#[derive(Debug)]
pub struct ConflictNotifier {
    sender: broadcast::Sender<ConflictsChanged>,
    revision: u64,
}

impl ConflictNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, revision: 0 }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConflictsChanged> {
        self.sender.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumps the revision and tells subscribers which sessions to redraw.
    /// Redrawing an unchanged session is harmless, so no diffing happens.
    pub fn notify(&mut self, sessions: &BTreeSet<SessionId>) -> u64 {
        self.revision += 1;
        let event = ConflictsChanged {
            revision: self.revision,
            sessions: sessions.iter().copied().collect(),
        };
        // No subscribers is fine; the revision still advances.
        let _ = self.sender.send(event);
        self.revision
    }
}

impl Default for ConflictNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}
