use serde::{Deserialize, Serialize};

use super::ids::{GroupRef, SessionId};
use super::time_slot::{ColumnClass, TimeColumn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub href: GroupRef,
    pub acronym: Option<String>,
    pub name: Option<String>,
    pub parent_area: Option<String>,
    pub loaded: bool,
    pub load_error: bool,
    pub sessions: Vec<SessionId>,
    /// Column classes occupied by any session of this group.
    pub column_classes: Vec<ColumnClass>,
}

impl Group {
    /// A group known only by reference, awaiting its fetch.
    pub fn placeholder(href: GroupRef) -> Self {
        Self {
            href,
            acronym: None,
            name: None,
            parent_area: None,
            loaded: false,
            load_error: false,
            sessions: Vec::new(),
            column_classes: Vec::new(),
        }
    }

    /// Acronym when known, otherwise the last path segment of the href.
    pub fn display_name(&self) -> String {
        if let Some(acronym) = &self.acronym {
            return acronym.clone();
        }
        self.href
            .as_str()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    pub fn occupies(&self, column: &TimeColumn) -> bool {
        self.column_classes.iter().any(|cc| &cc.column == column)
    }
}
