//! Session-facing state: persisted tab attributes and the closed-tab archive
//!
//! The archive is owned by the host; the engine only reads it to resolve
//! undo-close fallbacks in close-time selection.

pub mod attributes;
pub mod storage;

pub use attributes::TabAttributes;

use crate::clock::Millis;
use crate::tab::TabId;
use serde::{Deserialize, Serialize};

/// A closed tab as remembered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedTab {
    pub id: TabId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_time: Option<Millis>,
    pub attributes: TabAttributes,
}

/// Most-recent-first list of closed tabs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedArchive {
    entries: Vec<ClosedTab>,
}

impl ClosedArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a closed tab as the most recent entry, keeping at most `limit`
    pub fn record(&mut self, entry: ClosedTab, limit: usize) {
        self.entries.insert(0, entry);
        self.entries.truncate(limit);
    }

    /// Remove and return the entry for `id`
    pub fn take(&mut self, id: TabId) -> Option<ClosedTab> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn find_by_id(&self, id: TabId) -> Option<&ClosedTab> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Most recent entry selected at exactly `time`
    pub fn find_by_select_time(&self, time: Millis) -> Option<&ClosedTab> {
        self.entries
            .iter()
            .find(|entry| entry.select_time == Some(time))
    }

    pub fn most_recent(&self) -> Option<&ClosedTab> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[ClosedTab] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
