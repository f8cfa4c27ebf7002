//! On-demand partitioning of the host's tab strip.

use super::HostTab;
use crate::tab::TabId;

/// Snapshot of the host's strip taken at the start of a decision
///
/// The active partition is every unpinned, unhidden, non-closing tab; the
/// pinned partition is every pinned, unhidden, non-closing tab.
#[derive(Debug, Clone, Default)]
pub struct TabCollection {
    tabs: Vec<HostTab>,
}

impl TabCollection {
    pub fn new(tabs: Vec<HostTab>) -> Self {
        Self { tabs }
    }

    /// Flag a tab as closing for the rest of this decision
    pub fn mark_closing(&mut self, id: TabId) {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.closing = true;
        }
    }

    pub fn get(&self, id: TabId) -> Option<&HostTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.get(id).is_some()
    }

    /// Index of a tab in the full strip
    pub fn host_index(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn host_tabs(&self) -> &[HostTab] {
        &self.tabs
    }

    pub fn active(&self) -> Vec<TabId> {
        self.filtered(|t| !t.pinned, None)
    }

    pub fn pinned(&self) -> Vec<TabId> {
        self.filtered(|t| t.pinned, None)
    }

    /// The partition `base` belongs to, keeping `base` even while it closes
    ///
    /// Walks outward from a closing tab still need its position.
    pub fn lane_for(&self, base: TabId) -> Vec<TabId> {
        let pinned = self.get(base).is_some_and(|t| t.pinned);
        self.filtered(|t| t.pinned == pinned, Some(base))
    }

    /// Pinned and active tabs except `exclude`
    pub fn candidates(&self, exclude: TabId) -> Vec<TabId> {
        self.filtered(|_| true, None)
            .into_iter()
            .filter(|&id| id != exclude)
            .collect()
    }

    fn filtered(&self, pred: impl Fn(&HostTab) -> bool, keep: Option<TabId>) -> Vec<TabId> {
        self.tabs
            .iter()
            .filter(|t| pred(t) && (Some(t.id) == keep || (!t.hidden && !t.closing)))
            .map(|t| t.id)
            .collect()
    }
}
