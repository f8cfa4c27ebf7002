//! In-memory tab container
//!
//! A complete [`TabHost`] without a browser behind it. Used by the replay
//! command and the test suite; it records every load it was asked to stop or
//! start so callers can inspect what the engine did.

use super::{HostTab, RestoredTab, TabHost};
use crate::session::attributes::{self, TabAttributes};
use crate::session::{ClosedArchive, ClosedTab};
use crate::tab::{OpenInfo, TabId};

/// Closed tabs remembered by default
const DEFAULT_ARCHIVE_LIMIT: usize = 25;

/// One tab held by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTab {
    pub id: TabId,
    pub url: String,
    pub label: String,
    pub pinned: bool,
    pub hidden: bool,
    pub busy: bool,
    pub blank: bool,
    pub attributes: TabAttributes,
}

impl MemoryTab {
    fn new(id: TabId, url: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            label: url.to_string(),
            pinned: false,
            hidden: false,
            busy: true,
            blank: false,
            attributes: TabAttributes::new(),
        }
    }

    fn host_view(&self) -> HostTab {
        HostTab {
            id: self.id,
            pinned: self.pinned,
            hidden: self.hidden,
            closing: false,
            busy: self.busy,
            blank: self.blank,
        }
    }
}

/// In-memory tab strip for a single window
#[derive(Debug, Clone)]
pub struct MemoryHost {
    tabs: Vec<MemoryTab>,
    selected: Option<TabId>,
    archive: ClosedArchive,
    archive_limit: usize,
    /// Tabs whose load was stopped, in order
    pub stopped: Vec<TabId>,
    /// Loads issued through `load_with_info`, in order
    pub loads: Vec<(TabId, OpenInfo)>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            selected: None,
            archive: ClosedArchive::new(),
            archive_limit: DEFAULT_ARCHIVE_LIMIT,
            stopped: Vec::new(),
            loads: Vec::new(),
        }
    }

    pub fn with_archive_limit(mut self, limit: usize) -> Self {
        self.archive_limit = limit;
        self
    }

    /// Ids in strip order
    pub fn order(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    pub fn tab(&self, id: TabId) -> Option<&MemoryTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut MemoryTab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn set_busy(&mut self, id: TabId, busy: bool) {
        if let Some(tab) = self.tab_mut(id) {
            tab.busy = busy;
        }
    }

    pub fn set_blank(&mut self, id: TabId, blank: bool) {
        if let Some(tab) = self.tab_mut(id) {
            tab.blank = blank;
        }
    }

    pub fn set_pinned(&mut self, id: TabId, pinned: bool) {
        if let Some(tab) = self.tab_mut(id) {
            tab.pinned = pinned;
        }
    }

    pub fn set_hidden(&mut self, id: TabId, hidden: bool) {
        if let Some(tab) = self.tab_mut(id) {
            tab.hidden = hidden;
        }
    }

    /// Mark every tab as finished loading
    pub fn finish_all_loads(&mut self) {
        for tab in &mut self.tabs {
            tab.busy = false;
        }
    }

    /// Archive a tab directly, as a previous session would have
    pub fn archive_closed(&mut self, entry: ClosedTab) {
        self.archive.record(entry, self.archive_limit);
    }
}

impl TabHost for MemoryHost {
    fn tabs(&self) -> Vec<HostTab> {
        self.tabs.iter().map(MemoryTab::host_view).collect()
    }

    fn selected_tab(&self) -> Option<TabId> {
        self.selected
    }

    fn add_tab(&mut self, id: TabId, info: &OpenInfo, _background: bool) {
        self.tabs.push(MemoryTab::new(id, &info.url));
        log::debug!("Host added tab {} (total: {})", id, self.tabs.len());
    }

    fn duplicate_tab(&mut self, original: TabId, id: TabId) {
        let Some(source_idx) = self.tabs.iter().position(|t| t.id == original) else {
            log::warn!("Host cannot duplicate missing tab {}", original);
            return;
        };
        let mut tab = self.tabs[source_idx].clone();
        tab.id = id;
        tab.busy = true;
        tab.blank = false;
        self.tabs.insert(source_idx + 1, tab);
    }

    fn remove_tab(&mut self, id: TabId, attributes: TabAttributes) {
        let Some(idx) = self.tabs.iter().position(|t| t.id == id) else {
            return;
        };
        log::debug!("Host closing tab {} (index {})", id, idx);
        self.tabs.remove(idx);

        if self.selected == Some(id) {
            self.selected = if self.tabs.is_empty() {
                None
            } else {
                // Prefer the tab at the same index (or previous if at end)
                let new_idx = idx.min(self.tabs.len().saturating_sub(1));
                Some(self.tabs[new_idx].id)
            };
        }

        let select_time = attributes
            .get(attributes::ATTR_SELECT_TIME)
            .and_then(|value| value.parse().ok());
        self.archive.record(
            ClosedTab {
                id,
                select_time,
                attributes,
            },
            self.archive_limit,
        );
    }

    fn move_tab_to(&mut self, id: TabId, index: usize) {
        let Some(current_idx) = self.tabs.iter().position(|t| t.id == id) else {
            return;
        };
        let clamped_target = index.min(self.tabs.len().saturating_sub(1));
        if clamped_target == current_idx {
            return;
        }
        let tab = self.tabs.remove(current_idx);
        self.tabs.insert(clamped_target, tab);
        log::debug!(
            "Host moved tab {} from index {} to {}",
            id,
            current_idx,
            clamped_target
        );
    }

    fn select_tab(&mut self, id: TabId) {
        if self.tabs.iter().any(|t| t.id == id) {
            self.selected = Some(id);
        }
    }

    fn stop_load(&mut self, id: TabId) {
        if let Some(tab) = self.tab_mut(id) {
            tab.busy = false;
            self.stopped.push(id);
        }
    }

    fn load_with_info(&mut self, id: TabId, info: &OpenInfo) {
        if let Some(tab) = self.tab_mut(id) {
            tab.url = info.url.clone();
            tab.busy = true;
            tab.blank = false;
            self.loads.push((id, info.clone()));
        }
    }

    fn set_label(&mut self, id: TabId, label: &str) {
        if let Some(tab) = self.tab_mut(id) {
            tab.label = label.to_string();
        }
    }

    fn write_attributes(&mut self, id: TabId, attributes: &TabAttributes) {
        if let Some(tab) = self.tab_mut(id) {
            tab.attributes = attributes.clone();
        }
    }

    fn closed_archive(&self) -> &ClosedArchive {
        &self.archive
    }

    fn restore_closed(&mut self, id: TabId) -> Option<RestoredTab> {
        let entry = self.archive.take(id)?;
        let url = attributes::decode(&entry.attributes)
            .map(|meta| meta.open_info.url)
            .unwrap_or_else(|_| "about:blank".to_string());
        let mut tab = MemoryTab::new(entry.id, &url);
        tab.attributes = entry.attributes.clone();
        self.tabs.push(tab);
        Some(RestoredTab {
            id: entry.id,
            attributes: entry.attributes,
        })
    }
}
