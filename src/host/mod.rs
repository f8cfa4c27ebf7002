//! Host tab container interface
//!
//! The engine attaches metadata to tabs it does not own. Everything it needs
//! from the browser's tab strip goes through [`TabHost`]; lookups that need
//! history go through [`history::HistoryProvider`].
//!
//! Actions the engine initiates (selecting, moving, restoring) are handled by
//! the engine inline. Hosts must not re-deliver them as lifecycle events.

mod collection;
pub mod history;
mod memory;

pub use collection::TabCollection;
pub use history::{HistoryProvider, LookupFuture, NoHistory, StaticHistory};
pub use memory::{MemoryHost, MemoryTab};

use crate::session::{ClosedArchive, TabAttributes};
use crate::tab::{OpenInfo, TabId};

/// Host-side view of one tab, in strip order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostTab {
    pub id: TabId,
    pub pinned: bool,
    pub hidden: bool,
    /// Being removed; never a selection candidate
    pub closing: bool,
    /// Network load in progress
    pub busy: bool,
    /// Showing a blank placeholder while waiting to navigate
    pub blank: bool,
}

impl HostTab {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// A tab the host brought back together with its attribute store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredTab {
    pub id: TabId,
    pub attributes: TabAttributes,
}

/// Browser tab container for one window
pub trait TabHost {
    /// All tabs in strip order
    fn tabs(&self) -> Vec<HostTab>;

    /// Currently selected tab
    fn selected_tab(&self) -> Option<TabId>;

    /// Create a tab bound to `id` and start loading `info`
    fn add_tab(&mut self, id: TabId, info: &OpenInfo, background: bool);

    /// Create a copy of `original` bound to `id`, placed after the original
    fn duplicate_tab(&mut self, original: TabId, id: TabId);

    /// Remove a tab, archiving it with its final attribute store
    fn remove_tab(&mut self, id: TabId, attributes: TabAttributes);

    /// Move a tab so that it ends up at `index` of the full strip
    fn move_tab_to(&mut self, id: TabId, index: usize);

    fn select_tab(&mut self, id: TabId);

    /// Abort the tab's network load
    fn stop_load(&mut self, id: TabId);

    /// Load `info` into the tab, honouring its flags, referrer and charset
    fn load_with_info(&mut self, id: TabId, info: &OpenInfo);

    /// Replace the tab's label
    fn set_label(&mut self, id: TabId, label: &str);

    /// Persist the engine's attributes for a tab
    fn write_attributes(&mut self, id: TabId, attributes: &TabAttributes);

    /// Closed-tab archive, most recent first
    fn closed_archive(&self) -> &ClosedArchive;

    /// Reopen an archived tab at the end of the strip
    fn restore_closed(&mut self, id: TabId) -> Option<RestoredTab>;
}
