//! Tab lineage bookkeeping for a single browser window
//!
//! This module provides the core engine including:
//! - `TabMeta`: the per-tab side-table entry (open parameters, ancestry,
//!   selection/read times, suspension state)
//! - `TabLifecycleManager`: owns the side-table and wires host events to
//!   genealogy, placement, selection, suspension and read-state tracking
//! - `TabId`: stable identity of a tab, equal to its open time

pub mod genealogy;
pub mod ids;
mod manager;
pub mod placement;
pub mod read_state;
pub mod selection;
pub mod store;
mod suspension;
mod tasks;
pub mod window_move;

pub use genealogy::{OpenReason, OpenRequest};
pub use manager::{EventOutcome, TabLifecycleManager};
pub use read_state::SelectedTimes;
pub use selection::SelectOutcome;
pub use store::TabStore;
pub use window_move::{DocShellSwap, MovePayload, SwapOutcome};

use crate::clock::Millis;
use crate::host::RestoredTab;
use serde::{Deserialize, Serialize};

/// Unique identifier for a tab; doubles as its open time in milliseconds
pub type TabId = u64;

/// Parameters a tab was opened with
///
/// Captured once at creation. The only later rewrite happens when a tab is
/// promoted to a startup tab.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub url: String,
    #[serde(default)]
    pub load_flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub related_to_current: bool,
    /// Referrer inferred from history when none was given explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_visit: Option<String>,
}

impl OpenInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Explicit referrer, or the one inferred from history
    pub fn effective_referrer(&self) -> Option<&str> {
        self.referrer_url
            .as_deref()
            .or(self.from_visit.as_deref())
    }
}

/// Side-table entry for one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabMeta {
    /// Open time; also the tab's identity
    pub id: TabId,
    pub open_info: OpenInfo,
    /// Opener lineage, nearest parent first; never contains `id`
    pub ancestors: Vec<TabId>,
    pub select_time: Option<Millis>,
    pub read_time: Option<Millis>,
    pub read: bool,
    /// True only while this engine has deliberately stopped the tab's load
    pub suspended: bool,
}

impl TabMeta {
    pub fn new(id: TabId, open_info: OpenInfo) -> Self {
        Self {
            id,
            open_info,
            ancestors: Vec::new(),
            select_time: None,
            read_time: None,
            read: false,
            suspended: false,
        }
    }

    /// Open time of the tab
    pub fn open_time(&self) -> Millis {
        self.id
    }

    /// Immediate opener, if any
    pub fn parent(&self) -> Option<TabId> {
        self.ancestors.first().copied()
    }

    /// Ancestor chain a child of this tab inherits: this tab first, then its own ancestors
    pub fn lineage_for_child(&self) -> Vec<TabId> {
        std::iter::once(self.id)
            .chain(self.ancestors.iter().copied())
            .collect()
    }

    /// True when `other` appears anywhere in this tab's ancestor chain
    pub fn descends_from(&self, other: TabId) -> bool {
        self.ancestors.contains(&other)
    }
}

/// How a restored tab came back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreKind {
    /// Copy of a live tab; the original becomes the parent
    Duplicate { original: TabId },
    /// Reopened from the closed-tab archive
    UndoClose { previously_selected: Option<TabId> },
    /// Rebuilt from persisted attributes at startup
    Session,
}

/// Host lifecycle events
#[derive(Debug, Clone)]
pub enum TabEvent {
    Open(OpenRequest),
    Select(TabId),
    Close(TabId),
    Restored { tab: RestoredTab, kind: RestoreKind },
    PromoteToWindow(TabId),
    SwapDocshells(DocShellSwap),
}

/// Messages sent back to the event loop by engine-spawned tasks
///
/// Every message carries the ticket of the task that produced it; a message
/// whose ticket is no longer current is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    SuspendTimerFired {
        tab: TabId,
        ticket: u64,
    },
    SelectionPoll {
        tab: TabId,
        ticket: u64,
    },
    ReferrerResolved {
        tab: TabId,
        ticket: u64,
        referrer: Option<String>,
    },
    TitleResolved {
        tab: TabId,
        ticket: u64,
        title: Option<String>,
    },
}
