//! Placement, selection and suspension policy sections.

use super::position::{OpenPosition, SelectPosition};
use serde::{Deserialize, Serialize};

// ============================================================================
// Placement
// ============================================================================

/// Insertion policy, one value per kind of open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPolicy {
    /// Tabs opened related to the current tab (links, "open in new tab")
    #[serde(default = "crate::defaults::open_linked")]
    pub linked: OpenPosition,
    /// Tabs opened independently (new blank tab, external URL)
    #[serde(default = "crate::defaults::open_unlinked")]
    pub unlinked: OpenPosition,
    /// Duplicated tabs, placed relative to the original
    #[serde(default = "crate::defaults::open_duplicate")]
    pub duplicate: OpenPosition,
    /// Tabs brought back by undo-close, placed relative to the previously selected tab
    #[serde(default = "crate::defaults::open_undo_close")]
    pub undo_close: OpenPosition,
}

impl Default for OpenPolicy {
    fn default() -> Self {
        Self {
            linked: crate::defaults::open_linked(),
            unlinked: crate::defaults::open_unlinked(),
            duplicate: crate::defaults::open_duplicate(),
            undo_close: crate::defaults::open_undo_close(),
        }
    }
}

/// Close-time selection policy
///
/// Each list is tried in order; the first entry producing a tab wins. When
/// every entry comes up empty the host's own choice stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectPolicy {
    /// Used when the closing tab is not pinned
    #[serde(default = "crate::defaults::select_unpinned")]
    pub unpinned: Vec<SelectPosition>,
    /// Used when the closing tab is pinned
    #[serde(default = "crate::defaults::select_pinned")]
    pub pinned: Vec<SelectPosition>,
    /// Allow opener / previously-selected lookups to fall back to the closed-tab archive
    #[serde(default = "crate::defaults::bool_false")]
    pub undo_close: bool,
    /// Accept the most recently selected tab even when it was not the one
    /// selected immediately before the closing tab
    #[serde(default = "crate::defaults::bool_true")]
    pub trace_back: bool,
    /// Consider pinned tabs for `anywhere_oldest_unread`
    #[serde(default = "crate::defaults::bool_false")]
    pub include_pinned_unread: bool,
}

impl Default for SelectPolicy {
    fn default() -> Self {
        Self {
            unpinned: crate::defaults::select_unpinned(),
            pinned: crate::defaults::select_pinned(),
            undo_close: false,
            trace_back: true,
            include_pinned_unread: false,
        }
    }
}

impl SelectPolicy {
    /// The policy list that applies to a closing tab
    pub fn list_for(&self, pinned: bool) -> &[SelectPosition] {
        if pinned { &self.pinned } else { &self.unpinned }
    }
}

/// Placement section of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlacementConfig {
    #[serde(default)]
    pub open: OpenPolicy,
    #[serde(default)]
    pub select_on_close: SelectPolicy,
}

// ============================================================================
// Suspension
// ============================================================================

/// Background-tab load suspension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionConfig {
    /// Stop the network load of tabs opened in the background
    #[serde(default = "crate::defaults::bool_true")]
    pub enabled: bool,
    /// Delay before a background tab's load is stopped (floor: `MIN_SUSPEND_DELAY_MS`)
    #[serde(default = "crate::defaults::suspend_delay_ms")]
    pub delay_ms: u64,
    /// Resume suspended neighbours of a tab when it is selected
    #[serde(default = "crate::defaults::bool_false")]
    pub preload_adjacent: bool,
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: crate::defaults::suspend_delay_ms(),
            preload_adjacent: false,
        }
    }
}

impl SuspensionConfig {
    /// Delay actually used for timers.
    ///
    /// Very small delays cannot reliably preempt the host's own load start.
    pub fn effective_delay_ms(&self) -> u64 {
        self.delay_ms.max(crate::defaults::MIN_SUSPEND_DELAY_MS)
    }
}

// ============================================================================
// Selection commit
// ============================================================================

/// Selection/read-state commit polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Interval of the poll that commits a selection once loading settles
    #[serde(default = "crate::defaults::commit_delay_ms")]
    pub commit_delay_ms: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            commit_delay_ms: crate::defaults::commit_delay_ms(),
        }
    }
}

impl SelectionConfig {
    pub fn effective_commit_delay_ms(&self) -> u64 {
        self.commit_delay_ms.max(crate::defaults::MIN_COMMIT_DELAY_MS)
    }
}
