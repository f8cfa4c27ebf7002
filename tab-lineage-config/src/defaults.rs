//! Default value functions for configuration.
//!
//! Each function backs a `#[serde(default = "crate::defaults::...")]`
//! attribute so that partial config files fill in the same values as
//! `Config::default()`.

use crate::types::{Direction, FamilyRule, OpenPosition, Reach, Relation, SelectPosition};

/// Smallest suspension delay honoured by the scheduler
pub const MIN_SUSPEND_DELAY_MS: u64 = 100;

/// Smallest selection-commit poll interval
pub const MIN_COMMIT_DELAY_MS: u64 = 10;

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_false() -> bool {
    false
}

pub fn bool_true() -> bool {
    true
}

// ── Placement ──────────────────────────────────────────────────────────────

pub fn open_linked() -> OpenPosition {
    OpenPosition::NextIncrementDescendant
}

pub fn open_unlinked() -> OpenPosition {
    OpenPosition::LastEnd
}

pub fn open_duplicate() -> OpenPosition {
    OpenPosition::NextAdjacent
}

pub fn open_undo_close() -> OpenPosition {
    OpenPosition::Default
}

pub fn select_unpinned() -> Vec<SelectPosition> {
    vec![
        SelectPosition::Family(FamilyRule::new(
            Direction::Next,
            Reach::Adjacent,
            true,
            Relation::Descendant,
        )),
        SelectPosition::Family(FamilyRule::new(
            Direction::Prev,
            Reach::Adjacent,
            false,
            Relation::Ancestor,
        )),
        SelectPosition::AnywhereOpener,
        SelectPosition::AnywherePrevSelected,
        SelectPosition::FirstEnd,
    ]
}

pub fn select_pinned() -> Vec<SelectPosition> {
    vec![SelectPosition::AnywherePrevSelected]
}

// ── Timers ─────────────────────────────────────────────────────────────────

pub fn suspend_delay_ms() -> u64 {
    MIN_SUSPEND_DELAY_MS
}

pub fn commit_delay_ms() -> u64 {
    250
}
