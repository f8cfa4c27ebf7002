//! Monotonic tab id allocation.
//!
//! A tab's id is its open time. Ids are drawn from the wall clock so they stay
//! ahead of ids persisted by earlier runs, and are bumped by one whenever two
//! allocations land on the same clock tick (or the clock steps backwards).

use super::TabId;
use crate::clock::Clock;
use std::sync::Arc;

/// The only id source in the engine
pub struct IdSource {
    clock: Arc<dyn Clock>,
    last: TabId,
}

impl IdSource {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, last: 0 }
    }

    /// Allocate the next id; strictly greater than every id seen so far
    pub fn next_id(&mut self) -> TabId {
        let now = self.clock.now_millis();
        let id = if now > self.last { now } else { self.last + 1 };
        self.last = id;
        id
    }

    /// Record an id that entered the window from elsewhere (session restore,
    /// undo-close) so later allocations stay above it
    pub fn observe(&mut self, id: TabId) {
        self.last = self.last.max(id);
    }

    /// Most recently allocated or observed id
    pub fn last(&self) -> TabId {
        self.last
    }
}
