//! Typed side-table of tab metadata keyed by stable tab id.

use super::{TabId, TabMeta};
use std::collections::HashMap;

/// Per-window metadata store
///
/// Host tabs carry only their id; everything the engine knows about a tab
/// lives here.
#[derive(Debug, Default, Clone)]
pub struct TabStore {
    tabs: HashMap<TabId, TabMeta>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, meta: TabMeta) -> Option<TabMeta> {
        self.tabs.insert(meta.id, meta)
    }

    pub fn remove(&mut self, id: TabId) -> Option<TabMeta> {
        self.tabs.remove(&id)
    }

    pub fn get(&self, id: TabId) -> Option<&TabMeta> {
        self.tabs.get(&id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut TabMeta> {
        self.tabs.get_mut(&id)
    }

    pub fn get_or_insert_with(
        &mut self,
        id: TabId,
        make: impl FnOnce() -> TabMeta,
    ) -> &mut TabMeta {
        self.tabs.entry(id).or_insert_with(make)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.tabs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabMeta> {
        self.tabs.values()
    }

    /// Ancestor chain of `id`, empty for unknown tabs
    pub fn ancestors(&self, id: TabId) -> &[TabId] {
        self.tabs
            .get(&id)
            .map(|meta| meta.ancestors.as_slice())
            .unwrap_or(&[])
    }

    /// True when `candidate` descends from `base`
    pub fn is_descendant(&self, candidate: TabId, base: TabId) -> bool {
        self.ancestors(candidate).contains(&base)
    }
}
