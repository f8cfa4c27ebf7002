//! Genealogy tracking: open parameters, ancestor chains and referrer inference.
//!
//! Ancestor chains are only ever built by prepending a parent's id to the
//! parent's own chain, so a chain can never contain its own tab.

use super::manager::TabLifecycleManager;
use super::{EngineMessage, OpenInfo, TabId, TabMeta};
use crate::error::{LineageError, Result};
use crate::host::TabHost;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a tab's metadata is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    NewTab,
    DuplicatedTab,
    StartupTab,
}

impl fmt::Display for OpenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpenReason::NewTab => "new",
            OpenReason::DuplicatedTab => "duplicate",
            OpenReason::StartupTab => "startup",
        })
    }
}

impl OpenReason {
    /// Ancestor chain for a tab recorded for this reason
    ///
    /// `base` is the selected tab for a new tab and the original for a
    /// duplicate. Startup tabs start a fresh tree.
    pub fn ancestors(self, related_to_current: bool, base: Option<&TabMeta>) -> Vec<TabId> {
        match self {
            OpenReason::NewTab => ancestors_for_new_tab(related_to_current, base),
            OpenReason::DuplicatedTab => base.map(TabMeta::lineage_for_child).unwrap_or_default(),
            OpenReason::StartupTab => Vec::new(),
        }
    }
}

/// Parameters of an open call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpenRequest {
    pub url: String,
    #[serde(default)]
    pub load_flags: u32,
    #[serde(default)]
    pub referrer_url: Option<String>,
    #[serde(default)]
    pub charset: Option<String>,
    /// Opened from the currently selected tab
    #[serde(default)]
    pub related_to_current: bool,
    /// Leave the current selection alone
    #[serde(default)]
    pub background: bool,
}

impl OpenRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn related(mut self) -> Self {
        self.related_to_current = true;
        self
    }

    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer_url = Some(referrer.into());
        self
    }

    pub fn with_load_flags(mut self, flags: u32) -> Self {
        self.load_flags = flags;
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Parse into the immutable `openInfo` record
    pub fn open_info(&self) -> Result<OpenInfo> {
        if self.url.trim().is_empty() {
            return Err(LineageError::MissingOpenParameter("url"));
        }
        Ok(OpenInfo {
            url: self.url.clone(),
            load_flags: self.load_flags,
            referrer_url: self.referrer_url.clone(),
            charset: self.charset.clone(),
            related_to_current: self.related_to_current,
            from_visit: None,
        })
    }
}

/// Ancestors of a tab opened while `selected` is the current tab
pub fn ancestors_for_new_tab(related_to_current: bool, selected: Option<&TabMeta>) -> Vec<TabId> {
    match selected {
        Some(parent) if related_to_current => parent.lineage_for_child(),
        _ => Vec::new(),
    }
}

/// Make `original` the parent of its duplicate `copy`
pub fn rewrite_for_duplicate(copy: &mut TabMeta, original: &TabMeta) {
    copy.ancestors = OpenReason::DuplicatedTab.ancestors(true, Some(original));
    copy.ancestors.retain(|&id| id != copy.id);
}

/// Whether a referrer should be looked up in history for this open
pub fn wants_referrer_lookup(info: &OpenInfo) -> bool {
    info.referrer_url.is_none() && (info.related_to_current || is_http(&info.url))
}

fn is_http(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl TabLifecycleManager {
    /// Record a freshly created tab
    ///
    /// `base` is the tab that was current when the open was requested, or
    /// the original when recording a duplicate.
    pub(super) fn record_open(
        &mut self,
        id: TabId,
        info: OpenInfo,
        reason: OpenReason,
        base: Option<TabId>,
    ) {
        let mut ancestors =
            reason.ancestors(info.related_to_current, base.and_then(|b| self.store.get(b)));
        ancestors.retain(|&ancestor| ancestor != id);
        let lookup = reason == OpenReason::NewTab && wants_referrer_lookup(&info);
        let url = info.url.clone();

        let mut meta = TabMeta::new(id, info);
        meta.ancestors = ancestors;
        log::debug!(
            "Recorded {} tab {} (ancestors: {:?})",
            reason,
            id,
            meta.ancestors
        );
        self.store.insert(meta);

        if lookup {
            self.spawn_referrer_lookup(id, url);
        }
    }

    /// Replace a tab's open parameters with the page it currently shows and
    /// cut it loose from its opener
    pub fn promote_to_startup_tab(
        &mut self,
        host: &mut dyn TabHost,
        id: TabId,
        url: &str,
    ) -> Result<()> {
        let meta = self.store.get_mut(id).ok_or(LineageError::UnknownTab(id))?;
        meta.open_info = OpenInfo::new(url);
        meta.ancestors.clear();
        log::info!("Tab {} promoted to startup tab ({})", id, url);
        self.persist(host, id);
        Ok(())
    }

    fn spawn_referrer_lookup(&mut self, tab: TabId, url: String) {
        let ticket = self.next_ticket();
        let lookup = self.history.find_referrer(&url);
        let messages = self.messages.clone();
        let handle = self.runtime.spawn(async move {
            let referrer = match lookup.await {
                Ok(referrer) => referrer,
                Err(e) => {
                    log::debug!("Referrer lookup for {} failed: {e:#}", url);
                    None
                }
            };
            let _ = messages.send(EngineMessage::ReferrerResolved {
                tab,
                ticket,
                referrer,
            });
        });
        self.referrer_lookups.replace(tab, ticket, handle);
    }

    pub(super) fn on_referrer_resolved(
        &mut self,
        host: &mut dyn TabHost,
        tab: TabId,
        ticket: u64,
        referrer: Option<String>,
    ) {
        if !self.referrer_lookups.finish(tab, ticket) {
            log::trace!("Dropping stale referrer lookup for tab {}", tab);
            return;
        }
        let Some(referrer) = referrer else {
            return;
        };
        let Some(meta) = self.store.get_mut(tab) else {
            return;
        };
        if meta.open_info.referrer_url.is_some() {
            return;
        }
        log::debug!("Tab {} referrer inferred from history: {}", tab, referrer);
        meta.open_info.from_visit = Some(referrer);
        self.persist(host, tab);
    }
}
