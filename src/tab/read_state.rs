//! Selection and read-state tracking.
//!
//! A selection is committed only once the tab has stayed selected and
//! finished loading for a full poll interval. Committing stamps the select
//! time, marks the tab read on first view and rolls the window's
//! [`SelectedTimes`].

use super::manager::TabLifecycleManager;
use super::tasks;
use super::{EngineMessage, TabId, TabMeta};
use crate::clock::Millis;
use crate::error::{LineageError, Result};
use crate::host::TabHost;
use std::time::Duration;

/// The window's two most recent committed selection times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectedTimes {
    pub previous: Option<Millis>,
    pub current: Option<Millis>,
}

impl SelectedTimes {
    pub fn roll(&mut self, now: Millis) {
        self.previous = self.current;
        self.current = Some(now);
    }
}

/// Stamp a committed selection onto `meta`
pub fn commit_selection(meta: &mut TabMeta, times: &mut SelectedTimes, now: Millis) {
    meta.select_time = Some(now);
    if !meta.read {
        meta.read = true;
        meta.read_time = Some(now);
    }
    times.roll(now);
}

/// Forget every selection and read the tab has seen
pub fn reset(meta: &mut TabMeta) {
    meta.select_time = None;
    meta.read_time = None;
    meta.read = false;
}

/// Mark a tab selected and read immediately, without waiting for a poll
///
/// The window's [`SelectedTimes`] only move on polled commits.
pub fn force_read(meta: &mut TabMeta, now: Millis) {
    meta.select_time = Some(now);
    if !meta.read {
        meta.read = true;
        meta.read_time = Some(now);
    }
}

impl TabLifecycleManager {
    /// Clear a tab's selection and read history
    pub fn reset_read_state(&mut self, host: &mut dyn TabHost, id: TabId) -> Result<()> {
        let meta = self.store.get_mut(id).ok_or(LineageError::UnknownTab(id))?;
        reset(meta);
        self.persist(host, id);
        Ok(())
    }

    /// Mark a tab read right now
    pub fn force_read(&mut self, host: &mut dyn TabHost, id: TabId) -> Result<()> {
        let now = self.clock.now_millis();
        let meta = self.store.get_mut(id).ok_or(LineageError::UnknownTab(id))?;
        force_read(meta, now);
        self.persist(host, id);
        Ok(())
    }

    /// Start polling `id`, replacing any poll already running in this window
    pub(super) fn start_selection_poll(&mut self, id: TabId) {
        self.selection_poll.cancel_all();
        let ticket = self.next_ticket();
        let period = Duration::from_millis(self.config.selection.effective_commit_delay_ms());
        let handle = tasks::spawn_repeating(
            &self.runtime,
            self.messages.clone(),
            period,
            EngineMessage::SelectionPoll { tab: id, ticket },
        );
        self.selection_poll.replace(id, ticket, handle);
    }

    pub(super) fn on_selection_poll(&mut self, host: &mut dyn TabHost, tab: TabId, ticket: u64) {
        if !self.selection_poll.is_current(tab, ticket) {
            return;
        }
        if host.selected_tab() != Some(tab) || !self.store.contains(tab) {
            log::trace!("Tab {} no longer selected, dropping selection poll", tab);
            self.selection_poll.cancel(tab);
            return;
        }
        match host.tabs().iter().find(|t| t.id == tab).map(|t| t.busy) {
            Some(true) => return,
            Some(false) => {}
            None => {
                self.selection_poll.cancel(tab);
                return;
            }
        }

        let now = self.clock.now_millis();
        if let Some(meta) = self.store.get_mut(tab) {
            commit_selection(meta, &mut self.selected_times, now);
            log::debug!("Committed selection of tab {} at {}", tab, now);
        }
        self.selection_poll.cancel(tab);
        self.persist(host, tab);
    }
}
