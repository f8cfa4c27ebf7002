//! Deferred loading of background tabs.
//!
//! A tab opened in the background gets a one-shot timer. If the tab is still
//! unselected and loading (or blank) when it fires, its load is stopped and
//! the tab is marked suspended until it is selected.

use super::manager::TabLifecycleManager;
use super::tasks;
use super::{EngineMessage, TabId};
use crate::host::{TabCollection, TabHost};
use std::time::Duration;

impl TabLifecycleManager {
    pub(super) fn schedule_suspension(&mut self, id: TabId) {
        if !self.config.suspension.enabled {
            return;
        }
        let delay = Duration::from_millis(self.config.suspension.effective_delay_ms());
        let ticket = self.next_ticket();
        let handle = tasks::spawn_delayed(
            &self.runtime,
            self.messages.clone(),
            delay,
            EngineMessage::SuspendTimerFired { tab: id, ticket },
        );
        self.suspend_timers.replace(id, ticket, handle);
        log::trace!("Suspension of tab {} scheduled in {:?}", id, delay);
    }

    pub(super) fn on_suspend_timer(&mut self, host: &mut dyn TabHost, tab: TabId, ticket: u64) {
        if !self.suspend_timers.finish(tab, ticket) {
            return;
        }
        let Some(host_tab) = host.tabs().into_iter().find(|t| t.id == tab) else {
            return;
        };
        if host.selected_tab() == Some(tab) || !(host_tab.busy || host_tab.blank) {
            return;
        }
        let Some(meta) = self.store.get_mut(tab) else {
            return;
        };

        host.stop_load(tab);
        meta.suspended = true;
        log::info!("Suspended background tab {}", tab);

        if host_tab.blank {
            let url = meta.open_info.url.clone();
            self.spawn_title_lookup(tab, url);
        }
    }

    fn spawn_title_lookup(&mut self, tab: TabId, url: String) {
        let ticket = self.next_ticket();
        let lookup = self.history.title_for(&url);
        let messages = self.messages.clone();
        let handle = self.runtime.spawn(async move {
            let title = match lookup.await {
                Ok(title) => title,
                Err(e) => {
                    log::debug!("Title lookup for {} failed: {e:#}", url);
                    None
                }
            };
            let _ = messages.send(EngineMessage::TitleResolved { tab, ticket, title });
        });
        self.title_lookups.replace(tab, ticket, handle);
    }

    pub(super) fn on_title_resolved(
        &mut self,
        host: &mut dyn TabHost,
        tab: TabId,
        ticket: u64,
        title: Option<String>,
    ) {
        if !self.title_lookups.finish(tab, ticket) {
            return;
        }
        if !self.store.get(tab).is_some_and(|meta| meta.suspended) {
            return;
        }
        if let Some(title) = title.filter(|title| !title.is_empty()) {
            host.set_label(tab, &title);
        }
    }

    /// Called on selection: cancel the tab's own timer and resume it if needed
    pub(super) fn wake_selected(&mut self, host: &mut dyn TabHost, id: TabId) {
        self.suspend_timers.cancel(id);
        self.title_lookups.cancel(id);
        self.resume(host, id);

        if self.config.suspension.preload_adjacent {
            let lane = TabCollection::new(host.tabs()).lane_for(id);
            if let Some(pos) = lane.iter().position(|&t| t == id) {
                let neighbours = [pos.checked_sub(1), Some(pos + 1)];
                for index in neighbours.into_iter().flatten() {
                    if let Some(&neighbour) = lane.get(index) {
                        self.resume(host, neighbour);
                    }
                }
            }
        }
    }

    /// Reload a suspended tab from its open parameters
    fn resume(&mut self, host: &mut dyn TabHost, id: TabId) -> bool {
        let Some(meta) = self.store.get_mut(id) else {
            return false;
        };
        if !meta.suspended {
            return false;
        }
        meta.suspended = false;
        self.title_lookups.cancel(id);
        host.load_with_info(id, &meta.open_info);
        log::info!("Resumed suspended tab {}", id);
        true
    }
}
