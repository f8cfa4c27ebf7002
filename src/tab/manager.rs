//! Lifecycle manager coordinating tab lineage within a window

use super::genealogy::{self, OpenReason, OpenRequest};
use super::ids::IdSource;
use super::read_state::{self, SelectedTimes};
use super::selection::{self, SelectOutcome, SelectionContext};
use super::store::TabStore;
use super::tasks::TaskSlots;
use super::window_move::{MovePayload, SwapOutcome};
use super::{EngineMessage, RestoreKind, TabEvent, TabId, TabMeta};
use crate::clock::{Clock, SystemClock};
use crate::error::{LineageError, Result};
use crate::host::{HistoryProvider, NoHistory, RestoredTab, TabCollection, TabHost};
use crate::session::attributes;
use crate::session::storage::WindowSnapshot;
use std::sync::Arc;
use tab_lineage_config::{Config, OpenPosition};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// What a dispatched [`TabEvent`] produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Opened(TabId),
    Selected(TabId),
    /// The closed tab's successor, when the engine chose one
    Closed { selected: Option<TabId> },
    Restored(TabId),
    Promoted(Option<MovePayload>),
    Swapped(SwapOutcome),
}

/// Owns all lineage state for one window
///
/// Every operation runs on the caller's event loop. Background work (timers,
/// polls and history lookups) is spawned onto `runtime` and reports back as
/// [`EngineMessage`]s on the receiver returned by [`TabLifecycleManager::new`];
/// the caller feeds those to [`TabLifecycleManager::handle_message`].
pub struct TabLifecycleManager {
    pub(super) config: Config,
    pub(super) store: TabStore,
    pub(super) ids: IdSource,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) history: Arc<dyn HistoryProvider>,
    pub(super) runtime: Handle,
    pub(super) messages: UnboundedSender<EngineMessage>,
    pub(super) suspend_timers: TaskSlots,
    pub(super) selection_poll: TaskSlots,
    pub(super) referrer_lookups: TaskSlots,
    pub(super) title_lookups: TaskSlots,
    pub(super) selected_times: SelectedTimes,
    next_ticket: u64,
}

impl TabLifecycleManager {
    /// Create a manager on the system clock with no history access
    pub fn new(config: Config, runtime: Handle) -> (Self, UnboundedReceiver<EngineMessage>) {
        Self::with_parts(config, runtime, Arc::new(SystemClock), Arc::new(NoHistory))
    }

    pub fn with_parts(
        config: Config,
        runtime: Handle,
        clock: Arc<dyn Clock>,
        history: Arc<dyn HistoryProvider>,
    ) -> (Self, UnboundedReceiver<EngineMessage>) {
        let (messages, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            config,
            store: TabStore::new(),
            ids: IdSource::new(clock.clone()),
            clock,
            history,
            runtime,
            messages,
            suspend_timers: TaskSlots::default(),
            selection_poll: TaskSlots::default(),
            referrer_lookups: TaskSlots::default(),
            title_lookups: TaskSlots::default(),
            selected_times: SelectedTimes::default(),
            next_ticket: 0,
        };
        (manager, receiver)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TabStore {
        &self.store
    }

    pub fn meta(&self, id: TabId) -> Option<&TabMeta> {
        self.store.get(id)
    }

    pub fn selected_times(&self) -> SelectedTimes {
        self.selected_times
    }

    /// Whether a suspension timer is still pending for `id`
    pub fn has_pending_suspension(&self, id: TabId) -> bool {
        self.suspend_timers.contains(id)
    }

    /// Whether the selection of `id` is still waiting to be committed
    pub fn is_polling_selection(&self, id: TabId) -> bool {
        self.selection_poll.contains(id)
    }

    /// Number of background tasks currently scheduled
    pub fn pending_tasks(&self) -> usize {
        self.suspend_timers.len()
            + self.selection_poll.len()
            + self.referrer_lookups.len()
            + self.title_lookups.len()
    }

    pub(super) fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Write a tab's metadata to its host attribute store
    pub(super) fn persist(&self, host: &mut dyn TabHost, id: TabId) {
        let Some(meta) = self.store.get(id) else {
            return;
        };
        match attributes::encode(meta) {
            Ok(attrs) => host.write_attributes(id, &attrs),
            Err(e) => log::warn!("Failed to encode attributes for tab {}: {}", id, e),
        }
    }

    pub(super) fn cancel_tab_tasks(&mut self, id: TabId) {
        self.suspend_timers.cancel(id);
        self.selection_poll.cancel(id);
        self.referrer_lookups.cancel(id);
        self.title_lookups.cancel(id);
    }

    // ========================================================================
    // Open
    // ========================================================================

    /// Open a tab and place it according to the open policy
    pub fn open_tab(&mut self, host: &mut dyn TabHost, request: OpenRequest) -> Result<TabId> {
        let info = request.open_info()?;
        let id = self.ids.next_id();
        let base = host.selected_tab();
        let related = info.related_to_current;

        host.add_tab(id, &info, request.background);
        self.record_open(id, info, OpenReason::NewTab, base);
        if request.background {
            self.schedule_suspension(id);
        }

        let position = if related {
            self.config.placement.open.linked
        } else {
            self.config.placement.open.unlinked
        };
        self.place_tab(host, id, base, position);
        self.persist(host, id);

        log::info!(
            "Opened tab {} ({}{})",
            id,
            if related { "linked" } else { "unlinked" },
            if request.background { ", background" } else { "" }
        );

        if !request.background {
            self.select_tab(host, id);
        }
        Ok(id)
    }

    /// Open a tab that has no opener, as done for the pages of a new window
    pub fn open_startup_tab(&mut self, host: &mut dyn TabHost, url: &str) -> Result<TabId> {
        let info = OpenRequest::new(url).open_info()?;
        let id = self.ids.next_id();
        host.add_tab(id, &info, false);
        self.record_open(id, info, OpenReason::StartupTab, None);
        self.persist(host, id);
        self.select_tab(host, id);
        Ok(id)
    }

    fn place_tab(
        &mut self,
        host: &mut dyn TabHost,
        id: TabId,
        base: Option<TabId>,
        position: OpenPosition,
    ) {
        let tabs = TabCollection::new(host.tabs());
        if let Some(index) = super::placement::resolve_move(&tabs, &self.store, base, id, position) {
            log::debug!("Placing tab {} at index {} ({})", id, index, position);
            host.move_tab_to(id, index);
        }
    }

    // ========================================================================
    // Select
    // ========================================================================

    /// Select a tab on the engine's own initiative
    pub fn select_tab(&mut self, host: &mut dyn TabHost, id: TabId) {
        host.select_tab(id);
        self.on_tab_select(host, id);
    }

    /// React to the host selecting a tab
    pub fn on_tab_select(&mut self, host: &mut dyn TabHost, id: TabId) {
        if !self.store.contains(id) {
            log::debug!("Ignoring selection of untracked tab {}", id);
            return;
        }
        self.start_selection_poll(id);
        self.wake_selected(host, id);
    }

    // ========================================================================
    // Close
    // ========================================================================

    /// Close a tab, choosing its successor when it was selected
    ///
    /// Returns the tab the engine selected, if the policy chose one.
    pub fn close_tab(&mut self, host: &mut dyn TabHost, id: TabId) -> Result<Option<TabId>> {
        if !host.tabs().iter().any(|t| t.id == id) {
            log::warn!("Close requested for tab {} which the host does not hold", id);
            return Ok(None);
        }
        self.cancel_tab_tasks(id);

        let was_selected = host.selected_tab() == Some(id);
        let outcome = if was_selected {
            self.resolve_close_selection(host, id)
        } else {
            None
        };

        let attrs = match self.store.get(id) {
            Some(meta) => attributes::encode(meta)?,
            None => Default::default(),
        };
        host.remove_tab(id, attrs);
        self.store.remove(id);
        log::info!("Closed tab {} (remaining: {})", id, self.store.len());

        match outcome {
            Some(outcome) => self.apply_outcome(host, outcome),
            None => {
                if was_selected && let Some(fallback) = host.selected_tab() {
                    self.on_tab_select(host, fallback);
                }
                Ok(None)
            }
        }
    }

    fn resolve_close_selection(&self, host: &dyn TabHost, id: TabId) -> Option<SelectOutcome> {
        let mut tabs = TabCollection::new(host.tabs());
        tabs.mark_closing(id);
        let pinned = tabs.get(id).is_some_and(|t| t.pinned);
        let policy = &self.config.placement.select_on_close;
        let ctx = SelectionContext {
            tabs: &tabs,
            store: &self.store,
            archive: host.closed_archive(),
            times: self.selected_times,
        };
        selection::select_tab_at(&ctx, id, policy.list_for(pinned), policy)
    }

    fn apply_outcome(
        &mut self,
        host: &mut dyn TabHost,
        outcome: SelectOutcome,
    ) -> Result<Option<TabId>> {
        match outcome {
            SelectOutcome::Tab(tab) => {
                self.select_tab(host, tab);
                Ok(Some(tab))
            }
            SelectOutcome::RestoreClosed(closed) => self.undo_close_tab(host, closed),
            SelectOutcome::OpenUrl(url) => self.open_tab(host, OpenRequest::new(url)).map(Some),
        }
    }

    // ========================================================================
    // Restore
    // ========================================================================

    /// Duplicate a tab; the copy lands per the duplicate open policy
    pub fn duplicate_tab(&mut self, host: &mut dyn TabHost, original: TabId) -> Result<TabId> {
        let source = self
            .store
            .get(original)
            .ok_or(LineageError::UnknownTab(original))?;
        let id = self.ids.next_id();
        let mut copy = source.clone();
        copy.id = id;
        let attrs = attributes::encode(&copy)?;

        host.duplicate_tab(original, id);
        host.write_attributes(id, &attrs);
        self.on_tab_restored(
            host,
            RestoredTab {
                id,
                attributes: attrs,
            },
            RestoreKind::Duplicate { original },
        )
    }

    /// Reopen an archived tab and select it
    pub fn undo_close_tab(&mut self, host: &mut dyn TabHost, closed: TabId) -> Result<Option<TabId>> {
        let previously_selected = host.selected_tab();
        let Some(restored) = host.restore_closed(closed) else {
            log::warn!("Tab {} is not in the closed-tab archive", closed);
            return Ok(None);
        };
        let id = self.on_tab_restored(
            host,
            restored,
            RestoreKind::UndoClose {
                previously_selected,
            },
        )?;
        self.select_tab(host, id);
        Ok(Some(id))
    }

    /// Rebuild metadata for a tab the host brought back
    pub fn on_tab_restored(
        &mut self,
        host: &mut dyn TabHost,
        restored: RestoredTab,
        kind: RestoreKind,
    ) -> Result<TabId> {
        let mut meta = attributes::decode(&restored.attributes)?;
        let id = restored.id;
        meta.id = id;
        meta.ancestors.retain(|&ancestor| ancestor != id);
        self.ids.observe(id);

        let now = self.clock.now_millis();
        let (base, position) = match kind {
            RestoreKind::Duplicate { original } => {
                let source = self
                    .store
                    .get(original)
                    .ok_or(LineageError::UnknownTab(original))?;
                genealogy::rewrite_for_duplicate(&mut meta, source);
                if host.selected_tab() == Some(id) {
                    read_state::force_read(&mut meta, now);
                } else {
                    read_state::reset(&mut meta);
                }
                (Some(original), self.config.placement.open.duplicate)
            }
            RestoreKind::UndoClose {
                previously_selected,
            } => {
                read_state::force_read(&mut meta, now);
                (previously_selected, self.config.placement.open.undo_close)
            }
            RestoreKind::Session => (None, OpenPosition::Default),
        };

        log::debug!("Restored tab {} ({:?})", id, kind);
        self.store.insert(meta);
        self.persist(host, id);
        self.place_tab(host, id, base, position);
        Ok(id)
    }

    /// Recreate a saved window inside `host`
    ///
    /// Entries that fail to decode are skipped. Returns the restored ids in
    /// strip order.
    pub fn restore_window(
        &mut self,
        host: &mut dyn TabHost,
        snapshot: &WindowSnapshot,
    ) -> Vec<TabId> {
        let mut restored = Vec::with_capacity(snapshot.tabs.len());
        for attrs in &snapshot.tabs {
            let meta = match attributes::decode(attrs) {
                Ok(meta) => meta,
                Err(e) => {
                    log::warn!("Skipping unreadable tab in window snapshot: {}", e);
                    continue;
                }
            };
            host.add_tab(meta.id, &meta.open_info, true);
            host.write_attributes(meta.id, attrs);
            let tab = RestoredTab {
                id: meta.id,
                attributes: attrs.clone(),
            };
            match self.on_tab_restored(host, tab, RestoreKind::Session) {
                Ok(id) => restored.push(id),
                Err(e) => log::warn!("Failed to restore tab {}: {}", meta.id, e),
            }
        }
        if let Some(selected) = snapshot.selected.filter(|id| restored.contains(id)) {
            self.select_tab(host, selected);
        }
        log::info!("Restored {} tabs from window snapshot", restored.len());
        restored
    }

    /// Capture every tracked tab in strip order
    pub fn snapshot(&self, host: &dyn TabHost) -> Result<WindowSnapshot> {
        let tabs = host
            .tabs()
            .iter()
            .filter_map(|t| self.store.get(t.id))
            .map(attributes::encode)
            .collect::<Result<Vec<_>>>()?;
        Ok(WindowSnapshot::new(
            host.selected_tab(),
            tabs,
            host.closed_archive().clone(),
        ))
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Route a host lifecycle event
    pub fn handle_event(&mut self, host: &mut dyn TabHost, event: TabEvent) -> Result<EventOutcome> {
        match event {
            TabEvent::Open(request) => self.open_tab(host, request).map(EventOutcome::Opened),
            TabEvent::Select(id) => {
                self.on_tab_select(host, id);
                Ok(EventOutcome::Selected(id))
            }
            TabEvent::Close(id) => self
                .close_tab(host, id)
                .map(|selected| EventOutcome::Closed { selected }),
            TabEvent::Restored { tab, kind } => {
                self.on_tab_restored(host, tab, kind).map(EventOutcome::Restored)
            }
            TabEvent::PromoteToWindow(id) => Ok(EventOutcome::Promoted(self.promote_to_window(id))),
            TabEvent::SwapDocshells(swap) => {
                Ok(EventOutcome::Swapped(self.on_swap_docshells(host, swap)))
            }
        }
    }

    /// Route a message from a background task
    pub fn handle_message(&mut self, host: &mut dyn TabHost, message: EngineMessage) {
        match message {
            EngineMessage::SuspendTimerFired { tab, ticket } => {
                self.on_suspend_timer(host, tab, ticket)
            }
            EngineMessage::SelectionPoll { tab, ticket } => self.on_selection_poll(host, tab, ticket),
            EngineMessage::ReferrerResolved {
                tab,
                ticket,
                referrer,
            } => self.on_referrer_resolved(host, tab, ticket, referrer),
            EngineMessage::TitleResolved { tab, ticket, title } => {
                self.on_title_resolved(host, tab, ticket, title)
            }
        }
    }

    /// Cancel every background task; the window is going away
    pub fn shutdown(&mut self) {
        let pending = self.pending_tasks();
        self.suspend_timers.cancel_all();
        self.selection_poll.cancel_all();
        self.referrer_lookups.cancel_all();
        self.title_lookups.cancel_all();
        log::debug!("Lifecycle manager shut down ({} tasks cancelled)", pending);
    }
}

impl Drop for TabLifecycleManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
