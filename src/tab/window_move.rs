//! Carrying tab state across windows.
//!
//! When a tab is dragged into a new window the host swaps the page into a
//! fresh tab owned by another manager. The originating manager hands over a
//! [`MovePayload`]; the receiving manager applies it when the host reports
//! the swap. Only the open parameters and the suspended flag travel.

use super::manager::TabLifecycleManager;
use super::{OpenInfo, TabId, TabMeta};
use crate::host::TabHost;
use crate::session::attributes::{self, TabAttributes};

/// State carried from the origin tab to its replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePayload {
    pub open_info: OpenInfo,
    pub suspended: bool,
}

impl MovePayload {
    pub fn capture(meta: &TabMeta) -> Self {
        Self {
            open_info: meta.open_info.clone(),
            suspended: meta.suspended,
        }
    }
}

/// Host notification that a page moved between two tabs
#[derive(Debug, Clone)]
pub struct DocShellSwap {
    pub origin: TabId,
    /// Replacement tab in this window; absent when the swap is not a move
    pub new_tab: Option<TabId>,
    /// Payload handed over by the origin window, consumed here
    pub payload: Option<MovePayload>,
    /// Origin tab's attribute store, used when no payload arrived
    pub origin_attributes: Option<TabAttributes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Not a window move
    Ignored,
    /// State applied to the replacement tab
    Transplanted,
    /// The event for the other side of the swap will carry the state
    Skipped,
}

impl TabLifecycleManager {
    /// Detach a tab that is leaving this window
    ///
    /// Pending work for the tab stops here. Its metadata stays until the host
    /// closes the origin tab so close-time selection still sees its lineage.
    pub fn promote_to_window(&mut self, id: TabId) -> Option<MovePayload> {
        self.cancel_tab_tasks(id);
        let meta = self.store.get(id)?;
        log::debug!("Tab {} leaving window (suspended: {})", id, meta.suspended);
        Some(MovePayload::capture(meta))
    }

    pub fn on_swap_docshells(&mut self, host: &mut dyn TabHost, swap: DocShellSwap) -> SwapOutcome {
        let Some(new_tab) = swap.new_tab else {
            return SwapOutcome::Ignored;
        };

        let payload = match swap.payload {
            Some(payload) => payload,
            None if new_tab < swap.origin => return SwapOutcome::Skipped,
            None => {
                let Some(attrs) = swap.origin_attributes.as_ref() else {
                    log::warn!("Swap into tab {} carried no origin state", new_tab);
                    return SwapOutcome::Ignored;
                };
                match attributes::decode(attrs) {
                    Ok(meta) => MovePayload::capture(&meta),
                    Err(e) => {
                        log::warn!("Cannot read origin tab {} attributes: {}", swap.origin, e);
                        return SwapOutcome::Ignored;
                    }
                }
            }
        };

        self.ids.observe(new_tab);
        let meta = self
            .store
            .get_or_insert_with(new_tab, || TabMeta::new(new_tab, payload.open_info.clone()));
        meta.open_info = payload.open_info;
        meta.suspended = payload.suspended;
        log::debug!(
            "Transplanted tab {} into {} (suspended: {})",
            swap.origin,
            new_tab,
            payload.suspended
        );
        self.persist(host, new_tab);

        if host.selected_tab() == Some(new_tab) {
            self.wake_selected(host, new_tab);
        }
        SwapOutcome::Transplanted
    }
}
