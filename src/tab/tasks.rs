//! Cancellable background tasks keyed by tab id.
//!
//! Spawned tasks never touch engine state. They sleep or await a lookup and
//! then send an [`EngineMessage`] back to the event loop carrying their
//! ticket. A slot holds at most one task per tab; replacing or cancelling it
//! aborts the previous task, and messages from superseded tickets are
//! rejected by [`TaskSlots::is_current`].

use super::{EngineMessage, TabId};
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

struct Scheduled {
    ticket: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub(crate) struct TaskSlots {
    slots: HashMap<TabId, Scheduled>,
}

impl TaskSlots {
    /// Install a task for `tab`, aborting whatever was there
    pub(crate) fn replace(&mut self, tab: TabId, ticket: u64, handle: JoinHandle<()>) {
        if let Some(previous) = self.slots.insert(tab, Scheduled { ticket, handle }) {
            previous.handle.abort();
        }
    }

    /// Abort the task for `tab`; returns whether one was pending
    pub(crate) fn cancel(&mut self, tab: TabId) -> bool {
        match self.slots.remove(&tab) {
            Some(scheduled) => {
                scheduled.handle.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for (_, scheduled) in self.slots.drain() {
            scheduled.handle.abort();
        }
    }

    pub(crate) fn is_current(&self, tab: TabId, ticket: u64) -> bool {
        self.slots
            .get(&tab)
            .is_some_and(|scheduled| scheduled.ticket == ticket)
    }

    /// Retire a one-shot task that delivered its message.
    ///
    /// Returns false for stale tickets, leaving any newer task in place.
    pub(crate) fn finish(&mut self, tab: TabId, ticket: u64) -> bool {
        if self.is_current(tab, ticket) {
            self.slots.remove(&tab);
            true
        } else {
            false
        }
    }

    pub(crate) fn contains(&self, tab: TabId) -> bool {
        self.slots.contains_key(&tab)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for TaskSlots {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Send `message` once after `delay`
pub(crate) fn spawn_delayed(
    runtime: &Handle,
    messages: UnboundedSender<EngineMessage>,
    delay: Duration,
    message: EngineMessage,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = messages.send(message);
    })
}

/// Send `message` every `period` until aborted or the receiver is gone
pub(crate) fn spawn_repeating(
    runtime: &Handle,
    messages: UnboundedSender<EngineMessage>,
    period: Duration,
    message: EngineMessage,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            if messages.send(message.clone()).is_err() {
                break;
            }
        }
    })
}
