//! Shared integration test helpers for tab-lineage.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::TestWindow;
//! ```
//!
//! Tests that spawn engine tasks run under `#[tokio::test(start_paused = true)]`
//! so timers only fire when [`TestWindow::advance`] moves the tokio clock.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tab_lineage::clock::{Clock, ManualClock};
use tab_lineage::config::Config;
use tab_lineage::host::{HistoryProvider, MemoryHost, NoHistory, TabHost};
use tab_lineage::tab::{EngineMessage, OpenRequest, TabId, TabLifecycleManager};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Clock value every test window starts at
pub const START_TIME: u64 = 1_000;

/// Step used when advancing time, in milliseconds
const STEP_MS: u64 = 5;

/// One window: an in-memory host plus the engine driving it
pub struct TestWindow {
    pub host: MemoryHost,
    pub manager: TabLifecycleManager,
    pub messages: UnboundedReceiver<EngineMessage>,
    pub clock: Arc<ManualClock>,
}

impl TestWindow {
    /// Must be called from inside a tokio runtime
    pub fn new(config: Config) -> Self {
        Self::with_history(config, Arc::new(NoHistory))
    }

    pub fn with_history(config: Config, history: Arc<dyn HistoryProvider>) -> Self {
        let clock = Arc::new(ManualClock::new(START_TIME));
        let (manager, messages) = TabLifecycleManager::with_parts(
            config,
            tokio::runtime::Handle::current(),
            clock.clone(),
            history,
        );
        Self {
            host: MemoryHost::new(),
            manager,
            messages,
            clock,
        }
    }

    /// Open an unrelated tab in the foreground
    pub fn open(&mut self, url: &str) -> TabId {
        self.manager
            .open_tab(&mut self.host, OpenRequest::new(url))
            .expect("open failed")
    }

    /// Open a tab related to the currently selected one
    pub fn open_related(&mut self, url: &str, background: bool) -> TabId {
        let mut request = OpenRequest::new(url).related();
        request.background = background;
        self.manager
            .open_tab(&mut self.host, request)
            .expect("open failed")
    }

    /// Open a tab in the background without relating it to the current one
    pub fn open_background(&mut self, url: &str) -> TabId {
        self.manager
            .open_tab(&mut self.host, OpenRequest::new(url).in_background())
            .expect("open failed")
    }

    /// Select as the user would: host first, then the engine hears about it
    pub fn user_select(&mut self, id: TabId) {
        self.host.select_tab(id);
        self.manager.on_tab_select(&mut self.host, id);
    }

    pub fn close(&mut self, id: TabId) -> Option<TabId> {
        self.manager
            .close_tab(&mut self.host, id)
            .expect("close failed")
    }

    pub fn order(&self) -> Vec<TabId> {
        self.host.order()
    }

    pub fn selected(&self) -> Option<TabId> {
        self.host.selected_tab()
    }

    /// Handle every message already queued
    pub fn pump(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            self.manager.handle_message(&mut self.host, message);
        }
    }

    /// Move tokio time and the manual clock forward together, delivering
    /// engine messages as they arrive
    pub async fn advance(&mut self, ms: u64) {
        let mut elapsed = 0;
        while elapsed < ms {
            let step = STEP_MS.min(ms - elapsed);
            tokio::time::advance(Duration::from_millis(step)).await;
            tokio::task::yield_now().await;
            self.clock.advance(step);
            elapsed += step;
            self.pump();
        }
    }

    /// Let every tab finish loading, then let `ms` pass
    pub async fn settle(&mut self, ms: u64) {
        self.host.finish_all_loads();
        self.advance(ms).await;
    }

    /// Select a tab and wait long enough for the selection to commit
    pub async fn commit_select(&mut self, id: TabId) {
        self.user_select(id);
        self.host.set_busy(id, false);
        let delay = self.manager.config().selection.effective_commit_delay_ms();
        self.advance(delay + 2 * STEP_MS).await;
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }
}

/// Config with suspension turned off, for tests that only care about lineage
pub fn config_without_suspension() -> Config {
    Config::default().with_suspension(false)
}

/// Creates a temporary directory for file round-trip tests.
///
/// The `TempDir` must be kept alive until all file I/O has completed.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
