//! Scripted tab sessions against an in-memory window.
//!
//! A script is a YAML list of steps. Tabs are referred to by labels given
//! when they are opened:
//!
//! ```yaml
//! start_time: 1000
//! steps:
//!   - open: { label: home, url: "https://example.com" }
//!   - load_finished: home
//!   - wait: 300
//!   - open: { label: article, url: "https://example.com/a", related: true, background: true }
//!   - select: article
//!   - close: article
//!   - undo_close: article
//! ```
//!
//! Time is driven by a manual clock that follows the tokio clock during
//! `wait` steps, so ids and selection times are reproducible.

use crate::clock::{Clock, ManualClock, Millis};
use crate::config::Config;
use crate::host::{HistoryProvider, MemoryHost, TabHost};
use crate::session::storage::WindowSnapshot;
use crate::tab::{EngineMessage, OpenRequest, TabId, TabLifecycleManager};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

fn default_start_time() -> Millis {
    1_000
}

/// A replay script
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Clock value when the script starts
    #[serde(default = "default_start_time")]
    pub start_time: Millis,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenStep {
    pub label: String,
    #[serde(flatten)]
    pub request: OpenStepRequest,
}

/// Open parameters as written in scripts
#[derive(Debug, Clone, Deserialize)]
pub struct OpenStepRequest {
    pub url: String,
    #[serde(default)]
    pub related: bool,
    #[serde(default)]
    pub background: bool,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl OpenStepRequest {
    fn to_request(&self) -> OpenRequest {
        let mut request = OpenRequest::new(self.url.clone());
        request.related_to_current = self.related;
        request.background = self.background;
        request.referrer_url = self.referrer.clone();
        request
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateStep {
    pub label: String,
    pub of: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartupStep {
    pub label: String,
    pub url: String,
}

/// One scripted action
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Open(OpenStep),
    Startup(StartupStep),
    Select(String),
    Close(String),
    Duplicate(DuplicateStep),
    UndoClose(String),
    /// Rewrite a tab's open parameters to the page it shows now
    PromoteStartup(StartupStep),
    Pin(String),
    Unpin(String),
    Hide(String),
    /// Mark a tab's load as finished
    LoadFinished(String),
    /// Mark every tab's load as finished
    LoadAll,
    /// Let background tasks run for this many milliseconds
    Wait(u64),
}

/// Read and parse a script file
pub fn load_script(path: &Path) -> Result<Script> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script {:?}", path))?;
    serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse replay script {:?}", path))
}

/// A window driven by a script
pub struct Replay {
    host: MemoryHost,
    manager: TabLifecycleManager,
    messages: UnboundedReceiver<EngineMessage>,
    clock: Arc<ManualClock>,
    labels: BTreeMap<String, TabId>,
}

impl Replay {
    pub fn new(
        config: Config,
        runtime: Handle,
        start_time: Millis,
        history: Arc<dyn HistoryProvider>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(start_time));
        let (manager, messages) =
            TabLifecycleManager::with_parts(config, runtime, clock.clone(), history);
        Self {
            host: MemoryHost::new(),
            manager,
            messages,
            clock,
            labels: BTreeMap::new(),
        }
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn manager(&self) -> &TabLifecycleManager {
        &self.manager
    }

    /// Id bound to `label`
    pub fn id_of(&self, label: &str) -> Result<TabId> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| anyhow!("unknown tab label '{}'", label))
    }

    fn label_of(&self, id: TabId) -> String {
        self.labels
            .iter()
            .find(|(_, bound)| **bound == id)
            .map(|(label, _)| label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Load a saved window before running; restored tabs are labelled by id
    pub fn restore(&mut self, snapshot: &WindowSnapshot) {
        for entry in snapshot.closed.entries().iter().rev() {
            self.host.archive_closed(entry.clone());
        }
        for id in self.manager.restore_window(&mut self.host, snapshot) {
            self.labels.insert(id.to_string(), id);
        }
    }

    pub async fn run(&mut self, script: &Script) -> Result<()> {
        for (index, step) in script.steps.iter().enumerate() {
            log::debug!("Replay step {}: {:?}", index + 1, step);
            self.step(step)
                .await
                .with_context(|| format!("Replay step {} ({:?}) failed", index + 1, step))?;
        }
        Ok(())
    }

    async fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Open(open) => {
                let id = self
                    .manager
                    .open_tab(&mut self.host, open.request.to_request())?;
                self.labels.insert(open.label.clone(), id);
            }
            Step::Startup(startup) => {
                let id = self.manager.open_startup_tab(&mut self.host, &startup.url)?;
                self.labels.insert(startup.label.clone(), id);
            }
            Step::Select(label) => {
                let id = self.id_of(label)?;
                self.host.select_tab(id);
                self.manager.on_tab_select(&mut self.host, id);
            }
            Step::Close(label) => {
                let id = self.id_of(label)?;
                self.manager.close_tab(&mut self.host, id)?;
            }
            Step::Duplicate(dup) => {
                let original = self.id_of(&dup.of)?;
                let id = self.manager.duplicate_tab(&mut self.host, original)?;
                self.labels.insert(dup.label.clone(), id);
            }
            Step::UndoClose(label) => {
                let id = self.id_of(label)?;
                if self.manager.undo_close_tab(&mut self.host, id)?.is_none() {
                    log::warn!("Nothing to restore for '{}'", label);
                }
            }
            Step::PromoteStartup(startup) => {
                let id = self.id_of(&startup.label)?;
                self.manager
                    .promote_to_startup_tab(&mut self.host, id, &startup.url)?;
            }
            Step::Pin(label) => {
                let id = self.id_of(label)?;
                self.host.set_pinned(id, true);
            }
            Step::Unpin(label) => {
                let id = self.id_of(label)?;
                self.host.set_pinned(id, false);
            }
            Step::Hide(label) => {
                let id = self.id_of(label)?;
                self.host.set_hidden(id, true);
            }
            Step::LoadFinished(label) => {
                let id = self.id_of(label)?;
                self.host.set_busy(id, false);
            }
            Step::LoadAll => self.host.finish_all_loads(),
            Step::Wait(ms) => self.wait(*ms).await,
        }
        self.drain();
        Ok(())
    }

    /// Process engine messages for `ms` milliseconds of tokio time
    pub async fn wait(&mut self, ms: u64) {
        let start = self.clock.now_millis();
        let began = tokio::time::Instant::now();
        let deadline = began + Duration::from_millis(ms);
        loop {
            match tokio::time::timeout_at(deadline, self.messages.recv()).await {
                Ok(Some(message)) => {
                    self.clock.set(start + began.elapsed().as_millis() as Millis);
                    self.manager.handle_message(&mut self.host, message);
                }
                Ok(None) | Err(_) => break,
            }
        }
        self.clock.set(start + ms);
    }

    /// Handle messages that are already queued
    fn drain(&mut self) {
        while let Ok(message) = self.messages.try_recv() {
            self.manager.handle_message(&mut self.host, message);
        }
    }

    pub fn snapshot(&self) -> Result<WindowSnapshot> {
        Ok(self.manager.snapshot(&self.host)?)
    }

    /// Text table of the strip, one tab per line
    pub fn render(&self) -> String {
        let selected = self.host.selected_tab();
        let mut out = format!(
            "  {:<12} {:>8} {:<16} {:>8} {:<5} {:<5} {}\n",
            "label", "id", "opener", "selected", "read", "susp", "url"
        );
        for tab in self.host.tabs() {
            let Some(host_tab) = self.host.tab(tab.id) else {
                continue;
            };
            let meta = self.manager.meta(tab.id);
            let opener = meta
                .and_then(|m| m.parent())
                .map(|p| self.label_of(p))
                .unwrap_or_else(|| "-".to_string());
            let select_time = meta
                .and_then(|m| m.select_time)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{}{} {:<12} {:>8} {:<16} {:>8} {:<5} {:<5} {}\n",
                if Some(tab.id) == selected { '>' } else { ' ' },
                if tab.pinned { '*' } else { ' ' },
                self.label_of(tab.id),
                tab.id,
                opener,
                select_time,
                meta.is_some_and(|m| m.read),
                meta.is_some_and(|m| m.suspended),
                host_tab.label,
            ));
        }
        out
    }
}
