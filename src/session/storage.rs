//! File I/O for window snapshots
//!
//! A snapshot is the attribute store of every tab in one window, in strip
//! order, plus the closed-tab archive. Snapshots are stored as YAML, by default
//! in `~/.config/tab-lineage/last_window.yaml`.

use super::{ClosedArchive, TabAttributes};
use crate::tab::TabId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted state of one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    /// Timestamp when the snapshot was saved (RFC 3339)
    pub saved_at: String,
    /// Selected tab at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<TabId>,
    /// Attribute stores in strip order
    pub tabs: Vec<TabAttributes>,
    #[serde(default)]
    pub closed: ClosedArchive,
}

impl WindowSnapshot {
    pub fn new(selected: Option<TabId>, tabs: Vec<TabAttributes>, closed: ClosedArchive) -> Self {
        Self {
            saved_at: chrono::Utc::now().to_rfc3339(),
            selected,
            tabs,
            closed,
        }
    }
}

/// Get the path to the default snapshot file
pub fn snapshot_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tab-lineage")
        .join("last_window.yaml")
}

/// Save a snapshot to a specific file
pub fn save_snapshot_to(snapshot: &WindowSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
    }

    let contents =
        serde_yaml_ng::to_string(snapshot).context("Failed to serialize window snapshot")?;

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write window snapshot to {:?}", path))?;

    log::info!(
        "Saved window snapshot ({} tabs) to {:?}",
        snapshot.tabs.len(),
        path
    );
    Ok(())
}

/// Load a snapshot from a specific file
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but is corrupt.
pub fn load_snapshot_from(path: &Path) -> Result<Option<WindowSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read window snapshot from {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let snapshot: WindowSnapshot = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse window snapshot from {:?}", path))?;

    log::info!(
        "Loaded window snapshot ({} tabs) from {:?}",
        snapshot.tabs.len(),
        path
    );
    Ok(Some(snapshot))
}
