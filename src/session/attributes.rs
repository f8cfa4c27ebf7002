//! Persisted tab attributes.
//!
//! The host keeps a string-keyed attribute store per tab, serializes it
//! across restarts and undo-close, and hands it back verbatim on restore.
//! The engine persists exactly five keys:
//!
//! | key          | encoding                                  |
//! |--------------|-------------------------------------------|
//! | `openInfo`   | JSON object                               |
//! | `openTime`   | decimal milliseconds (the tab id)         |
//! | `selectTime` | decimal milliseconds, absent if never set |
//! | `readTime`   | decimal milliseconds, absent if unread    |
//! | `ancestors`  | space-separated ids, empty string if none |

use crate::error::{LineageError, Result};
use crate::tab::{OpenInfo, TabId, TabMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ATTR_OPEN_INFO: &str = "openInfo";
pub const ATTR_OPEN_TIME: &str = "openTime";
pub const ATTR_SELECT_TIME: &str = "selectTime";
pub const ATTR_READ_TIME: &str = "readTime";
pub const ATTR_ANCESTORS: &str = "ancestors";

/// A tab's string attribute store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabAttributes(BTreeMap<String, String>);

impl TabAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Encode a tab's metadata into its attribute store
pub fn encode(meta: &TabMeta) -> Result<TabAttributes> {
    let mut attrs = TabAttributes::new();
    attrs.set(ATTR_OPEN_INFO, serde_json::to_string(&meta.open_info)?);
    attrs.set(ATTR_OPEN_TIME, meta.id.to_string());
    if let Some(time) = meta.select_time {
        attrs.set(ATTR_SELECT_TIME, time.to_string());
    }
    if let Some(time) = meta.read_time {
        attrs.set(ATTR_READ_TIME, time.to_string());
    }
    attrs.set(ATTR_ANCESTORS, encode_ancestors(&meta.ancestors));
    Ok(attrs)
}

/// Rebuild metadata from an attribute store
///
/// `read` is derived from the presence of `readTime`; `suspended` is never
/// persisted and always comes back false.
pub fn decode(attrs: &TabAttributes) -> Result<TabMeta> {
    let open_info = attrs
        .get(ATTR_OPEN_INFO)
        .ok_or(LineageError::MissingAttribute(ATTR_OPEN_INFO))?;
    let open_info: OpenInfo = serde_json::from_str(open_info)?;

    let id = attrs
        .get(ATTR_OPEN_TIME)
        .ok_or(LineageError::MissingAttribute(ATTR_OPEN_TIME))
        .and_then(|value| parse_millis(ATTR_OPEN_TIME, value))?;

    let select_time = optional_millis(attrs, ATTR_SELECT_TIME)?;
    let read_time = optional_millis(attrs, ATTR_READ_TIME)?;
    let ancestors = match attrs.get(ATTR_ANCESTORS) {
        Some(value) => decode_ancestors(value)?,
        None => Vec::new(),
    };

    let mut meta = TabMeta::new(id, open_info);
    meta.ancestors = ancestors;
    meta.ancestors.retain(|&ancestor| ancestor != id);
    meta.select_time = select_time;
    meta.read_time = read_time;
    meta.read = read_time.is_some();
    Ok(meta)
}

pub fn encode_ancestors(ancestors: &[TabId]) -> String {
    ancestors
        .iter()
        .map(TabId::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode_ancestors(value: &str) -> Result<Vec<TabId>> {
    value
        .split_whitespace()
        .map(|part| parse_millis(ATTR_ANCESTORS, part))
        .collect()
}

fn optional_millis(attrs: &TabAttributes, name: &'static str) -> Result<Option<u64>> {
    match attrs.get(name) {
        Some(value) if !value.trim().is_empty() => parse_millis(name, value).map(Some),
        _ => Ok(None),
    }
}

fn parse_millis(name: &'static str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| LineageError::InvalidAttribute {
            name,
            value: value.to_string(),
        })
}
