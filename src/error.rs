//! Typed error types for the lineage engine.
//!
//! Only contract violations surface here. Stale-reference races and
//! best-effort lookup failures are resolved inside the engine and never
//! become errors.

use crate::tab::TabId;
use thiserror::Error;

/// Errors returned by engine operations
#[derive(Debug, Error)]
pub enum LineageError {
    /// An operation named a tab the engine holds no metadata for.
    #[error("no lineage metadata for tab {0}")]
    UnknownTab(TabId),

    /// A required open parameter was empty or absent.
    #[error("missing required open parameter '{0}'")]
    MissingOpenParameter(&'static str),

    /// A persisted attribute required to rebuild metadata is absent.
    #[error("tab attribute '{0}' is missing")]
    MissingAttribute(&'static str),

    /// A persisted attribute could not be decoded.
    #[error("tab attribute '{name}' is invalid: {value:?}")]
    InvalidAttribute {
        /// Attribute key.
        name: &'static str,
        /// Raw stored value.
        value: String,
    },

    /// `openInfo` could not be encoded or decoded as JSON.
    #[error("openInfo JSON error: {0}")]
    OpenInfoEncoding(#[from] serde_json::Error),
}

/// Convenience alias used throughout the engine
pub type Result<T> = std::result::Result<T, LineageError>;
