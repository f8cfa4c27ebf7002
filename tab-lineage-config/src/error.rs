//! Typed error variants for the tab-lineage-config crate.
//!
//! `Config::load` and `Config::save` still return `anyhow::Result`; callers
//! that want to distinguish failure modes can downcast to [`ConfigError`].

use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML that could not be parsed.
    #[error("YAML parse error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A position policy name is not one of the recognized positions.
    #[error("unknown position type '{0}'")]
    UnknownPosition(String),
}
