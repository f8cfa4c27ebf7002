//! Configuration system for the tab-lineage engine.
//!
//! This crate provides configuration loading, saving, and default values.
//! It includes:
//!
//! - Open-position and select-position policy types
//! - Suspension and selection-commit timer settings
//! - YAML persistence with XDG-compliant paths

pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use config::Config;
pub use error::ConfigError;

pub use types::{
    Direction, FamilyRule, LogLevel, OpenPolicy, OpenPosition, PlacementConfig, Reach, Relation,
    SelectPolicy, SelectPosition, SelectionConfig, SuspensionConfig,
};
