//! Configuration types for tab-lineage.
//!
//! Types are grouped by concern:
//! - `position`: open/select position policies and the family-walk grammar
//! - `policy`: the policy sections that combine positions with their flags

mod policy;
mod position;

pub use policy::{OpenPolicy, PlacementConfig, SelectPolicy, SelectionConfig, SuspensionConfig};
pub use position::{Direction, FamilyRule, OpenPosition, Reach, Relation, SelectPosition};

use serde::{Deserialize, Serialize};

/// Log level for the debug log bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the `log` crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
