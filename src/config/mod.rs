//! Engine configuration.
//!
//! Re-exports all configuration types from the `tab-lineage-config` crate.

pub use tab_lineage_config::*;
