//! Subcommand implementations.

use super::RuntimeOptions;
use crate::config::Config;
use crate::debug;
use crate::host::NoHistory;
use crate::replay::{self, Replay};
use crate::session::storage;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Load the config named on the command line, or the default one
fn load_config(options: &RuntimeOptions) -> Result<Config> {
    let config = match &options.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug::apply_config_level(config.log_level.to_level_filter());
    Ok(config)
}

pub fn show_config_cli(options: &RuntimeOptions) -> Result<()> {
    let config = load_config(options)?;
    let yaml = serde_yaml_ng::to_string(&config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

pub fn replay_cli(
    options: &RuntimeOptions,
    script_path: &Path,
    resume: Option<&Path>,
    snapshot: Option<&Path>,
) -> Result<()> {
    let config = load_config(options)?;
    let script = replay::load_script(script_path)?;

    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let mut session = Replay::new(
        config,
        runtime.handle().clone(),
        script.start_time,
        Arc::new(NoHistory),
    );

    if let Some(path) = resume {
        match storage::load_snapshot_from(path)? {
            Some(saved) => session.restore(&saved),
            None => log::warn!("No window snapshot at {:?}, starting empty", path),
        }
    }

    runtime.block_on(session.run(&script))?;
    print!("{}", session.render());

    if let Some(path) = snapshot {
        storage::save_snapshot_to(&session.snapshot()?, path)?;
    }

    // Abort engine tasks before the runtime goes away
    drop(session);
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    Ok(())
}
