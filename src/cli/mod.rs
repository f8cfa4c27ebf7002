//! Command-line interface for tab-lineage.
//!
//! This module handles CLI argument parsing and dispatches the subcommands.
//! Subcommand implementations live in the [`commands`] submodule.

pub mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// tab-lineage - Tab genealogy, placement and selection-policy engine
#[derive(Parser)]
#[command(name = "tab-lineage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a YAML script of tab events against an in-memory window
    Replay {
        /// Script to run
        script: PathBuf,

        /// Restore this window snapshot before running the script
        #[arg(long, value_name = "PATH")]
        resume: Option<PathBuf>,

        /// Write the final window snapshot here
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,
    },

    /// Print the effective configuration as YAML
    ShowConfig,
}

/// Options shared by every subcommand
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Config file override
    pub config_path: Option<PathBuf>,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
}

/// Result of CLI processing
pub enum CliResult {
    /// Run a subcommand with the given options
    Run(RuntimeOptions, Commands),
    /// Exit with the given code
    Exit(i32),
}

/// Parse CLI arguments
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();
    let options = RuntimeOptions {
        config_path: cli.config,
        log_level: cli.log_level.map(|l| l.to_level_filter()),
    };

    match cli.command {
        Some(command) => CliResult::Run(options, command),
        None => {
            let _ = Cli::command().print_help();
            CliResult::Exit(2)
        }
    }
}

/// Execute a parsed subcommand; returns the process exit code
pub fn run(options: &RuntimeOptions, command: Commands) -> i32 {
    let result = match command {
        Commands::Replay {
            script,
            resume,
            snapshot,
        } => commands::replay_cli(options, &script, resume.as_deref(), snapshot.as_deref()),
        Commands::ShowConfig => commands::show_config_cli(options),
    };
    match result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("tab-lineage: error: {e:#}");
            1
        }
    }
}
