//! Logging backend for tab-lineage
//!
//! Routes every `log::info!()` (and friends) to a session file:
//! /tmp/tab_lineage_debug.log on Unix/macOS, or %TEMP%\tab_lineage_debug.log
//! on Windows. When RUST_LOG is set, records are mirrored to stderr as well.
//!
//! Level precedence: `--log-level` flag, then RUST_LOG, then the config file
//! (applied after the config is loaded via [`apply_config_level`]).

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

struct LogBridge {
    file: Option<Mutex<File>>,
    mirror_stderr: bool,
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();
static LEVEL_PINNED: OnceLock<bool> = OnceLock::new();

/// Path of the session log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let path = PathBuf::from("/tmp/tab_lineage_debug.log");
    #[cfg(not(unix))]
    let path = std::env::temp_dir().join("tab_lineage_debug.log");
    path
}

fn get_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

fn level_from_env() -> Option<LevelFilter> {
    let value = std::env::var("RUST_LOG").ok()?;
    // Only the global level of a RUST_LOG directive list is honoured
    value
        .split(',')
        .find(|part| !part.contains('='))
        .and_then(|part| part.trim().parse().ok())
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = &self.file {
            let mut file = file.lock();
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Install the log bridge; later calls are no-ops
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let env_level = level_from_env();
    let bridge = BRIDGE.get_or_init(|| {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
            .ok()
            .map(|mut f| {
                let _ = writeln!(
                    f,
                    "{}\ntab-lineage session started at {}\n{}",
                    "=".repeat(80),
                    get_timestamp(),
                    "=".repeat(80)
                );
                Mutex::new(f)
            });
        LogBridge {
            file,
            mirror_stderr: env_level.is_some(),
        }
    });

    if log::set_logger(bridge).is_err() {
        return;
    }
    let pinned = cli_level.or(env_level);
    let _ = LEVEL_PINNED.set(pinned.is_some());
    log::set_max_level(pinned.unwrap_or(LevelFilter::Info));
}

/// Apply the config file's level unless the flag or RUST_LOG already chose one
pub fn apply_config_level(level: LevelFilter) {
    if LEVEL_PINNED.get().copied().unwrap_or(false) {
        return;
    }
    log::set_max_level(level);
}
