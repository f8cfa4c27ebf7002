// Library exports for the replay binary and integration tests
//
// # Threading model
//
// One `TabLifecycleManager` per window, driven from that window's event
// loop. The manager is not shared across threads; background work runs as
// tokio tasks that only send `EngineMessage`s back over a channel.
//
//   - `tokio::sync::mpsc` — task results flowing back to the event loop.
//   - `parking_lot::Mutex` — sync-only state (manual clock, log file).

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod debug;

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod replay;
pub mod session;
pub mod tab;

pub use error::{LineageError, Result};
pub use host::{MemoryHost, TabHost};
pub use tab::{OpenRequest, TabEvent, TabId, TabLifecycleManager, TabMeta};
