//! Wall-clock sources.
//!
//! Tab ids, selection times and read times are all milliseconds since the
//! Unix epoch. The engine reads them through [`Clock`] so tests and replays
//! can drive time explicitly.

use parking_lot::Mutex;

/// Milliseconds since the Unix epoch
pub type Millis = u64;

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> Millis;
}

/// System wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        chrono::Utc::now().timestamp_millis().max(0) as Millis
    }
}

/// Manually driven clock for tests and scripted replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: Millis) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Millis) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        *self.now.lock()
    }
}
