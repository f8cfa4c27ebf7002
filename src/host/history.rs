//! Async history lookups used for best-effort enrichment.
//!
//! Failures degrade to "no data": the engine logs them and leaves the
//! referrer or label untouched.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Boxed, spawnable lookup future
pub type LookupFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'static>>;

/// History database access
pub trait HistoryProvider: Send + Sync {
    /// URL of the page a previous visit to `target` came from
    fn find_referrer(&self, target: &str) -> LookupFuture<Option<String>>;

    /// Stored page title for `url`
    fn title_for(&self, url: &str) -> LookupFuture<Option<String>>;
}

/// Provider with no history at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

impl HistoryProvider for NoHistory {
    fn find_referrer(&self, _target: &str) -> LookupFuture<Option<String>> {
        Box::pin(async { Ok(None) })
    }

    fn title_for(&self, _url: &str) -> LookupFuture<Option<String>> {
        Box::pin(async { Ok(None) })
    }
}

/// Provider backed by fixed maps
#[derive(Debug, Default, Clone)]
pub struct StaticHistory {
    referrers: HashMap<String, String>,
    titles: HashMap<String, String>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_referrer(mut self, target: impl Into<String>, referrer: impl Into<String>) -> Self {
        self.referrers.insert(target.into(), referrer.into());
        self
    }

    pub fn with_title(mut self, url: impl Into<String>, title: impl Into<String>) -> Self {
        self.titles.insert(url.into(), title.into());
        self
    }
}

impl HistoryProvider for StaticHistory {
    fn find_referrer(&self, target: &str) -> LookupFuture<Option<String>> {
        let found = self.referrers.get(target).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn title_for(&self, url: &str) -> LookupFuture<Option<String>> {
        let found = self.titles.get(url).cloned();
        Box::pin(async move { Ok(found) })
    }
}
