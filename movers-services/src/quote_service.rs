//! Quote cache orchestrator
//!
//! The state machine between the UI and the upstream movers feed. Each
//! `refresh()` decides whether the UI gets fresh data, cached data flagged
//! as degraded, or an error: a rate limit must never blank the screen if
//! any data, however old, exists.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movers_alphavantage::AlphaVantageClient;
use movers_core::{MoversError, MoversResult, QuoteSnapshot};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::ttl_cache::{CacheStats, TtlCache};

/// Cache TTL for the movers snapshot (5 minutes)
const QUOTE_TTL: Duration = Duration::from_secs(300);

/// Fixed cache key; there is exactly one movers snapshot
const QUOTES_KEY: &str = "quotes";

/// Upstream source for the movers snapshot
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_snapshot(&self) -> MoversResult<QuoteSnapshot>;
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    async fn fetch_snapshot(&self) -> MoversResult<QuoteSnapshot> {
        self.top_movers().await
    }
}

/// The orchestrator's answer to one refresh request. Recomputed per call,
/// never persisted. Either `snapshot` is present or `error` is.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResult {
    pub snapshot: Option<QuoteSnapshot>,

    /// When the served snapshot was actually fetched; for a degraded
    /// response this is the timestamp of the original successful fetch
    pub fetched_at: Option<DateTime<Utc>>,

    pub serving_cached: bool,
    pub rate_limited: bool,
    pub error: Option<String>,
}

/// Observable quote state for the UI
#[derive(Debug, Clone, Serialize)]
pub struct QuoteState {
    pub loading: bool,
    pub last_snapshot: Option<QuoteSnapshot>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub rate_limited: bool,
    pub cached_data_in_use: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    last_snapshot: Option<QuoteSnapshot>,
    fetched_at: Option<DateTime<Utc>>,
    rate_limited: bool,
    serving_cached: bool,
    last_error: Option<String>,
}

/// Service owning the quote cache and the degraded-mode decision
pub struct QuoteService {
    source: Arc<dyn QuoteSource>,
    cache: TtlCache<&'static str, QuoteSnapshot>,
    inner: RwLock<Inner>,
    loading: AtomicBool,
}

impl QuoteService {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            cache: TtlCache::new(),
            inner: RwLock::new(Inner::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Run one refresh against the upstream.
    ///
    /// No retries and no coalescing: concurrent calls race benignly
    /// (last write wins, both results are valid snapshots of what
    /// happened) and retrying is the user's explicit action.
    pub async fn refresh(&self) -> RefreshResult {
        self.loading.store(true, Ordering::SeqCst);

        let result = match self.source.fetch_snapshot().await {
            Ok(snapshot) => self.on_success(snapshot),
            Err(error) => self.on_failure(error),
        };

        self.loading.store(false, Ordering::SeqCst);
        result
    }

    fn on_success(&self, snapshot: QuoteSnapshot) -> RefreshResult {
        let now = Utc::now();
        self.cache.set(QUOTES_KEY, snapshot.clone(), QUOTE_TTL);

        let mut inner = self.inner.write();
        inner.last_snapshot = Some(snapshot.clone());
        inner.fetched_at = Some(now);
        inner.rate_limited = false;
        inner.serving_cached = false;
        inner.last_error = None;

        info!(
            gainers = snapshot.top_gainers.len(),
            losers = snapshot.top_losers.len(),
            active = snapshot.most_active.len(),
            "Refreshed movers snapshot"
        );

        RefreshResult {
            snapshot: Some(snapshot),
            fetched_at: Some(now),
            serving_cached: false,
            rate_limited: false,
            error: None,
        }
    }

    fn on_failure(&self, error: MoversError) -> RefreshResult {
        let rate_limited = error.is_rate_limited();
        let mut inner = self.inner.write();

        // Any prior snapshot, even one the cache has expired, beats a
        // blank screen
        let prior = self
            .cache
            .get_stale(&QUOTES_KEY)
            .or_else(|| inner.last_snapshot.clone());

        match prior {
            Some(snapshot) => {
                warn!(%error, rate_limited, "Upstream fetch failed, serving cached snapshot");

                inner.rate_limited = rate_limited;
                inner.serving_cached = true;
                inner.last_error = None;
                let fetched_at = inner.fetched_at;

                RefreshResult {
                    snapshot: Some(snapshot),
                    fetched_at,
                    serving_cached: true,
                    rate_limited,
                    error: None,
                }
            }
            None => {
                warn!(%error, "Upstream fetch failed with no snapshot to fall back on");

                let message = if rate_limited {
                    "rate limit exceeded".to_string()
                } else {
                    error.to_string()
                };

                inner.rate_limited = false;
                inner.serving_cached = false;
                inner.last_error = Some(message.clone());

                RefreshResult {
                    snapshot: None,
                    fetched_at: None,
                    serving_cached: false,
                    rate_limited: false,
                    error: Some(message),
                }
            }
        }
    }

    /// Whether a refresh is currently in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// The last snapshot a refresh produced, if any
    pub fn last_snapshot(&self) -> Option<QuoteSnapshot> {
        self.inner.read().last_snapshot.clone()
    }

    /// The full observable state the UI binds to
    pub fn state(&self) -> QuoteState {
        let inner = self.inner.read();
        QuoteState {
            loading: self.is_loading(),
            last_snapshot: inner.last_snapshot.clone(),
            fetched_at: inner.fetched_at,
            rate_limited: inner.rate_limited,
            cached_data_in_use: inner.serving_cached,
            last_error: inner.last_error.clone(),
        }
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
