//! Provider-side TTL cache for fundamentals snapshots.
//!
//! The fundamentals source is scraped and rate-limited, so adapters keep
//! a short-lived per-symbol cache. Repeated lookups within the TTL are
//! served locally, which makes `fundamentals()` idempotent within a scan.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{FundamentalSnapshot, Symbol};

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: FundamentalSnapshot,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<Symbol, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, symbol: &Symbol) -> Option<FundamentalSnapshot> {
        self.map.get(symbol).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.snapshot.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, snapshot: FundamentalSnapshot, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            snapshot: snapshot.clone(),
            expires_at: Instant::now() + ttl,
        };
        self.map.insert(snapshot.symbol, entry);
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Thread-safe TTL cache keyed by symbol.
#[derive(Debug, Clone)]
pub struct FundamentalsCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl FundamentalsCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// Default TTL of one hour; fundamentals move on reporting cadence,
    /// not tick cadence.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(3_600))
    }

    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, symbol: &Symbol) -> Option<FundamentalSnapshot> {
        let store = self.inner.read().await;
        store.get(symbol)
    }

    pub async fn put(&self, snapshot: FundamentalSnapshot, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;
        if store.default_ttl == Duration::ZERO {
            return;
        }
        store.put(snapshot, ttl_override);
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }
}
