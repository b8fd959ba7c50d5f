//! In-memory ranking cache with scan mutual exclusion.
//!
//! Holds the most recent scan's ranked opportunities behind one mutex.
//! Results are replaced wholesale on scan completion; there is no
//! per-entry update path. The `scan_in_progress` flag doubles as the
//! mutual-exclusion latch for concurrent scan triggers.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::Opportunity;

#[derive(Debug, Default)]
struct CacheState {
    opportunities: Vec<Opportunity>,
    last_scan: Option<Instant>,
    scan_in_progress: bool,
}

/// Point-in-time view of the cache.
#[derive(Debug, Clone)]
pub struct RankingSnapshot {
    pub opportunities: Vec<Opportunity>,
    pub age: Option<Duration>,
    pub scan_in_progress: bool,
}

impl RankingSnapshot {
    /// Whether the cached ranking is younger than `window`.
    pub fn is_fresh(&self, window: Duration) -> bool {
        matches!(self.age, Some(age) if age < window)
    }
}

/// Shared cache of the latest ranked scan results.
#[derive(Debug, Default)]
pub struct RankingCache {
    state: Mutex<CacheState>,
}

impl RankingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RankingSnapshot {
        let state = self.lock();
        RankingSnapshot {
            opportunities: state.opportunities.clone(),
            age: state.last_scan.map(|at| at.elapsed()),
            scan_in_progress: state.scan_in_progress,
        }
    }

    /// Atomically claim the scan latch. Returns `false` when another
    /// scan already holds it.
    pub fn try_begin_scan(&self) -> bool {
        let mut state = self.lock();
        if state.scan_in_progress {
            return false;
        }
        state.scan_in_progress = true;
        true
    }

    /// Replace the ranking wholesale, stamp the scan time, and release
    /// the latch.
    pub fn complete_scan(&self, opportunities: Vec<Opportunity>) {
        let mut state = self.lock();
        state.opportunities = opportunities;
        state.last_scan = Some(Instant::now());
        state.scan_in_progress = false;
    }

    /// Release the latch without touching the cached ranking. Called on
    /// every failure path so a crashed scan cannot wedge the latch.
    pub fn abort_scan(&self) {
        self.lock().scan_in_progress = false;
    }

    pub fn scan_in_progress(&self) -> bool {
        self.lock().scan_in_progress
    }

    pub fn age(&self) -> Option<Duration> {
        self.lock().last_scan.map(|at| at.elapsed())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            // State is a plain swap target; a poisoned lock holds
            // nothing torn.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_is_mutually_exclusive() {
        let cache = RankingCache::new();
        assert!(cache.try_begin_scan());
        assert!(!cache.try_begin_scan(), "second claim must fail");

        cache.complete_scan(Vec::new());
        assert!(cache.try_begin_scan(), "latch reopens after completion");
    }

    #[test]
    fn abort_releases_latch_and_keeps_ranking() {
        let cache = RankingCache::new();
        cache.complete_scan(Vec::new());
        let stamped_age = cache.age();

        assert!(cache.try_begin_scan());
        cache.abort_scan();

        assert!(!cache.scan_in_progress());
        assert!(cache.age().is_some(), "abort must not clear the stamp");
        assert!(stamped_age.is_some());
    }

    #[test]
    fn snapshot_reports_freshness() {
        let cache = RankingCache::new();
        let empty = cache.snapshot();
        assert!(empty.age.is_none());
        assert!(!empty.is_fresh(Duration::from_secs(300)));

        cache.complete_scan(Vec::new());
        let stamped = cache.snapshot();
        assert!(stamped.is_fresh(Duration::from_secs(300)));
        assert!(!stamped.is_fresh(Duration::ZERO));
    }
}
