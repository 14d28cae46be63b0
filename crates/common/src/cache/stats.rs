//! Resolution cache statistics
//!
//! Counters for the decrypted-value cache: hits, misses, inserts, entries
//! superseded by a changed raw value, and wholesale refreshes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Point-in-time snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,

    /// Lookups answered from a valid entry
    pub hits: u64,

    /// Lookups that had to resolve (no entry, or a stale one)
    pub misses: u64,

    /// Entries stored
    pub inserts: u64,

    /// Stale entries replaced because the raw value changed
    pub supersedes: u64,

    /// Calls to `refresh()`
    pub refreshes: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of lookups (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Lock-free counters shared between clones
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    inserts: Arc<AtomicU64>,
    supersedes: Arc<AtomicU64>,
    refreshes: Arc<AtomicU64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_supersede(&self) {
        self.supersedes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats {
            size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            supersedes: self.supersedes.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
        }
    }
}
