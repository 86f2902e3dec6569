//! Counters for what the pool is doing.
//!
//! Every public operation funnels its cache and disk activity through
//! [`BufferStats`]: whether a fetch was served from a resident frame or
//! had to go to its file, how often the clock sweep recycled a valid
//! frame, and how many pages actually moved to and from disk. The
//! counters are how a caller (or a test) observes I/O the manager did
//! on its behalf without instrumenting every `DbFile`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Activity counters for one buffer manager.
///
/// Plain atomics bumped with `Relaxed` ordering: each counter only
/// needs to be individually consistent, never ordered against the
/// others. The recording methods are crate-internal; readers take a
/// detached [`StatsSnapshot`] instead of polling live counters.
///
/// # Example
/// ```
/// use pagepool::BufferStats;
///
/// let stats = BufferStats::new();
/// let snap = stats.snapshot();
/// assert_eq!(snap.hits, 0);
/// assert_eq!(snap.hit_rate(), 0.0);
/// ```
#[derive(Debug, Default)]
pub struct BufferStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    disk_reads: AtomicU64,
    disk_writes: AtomicU64,
}

impl BufferStats {
    /// Create a tracker with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetch found its page resident.
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A fetch had to go to the file.
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// The clock sweep recycled a valid frame.
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// A page was read in from a file.
    pub(crate) fn record_disk_read(&self) {
        self.disk_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// A page was written back to a file.
    pub(crate) fn record_disk_write(&self) {
        self.disk_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters out as a plain value.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            disk_reads: self.disk_reads.load(Ordering::Relaxed),
            disk_writes: self.disk_writes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`BufferStats`].
///
/// Detached from the live counters: safe to print, compare, or diff
/// against an earlier snapshot to measure one stretch of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl StatsSnapshot {
    /// Fraction of fetches served from resident frames, in `[0.0, 1.0]`.
    pub fn hit_rate(&self) -> f64 {
        let fetches = self.hits + self.misses;
        if fetches == 0 {
            return 0.0;
        }
        self.hits as f64 / fetches as f64
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} evictions={} reads={} writes={} hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.disk_reads,
            self.disk_writes,
            self.hit_rate() * 100.0
        )
    }
}
