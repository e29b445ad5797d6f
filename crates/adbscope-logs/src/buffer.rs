use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use adbscope_types::{ArcLogEntry, LogEntry, Severity};

/// Buffer contents guarded by the single buffer lock
#[derive(Default)]
struct Inner {
    entries: VecDeque<ArcLogEntry>,
    counts: SeverityCounts,
    revision: u64,
    total_appended: u64,
    total_evicted: u64,
}

/// Thread-safe bounded buffer for log entries.
///
/// Appends, evictions, clears and reads all go through one mutex, so two
/// producers and a reader never observe a partial append or a torn eviction.
/// Clones share the same storage.
#[derive(Clone)]
pub struct LogBuffer {
    /// Internal storage - uses Arc<LogEntry> so snapshots are cheap
    inner: Arc<Mutex<Inner>>,

    /// Maximum number of retained entries
    capacity: usize,

    /// Extra entries dropped below capacity when a full buffer is trimmed
    eviction_slack: usize,
}

/// Point-in-time copy of buffer contents
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Copied entries (all of them, or the requested tail)
    pub entries: Vec<ArcLogEntry>,

    /// Number of entries buffered when the copy was taken
    pub buffered: usize,

    /// Buffer revision the copy reflects
    pub revision: u64,
}

impl LogBuffer {
    /// Create a new log buffer with the given capacity and an eviction slack of 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity),
                ..Inner::default()
            })),
            capacity,
            eviction_slack: 1,
        }
    }

    /// Set how far below capacity a full buffer is trimmed (clamped to `1..=capacity`)
    pub fn with_eviction_slack(mut self, slack: usize) -> Self {
        self.eviction_slack = slack.clamp(1, self.capacity);
        self
    }

    /// Append an entry at the tail, evicting from the head if the buffer is full
    pub fn append(&self, entry: LogEntry) {
        let entry = Arc::new(entry);
        let mut inner = self.inner.lock();
        self.append_locked(&mut inner, entry);
    }

    /// Append several entries under one lock acquisition
    pub fn append_batch<I>(&self, entries: I)
    where
        I: IntoIterator<Item = LogEntry>,
    {
        let entries: Vec<ArcLogEntry> = entries.into_iter().map(Arc::new).collect();
        if entries.is_empty() {
            return;
        }

        let mut inner = self.inner.lock();
        for entry in entries {
            self.append_locked(&mut inner, entry);
        }
    }

    /// Append with the lock held. A full buffer is trimmed to
    /// `capacity - eviction_slack` before the new entry goes in.
    fn append_locked(&self, inner: &mut Inner, entry: ArcLogEntry) {
        if inner.entries.len() >= self.capacity {
            let keep = self.capacity - self.eviction_slack;
            let evict = inner.entries.len() - keep;
            for evicted in inner.entries.drain(..evict) {
                inner.counts.decrement(evicted.severity());
            }
            inner.total_evicted += evict as u64;
        }

        inner.counts.increment(entry.severity());
        inner.entries.push_back(entry);
        inner.total_appended += 1;
        inner.revision += 1;
    }

    /// Get all entries (Arc clones are cheap - just reference count increment)
    pub fn snapshot(&self) -> Vec<ArcLogEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    /// Get the last N entries
    pub fn tail(&self, n: usize) -> Vec<ArcLogEntry> {
        let inner = self.inner.lock();
        let start = inner.entries.len().saturating_sub(n);
        inner.entries.iter().skip(start).cloned().collect()
    }

    /// All entries together with the revision they reflect
    pub fn versioned_snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            entries: inner.entries.iter().cloned().collect(),
            buffered: inner.entries.len(),
            revision: inner.revision,
        }
    }

    /// The last N entries together with the buffered count and revision
    pub fn versioned_tail(&self, n: usize) -> Snapshot {
        let inner = self.inner.lock();
        let start = inner.entries.len().saturating_sub(n);
        Snapshot {
            entries: inner.entries.iter().skip(start).cloned().collect(),
            buffered: inner.entries.len(),
            revision: inner.revision,
        }
    }

    /// Clear all entries
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.counts = SeverityCounts::default();
        inner.revision += 1;
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn eviction_slack(&self) -> usize {
        self.eviction_slack
    }

    /// Counter bumped by every append and clear
    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    /// Entries appended since creation
    pub fn total_appended(&self) -> u64 {
        self.inner.lock().total_appended
    }

    /// Entries evicted to stay within capacity
    pub fn total_evicted(&self) -> u64 {
        self.inner.lock().total_evicted
    }

    /// Get entry count per severity of the current contents
    pub fn severity_counts(&self) -> SeverityCounts {
        self.inner.lock().counts.clone()
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("eviction_slack", &self.eviction_slack)
            .finish()
    }
}

/// Counts per severity
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub verbose: usize,
    pub debug: usize,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub unknown: usize,
}

impl SeverityCounts {
    fn slot(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Verbose => &mut self.verbose,
            Severity::Debug => &mut self.debug,
            Severity::Info => &mut self.info,
            Severity::Warning => &mut self.warning,
            Severity::Error => &mut self.error,
            Severity::Unknown => &mut self.unknown,
        }
    }

    fn increment(&mut self, severity: Severity) {
        *self.slot(severity) += 1;
    }

    fn decrement(&mut self, severity: Severity) {
        let slot = self.slot(severity);
        *slot = slot.saturating_sub(1);
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Verbose => self.verbose,
            Severity::Debug => self.debug,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
            Severity::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.verbose + self.debug + self.info + self.warning + self.error + self.unknown
    }
}
