//! Bounded in-memory log of recent classifications

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ClassificationMethod, ClassificationResult, Department};

/// Entries kept when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 1000;

/// Entries returned by `recent` when the caller does not ask for a count
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// One recorded classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: Department,
    pub confidence: f64,
    pub method: ClassificationMethod,
    pub timestamp: DateTime<Utc>,
    pub subject_preview: String,
}

impl HistoryEntry {
    pub fn new(result: &ClassificationResult, subject_preview: impl Into<String>) -> Self {
        Self {
            label: result.label,
            confidence: result.confidence,
            method: result.method,
            timestamp: Utc::now(),
            subject_preview: subject_preview.into(),
        }
    }
}

/// Fixed-capacity ring buffer; the oldest entry is evicted when full
#[derive(Debug)]
pub struct ClassificationHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for ClassificationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ClassificationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A poisoned lock only means another thread panicked mid-push; the deque is still valid.
    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, entry: HistoryEntry) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The last `limit` entries, oldest first; a limit of 0 returns everything held
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.lock();
        let skip = match limit {
            0 => 0,
            n => entries.len().saturating_sub(n),
        };
        entries.iter().skip(skip).cloned().collect()
    }

    /// Entries currently held
    pub fn total(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
