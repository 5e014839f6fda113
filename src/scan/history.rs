//! Bounded Scan History
//!
//! Most-recent-first cache of past results. Insertion is the only mutation;
//! entries past the cap are dropped, not archived.

use crate::api::models::ScanResult;

/// Number of results retained.
pub const HISTORY_CAPACITY: usize = 5;

/// Bounded, most-recent-first list of completed scans
#[derive(Debug, Clone, Default)]
pub struct ScanHistory {
    entries: Vec<ScanResult>,
}

impl ScanHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a completed scan at the front, evicting past the cap.
    pub fn push(&mut self, result: ScanResult) {
        self.entries.insert(0, result);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&ScanResult> {
        self.entries.first()
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &ScanResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the current entries, most recent first.
    pub fn entries(&self) -> &[ScanResult] {
        &self.entries
    }
}
