//! Run history for the sync pipeline
//!
//! Each sync run appends one record: when it ran, how big the merged
//! dataset was, and whether it actually rewrote the published snapshot.
//! The log lives in the same store as the snapshot blobs.

use crate::error::Result;
use crate::model::Dataset;
use crate::store::SnapshotStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blob the run log is stored under
pub const HISTORY_BLOB: &str = "history.json";

/// A record of one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    /// Items in the merged dataset
    pub items: usize,
    /// Quests in the merged dataset
    pub quests: usize,
    /// Drop rates in the merged dataset
    pub drop_rates: usize,
    /// Whether the run changed the published snapshot
    pub written: bool,
}

/// The full run log, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
}

impl History {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the log from the store, or empty if no run has been logged yet
    pub fn load(store: &SnapshotStore) -> Result<Self> {
        match store.get(HISTORY_BLOB)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Self::new()),
        }
    }

    /// Save the log back to the store
    pub fn save(&self, store: &SnapshotStore) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        store.put(HISTORY_BLOB, content.as_bytes())
    }

    /// Append a record for a finished run
    pub fn record(&mut self, merged: &Dataset, written: bool) {
        self.entries.push(HistoryEntry {
            timestamp: Utc::now(),
            items: merged.items.len(),
            quests: merged.quests.len(),
            drop_rates: merged.drop_rates.len(),
            written,
        });
    }

    /// The most recent entries, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev().take(limit)
    }

    /// The last recorded run
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    fn dataset() -> Dataset {
        Dataset {
            items: vec![Item {
                id: "00".to_string(),
                category: "銅素材".to_string(),
                name: "証".to_string(),
            }],
            ..Dataset::default()
        }
    }

    #[test]
    fn test_record_counts_entities() {
        let mut history = History::new();
        history.record(&dataset(), true);
        let entry = history.last().unwrap();
        assert_eq!(entry.items, 1);
        assert_eq!(entry.quests, 0);
        assert!(entry.written);
    }

    #[test]
    fn test_load_without_prior_runs_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        assert!(History::load(&store).unwrap().entries.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let mut history = History::new();
        history.record(&dataset(), true);
        history.record(&Dataset::default(), false);
        history.save(&store).unwrap();

        let reloaded = History::load(&store).unwrap();
        assert_eq!(reloaded.entries.len(), 2);
        assert!(!reloaded.last().unwrap().written);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut history = History::new();
        history.record(&Dataset::default(), false);
        history.record(&dataset(), true);
        let recent: Vec<_> = history.recent(5).collect();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].written);
    }
}
