use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::{HistoryEntry, KeyValueStore};
use crate::error::{StorageError, StorageResult};
use crate::session::TaskType;

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 50;

/// Storage key holding the serialized history.
pub const HISTORY_KEY: &str = "bishforge_history";

/// Capacity-bounded, newest-first history of completed sessions.
///
/// The full collection is cached in memory and written back as one value on
/// every mutation. The cache is only replaced after the backend accepts the
/// write, so a failed write leaves both the cache and the stored value as
/// they were.
pub struct HistoryStore<S> {
    storage: S,
    entries: Vec<HistoryEntry>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Open the store and load whatever history the backend holds.
    pub async fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            entries: Vec::new(),
        };
        store.load().await;
        store
    }

    /// Reload from the backend.
    ///
    /// Unreadable or corrupted data yields an empty history.
    pub async fn load(&mut self) {
        self.entries = match self.storage.get(HISTORY_KEY).await {
            Ok(Some(text)) => match serde_json::from_str::<Vec<HistoryEntry>>(&text) {
                Ok(entries) => normalize(entries),
                Err(e) => {
                    warn!(error = %e, "Stored history is corrupted, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read history, starting empty");
                Vec::new()
            }
        };

        debug!(entries = self.entries.len(), "History loaded");
    }

    /// Write `entries` to the backend as a single value.
    async fn persist(&self, entries: &[HistoryEntry]) -> StorageResult<()> {
        let text = serde_json::to_string(entries).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        self.storage.put(HISTORY_KEY, &text).await
    }

    /// Insert an entry, evicting the oldest ones beyond capacity.
    ///
    /// A full store rejects an entry older than everything it holds with
    /// [`StorageError::Evicted`] and is left unchanged.
    pub async fn append(&mut self, entry: HistoryEntry) -> StorageResult<()> {
        if self.entries.iter().any(|e| e.id == entry.id) {
            return Err(StorageError::DuplicateEntry { id: entry.id });
        }

        let position = self
            .entries
            .partition_point(|e| e.created_at > entry.created_at);
        if position >= HISTORY_CAPACITY {
            warn!(
                entry_id = %entry.id,
                created_at = %entry.created_at,
                "History entry older than every retained entry, not stored"
            );
            return Err(StorageError::Evicted { id: entry.id });
        }

        let id = entry.id.clone();
        let mut next = self.entries.clone();
        next.insert(position, entry);

        let evicted = next.len().saturating_sub(HISTORY_CAPACITY);
        next.truncate(HISTORY_CAPACITY);

        self.persist(&next).await?;
        self.entries = next;

        info!(
            entry_id = %id,
            entries = self.entries.len(),
            evicted,
            "History entry saved"
        );
        Ok(())
    }

    /// Delete the entry with `id`. Unknown ids are a no-op.
    pub async fn remove(&mut self, id: &str) -> StorageResult<()> {
        if !self.entries.iter().any(|e| e.id == id) {
            debug!(entry_id = %id, "History entry not found, nothing to remove");
            return Ok(());
        }

        let next: Vec<HistoryEntry> = self.entries.iter().filter(|e| e.id != id).cloned().collect();

        self.persist(&next).await?;
        self.entries = next;

        info!(entry_id = %id, "History entry removed");
        Ok(())
    }

    /// All entries, most recent first.
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entries matching `filter`, in their stored order.
    pub fn list_filtered(&self, filter: &HistoryFilter) -> Vec<&HistoryEntry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Look up a single entry.
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Restore the ordering, uniqueness and capacity invariants on loaded data.
fn normalize(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert(e.id.clone()));
    entries.truncate(HISTORY_CAPACITY);
    entries
}

/// Predicate over history entries. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Overall risk, compared case-insensitively.
    pub risk: Option<String>,
    pub task_type: Option<TaskType>,
}

impl HistoryFilter {
    /// A filter that matches every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only entries with this overall risk.
    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk = Some(risk.into());
        self
    }

    /// Only entries of this task type.
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Check one entry.
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let risk_match = self
            .risk
            .as_deref()
            .map_or(true, |risk| entry.overall_risk.matches(risk));
        let task_match = self
            .task_type
            .map_or(true, |task| entry.input.task_type == task);
        risk_match && task_match
    }
}
