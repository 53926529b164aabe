//! Session-scoped record of past ratings.

use crate::types::RatingEntry;

/// Ordered list of ratings made during one session.
///
/// Insertion order is display order. Entries are never edited after they are
/// recorded; removing one drops its retained image bytes.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<RatingEntry>,
    next_id: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Append an entry and return its assigned ID.
    pub fn record(&mut self, mut entry: RatingEntry) -> u64 {
        let id = self.next_id;
        entry.id = id;
        self.next_id += 1;
        tracing::info!(
            id,
            score = %entry.score,
            source = %entry.reference.source,
            "Recorded rating"
        );
        self.entries.push(entry);
        id
    }

    /// Remove the entry at `index`.
    ///
    /// Out-of-range indices are ignored and yield `None`.
    pub fn delete(&mut self, index: usize) -> Option<RatingEntry> {
        if index >= self.entries.len() {
            tracing::warn!(
                "Ignoring delete of entry {index}, history has {} entries",
                self.entries.len()
            );
            return None;
        }
        let removed = self.entries.remove(index);
        tracing::debug!("Deleted rating {} ({} bytes freed)", removed.id, removed.reference.byte_len());
        Some(removed)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.entries.shrink_to_fit();
        tracing::debug!("Cleared {count} ratings");
    }

    /// All entries in insertion order.
    pub fn list(&self) -> &[RatingEntry] {
        &self.entries
    }

    /// Entry at a position, if present.
    pub fn get(&self, index: usize) -> Option<&RatingEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total encoded image bytes held by the entries.
    pub fn retained_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.reference.byte_len()).sum()
    }

    /// Mean score over all entries.
    pub fn average_score(&self) -> Option<f32> {
        if self.entries.is_empty() {
            return None;
        }
        let total: f32 = self.entries.iter().map(|e| e.score.value()).sum();
        Some(total / self.entries.len() as f32)
    }
}
