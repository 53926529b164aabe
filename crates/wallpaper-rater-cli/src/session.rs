//! One interactive rating session: a rater plus the history it fills.

use std::path::Path;

use wallpaper_rater::{thumbnail_jpeg, History, Rater, RaterResult, Rating, RatingEntry};

/// Owns the history for the lifetime of one session.
pub struct RatingSession {
    rater: Rater,
    history: History,
}

impl RatingSession {
    pub fn new(rater: Rater) -> Self {
        tracing::debug!("Rating session started");
        Self {
            rater,
            history: History::new(),
        }
    }

    pub fn rater(&self) -> &Rater {
        &self.rater
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Rate an image file and record it.
    pub fn rate_file(&mut self, path: &str) -> RaterResult<(u64, Rating)> {
        self.rater.record_file(path, &mut self.history)
    }

    /// Delete by 1-based position as shown in listings. Returns whether an
    /// entry was removed.
    pub fn delete_position(&mut self, position: usize) -> bool {
        match position.checked_sub(1) {
            Some(index) => self.history.delete(index).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Entry by 1-based position.
    pub fn entry(&self, position: usize) -> Option<&RatingEntry> {
        position
            .checked_sub(1)
            .and_then(|index| self.history.get(index))
    }

    /// Write a JPEG thumbnail of an entry's image to `out`.
    pub fn export_thumbnail(&self, position: usize, out: &Path) -> anyhow::Result<()> {
        let entry = self
            .entry(position)
            .ok_or_else(|| anyhow::anyhow!("No entry at position {position}"))?;
        std::fs::write(out, thumbnail_jpeg(&entry.reference)?)?;
        tracing::info!("Wrote thumbnail of entry {} to {}", entry.id, out.display());
        Ok(())
    }
}
