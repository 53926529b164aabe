//! Captions keyed by score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Score;

/// Caption used when a score has no table entry.
pub const FALLBACK_CAPTION: &str = "Rating not available";

const SLOTS: usize = (Score::MAX.half_points() as i32 - Score::MIN.half_points() as i32 + 1) as usize;

/// Built-in captions as (half points, text).
const DEFAULT_CAPTIONS: &[(i8, &str)] = &[
    (-20, "L WALLPAPER 😂"),
    (-18, "Absolute trash."),
    (-16, "Terrible wallpaper"),
    (-14, "Awful just awful"),
    (-12, "Get a new wallpaper ASAP (rocky)"),
    (-10, "Damn that's Pretty damn bad"),
    (-8, "Very bad"),
    (-6, "Simply awful."),
    (-4, "WAY Below average. Needs work."),
    (-3, "Yikes."),
    (-2, "Awful"),
    (0, "How bad is this wallpaper 😂"),
    (1, "Really bru? 💀🙏"),
    (2, "Not good at all"),
    (3, "Oof."),
    (4, "Get a new wallpaper ASAP (rocky)"),
    (5, "Rough one."),
    (6, "NO."),
    (7, "No way 🤦❌"),
    (8, "Big L Wallpaper"),
    (9, "Below mid"),
    (10, "Mid"),
    (11, "Barely Mid"),
    (12, "Above mid 👊"),
    (14, "Not bad eh?"),
    (15, "Solid pick"),
    (16, "Pretty damn good"),
    (18, "Ooh Lala! 👏"),
    (20, "W Wallpaper 💯"),
];

/// One optional caption per half-point score from -10 to 10.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTable {
    slots: Vec<Option<String>>,
}

impl Default for CaptionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for &(half_points, text) in DEFAULT_CAPTIONS {
            table.set(Score::from_half_points(half_points as i32), text);
        }
        table
    }
}

impl CaptionTable {
    /// A table with no captions; every lookup falls back.
    pub fn empty() -> Self {
        Self {
            slots: vec![None; SLOTS],
        }
    }

    fn slot(score: Score) -> usize {
        (score.half_points() as i32 - Score::MIN.half_points() as i32) as usize
    }

    /// Set or replace the caption for a score.
    pub fn set(&mut self, score: Score, caption: impl Into<String>) {
        let caption = caption.into();
        self.slots[Self::slot(score)] = if caption.trim().is_empty() {
            None
        } else {
            Some(caption)
        };
    }

    /// Builder form of [`CaptionTable::set`].
    pub fn with_caption(mut self, score: Score, caption: impl Into<String>) -> Self {
        self.set(score, caption);
        self
    }

    /// Caption configured for a score, if any.
    pub fn get(&self, score: Score) -> Option<&str> {
        self.slots[Self::slot(score)].as_deref()
    }

    /// Caption for a score, or [`FALLBACK_CAPTION`] when none is configured.
    pub fn caption_for(&self, score: Score) -> &str {
        match self.get(score) {
            Some(caption) => caption,
            None => {
                tracing::warn!("No caption for score {score}, using fallback");
                FALLBACK_CAPTION
            }
        }
    }

    /// Scores from `scores` that have no caption.
    pub fn missing<I: IntoIterator<Item = Score>>(&self, scores: I) -> Vec<Score> {
        scores.into_iter().filter(|s| self.get(*s).is_none()).collect()
    }

    /// Configured entries, lowest score first.
    pub fn entries(&self) -> Vec<(Score, &str)> {
        Score::all()
            .filter_map(|s| self.get(s).map(|c| (s, c)))
            .collect()
    }

    /// Apply caption overrides on top of this table.
    pub fn merge(&mut self, overrides: &CaptionOverrides) {
        for (score, caption) in &overrides.0 {
            self.set(*score, caption.clone());
        }
    }
}

/// Caption overrides as read from configuration, keyed by score text
/// such as `"7.5"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct CaptionOverrides(pub Vec<(Score, String)>);

impl TryFrom<BTreeMap<String, String>> for CaptionOverrides {
    type Error = String;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, caption) in map {
            let value: f32 = key
                .trim()
                .parse()
                .map_err(|_| format!("caption key '{key}' is not a number"))?;
            let score = Score::try_from(value)?;
            entries.push((score, caption));
        }
        Ok(Self(entries))
    }
}

impl From<CaptionOverrides> for BTreeMap<String, String> {
    fn from(overrides: CaptionOverrides) -> Self {
        overrides
            .0
            .into_iter()
            .map(|(score, caption)| (score.to_string(), caption))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let table = CaptionTable::default();
        assert_eq!(table.get(Score::MAX), Some("W Wallpaper 💯"));
        assert_eq!(table.get(Score::MIN), Some("L WALLPAPER 😂"));
        assert_eq!(table.get(Score::ZERO), Some("How bad is this wallpaper 😂"));
    }

    #[test]
    fn test_half_point_captions() {
        let table = CaptionTable::default();
        for value in [-1.5, 0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 7.5] {
            let score = Score::from_value(value).unwrap();
            assert!(table.get(score).is_some(), "missing caption for {value}");
        }
    }

    #[test]
    fn test_fallback() {
        let table = CaptionTable::default();
        let odd = Score::from_value(-9.5).unwrap();
        assert_eq!(table.get(odd), None);
        assert_eq!(table.caption_for(odd), FALLBACK_CAPTION);
        assert_eq!(CaptionTable::empty().caption_for(Score::MAX), FALLBACK_CAPTION);
    }

    #[test]
    fn test_every_score_has_nonempty_caption() {
        let table = CaptionTable::default();
        for score in Score::all() {
            assert!(!table.caption_for(score).is_empty());
        }
    }

    #[test]
    fn test_missing() {
        let table = CaptionTable::empty().with_caption(Score::MAX, "top");
        let missing = table.missing([Score::MAX, Score::ZERO]);
        assert_eq!(missing, vec![Score::ZERO]);
    }

    #[test]
    fn test_blank_caption_clears_slot() {
        let mut table = CaptionTable::default();
        table.set(Score::MAX, "   ");
        assert_eq!(table.get(Score::MAX), None);
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides: CaptionOverrides =
            serde_json::from_str(r#"{"7.5": "Nice", "-10": "Bin it"}"#).unwrap();
        let mut table = CaptionTable::default();
        table.merge(&overrides);
        assert_eq!(table.get(Score::from_value(7.5).unwrap()), Some("Nice"));
        assert_eq!(table.get(Score::MIN), Some("Bin it"));

        assert!(serde_json::from_str::<CaptionOverrides>(r#"{"7.25": "x"}"#).is_err());
        assert!(serde_json::from_str::<CaptionOverrides>(r#"{"great": "x"}"#).is_err());
    }
}
