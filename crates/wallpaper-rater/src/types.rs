//! Core data types for ratings, measurements, and history entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rating on the half-point grid in [-10, 10].
///
/// Stored as a count of half points so equality and table lookups are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f32", try_from = "f32")]
pub struct Score(i8);

impl Score {
    /// Lowest score on the scale.
    pub const MIN: Score = Score(-20);
    /// Highest score on the scale.
    pub const MAX: Score = Score(20);
    /// Score given to single-color images.
    pub const ZERO: Score = Score(0);

    /// Build a score from a half-point count, clamping into [-10, 10].
    pub fn from_half_points(half_points: i32) -> Self {
        Score(half_points.clamp(Self::MIN.0 as i32, Self::MAX.0 as i32) as i8)
    }

    /// Build a score from whole points, clamping into [-10, 10].
    pub fn from_points(points: i32) -> Self {
        Self::from_half_points(points.saturating_mul(2))
    }

    /// Parse a numeric value that must sit exactly on the half-point grid
    /// and inside the scale.
    pub fn from_value(value: f32) -> Option<Self> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || doubled.fract() != 0.0 {
            return None;
        }
        let half_points = doubled as i32;
        if half_points < Self::MIN.0 as i32 || half_points > Self::MAX.0 as i32 {
            return None;
        }
        Some(Score(half_points as i8))
    }

    /// Number of half points above zero (negative below).
    pub const fn half_points(self) -> i8 {
        self.0
    }

    /// The numeric score.
    pub fn value(self) -> f32 {
        self.0 as f32 / 2.0
    }

    /// Every score on the scale, lowest first.
    pub fn all() -> impl Iterator<Item = Score> {
        (Self::MIN.0..=Self::MAX.0).map(Score)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl From<Score> for f32 {
    fn from(score: Score) -> f32 {
        score.value()
    }
}

impl TryFrom<f32> for Score {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Score::from_value(value)
            .ok_or_else(|| format!("{value} is not a half-point score in [-10, 10]"))
    }
}

/// Measurements taken from one image.
///
/// When `is_uniform` is set the remaining checks are skipped and hold their
/// default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricFlags {
    pub width: u32,
    pub height: u32,
    pub is_uniform: bool,
    pub is_blurry: bool,
    pub is_bright: bool,
    pub is_colorful: bool,
    pub has_good_resolution: bool,
    /// Variance of the edge map used for the blur check.
    pub blur_variance: f64,
    /// Mean intensity over every RGB channel.
    pub brightness: f64,
    /// Distinct color count or mean channel deviation, per the policy.
    pub color_measure: f64,
    /// Mean of the binarised edge map, when clutter is checked.
    pub clutter_score: Option<f32>,
    pub is_cluttered: bool,
}

impl MetricFlags {
    /// Flags for a single-color image.
    pub fn uniform(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            is_uniform: true,
            ..Self::default()
        }
    }

    /// Names of the checks this image failed, in deduction order.
    pub fn failed_checks(&self) -> Vec<&'static str> {
        if self.is_uniform {
            return vec!["uniform"];
        }
        let mut failed = Vec::new();
        if self.is_blurry {
            failed.push("blurry");
        }
        if !self.is_bright {
            failed.push("dark");
        }
        if !self.is_colorful {
            failed.push("dull");
        }
        if !self.has_good_resolution {
            failed.push("low-resolution");
        }
        if self.is_cluttered {
            failed.push("cluttered");
        }
        failed
    }
}

/// A score together with its caption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub score: Score,
    pub caption: String,
}

/// Where a rated image came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    File { path: String },
    Bytes { name: String },
    Base64 { mime: String },
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::File { path } => write!(f, "{path}"),
            ImageSource::Bytes { name } => write!(f, "{name}"),
            ImageSource::Base64 { mime } => write!(f, "<base64 {mime}>"),
        }
    }
}

/// Reference to a rated image, retaining its encoded bytes so the front end
/// can re-open it for display. Dropping the reference frees the bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub source: ImageSource,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImageRef {
    pub fn new(source: ImageSource, bytes: Vec<u8>) -> Self {
        Self { source, bytes }
    }

    /// Size of the retained encoded image.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// One recorded rating in the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingEntry {
    pub id: u64,
    pub recorded_at: u64,
    pub reference: ImageRef,
    pub score: Score,
    pub caption: String,
    pub metrics: MetricFlags,
}

impl RatingEntry {
    /// Create an entry; the id is assigned when the history records it.
    pub fn new(reference: ImageRef, rating: Rating, metrics: MetricFlags) -> Self {
        Self {
            id: 0,
            recorded_at: unix_now(),
            reference,
            score: rating.score,
            caption: rating.caption,
            metrics,
        }
    }
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Errors that can occur while rating images.
#[derive(thiserror::Error, Debug)]
pub enum RaterError {
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid policy: {0}")]
    Config(String),
}

/// Convenience result type.
pub type RaterResult<T> = Result<T, RaterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamps() {
        assert_eq!(Score::from_half_points(99), Score::MAX);
        assert_eq!(Score::from_half_points(-99), Score::MIN);
        assert_eq!(Score::from_points(-15), Score::MIN);
    }

    #[test]
    fn test_score_from_value() {
        assert_eq!(Score::from_value(5.5).map(Score::half_points), Some(11));
        assert_eq!(Score::from_value(-0.5).map(Score::half_points), Some(-1));
        assert!(Score::from_value(5.25).is_none());
        assert!(Score::from_value(10.5).is_none());
        assert!(Score::from_value(f32::NAN).is_none());
    }

    #[test]
    fn test_score_display() {
        assert_eq!(Score::from_points(10).to_string(), "10");
        assert_eq!(Score::from_half_points(11).to_string(), "5.5");
        assert_eq!(Score::from_half_points(-1).to_string(), "-0.5");
        assert_eq!(Score::ZERO.to_string(), "0");
    }

    #[test]
    fn test_score_serde() {
        let json = serde_json::to_string(&Score::from_half_points(7)).unwrap();
        assert_eq!(json, "3.5");
        let back: Score = serde_json::from_str("3.5").unwrap();
        assert_eq!(back.half_points(), 7);
        assert!(serde_json::from_str::<Score>("3.3").is_err());
    }

    #[test]
    fn test_all_scores() {
        let all: Vec<_> = Score::all().collect();
        assert_eq!(all.len(), 41);
        assert_eq!(all[0], Score::MIN);
        assert_eq!(all[40], Score::MAX);
    }

    #[test]
    fn test_failed_checks() {
        let flags = MetricFlags {
            is_blurry: true,
            is_bright: true,
            is_colorful: false,
            has_good_resolution: true,
            ..MetricFlags::default()
        };
        assert_eq!(flags.failed_checks(), vec!["blurry", "dull"]);
        assert_eq!(MetricFlags::uniform(1, 1).failed_checks(), vec!["uniform"]);
    }
}
