//! Decode, measure, score, and record in one step.

use image::DynamicImage;

use crate::captions::CaptionTable;
use crate::capture::{load_base64, load_bytes, load_file};
use crate::history::History;
use crate::metrics::extract;
use crate::policy::RatingPolicy;
use crate::scorer::{rate, reachable_scores};
use crate::types::{ImageRef, MetricFlags, Rating, RatingEntry, RaterError, RaterResult, Score};

/// Outcome of rating one decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub rating: Rating,
    pub metrics: MetricFlags,
    pub reference: ImageRef,
}

impl Assessment {
    /// Convert into a history entry.
    pub fn into_entry(self) -> RatingEntry {
        RatingEntry::new(self.reference, self.rating, self.metrics)
    }
}

/// A validated policy paired with its caption table.
#[derive(Debug, Clone)]
pub struct Rater {
    policy: RatingPolicy,
    captions: CaptionTable,
}

impl Default for Rater {
    fn default() -> Self {
        Self {
            policy: RatingPolicy::canonical(),
            captions: CaptionTable::default(),
        }
    }
}

impl Rater {
    /// Validate the policy and warn about reachable scores without a
    /// caption; those fall back at lookup time.
    pub fn new(policy: RatingPolicy, captions: CaptionTable) -> RaterResult<Self> {
        policy.validate()?;
        let missing = captions.missing(reachable_scores(&policy));
        if !missing.is_empty() {
            tracing::warn!(
                "Caption table has no entry for reachable scores: {}",
                format_scores(&missing)
            );
        }
        Ok(Self { policy, captions })
    }

    /// Like [`Rater::new`], but a reachable score without a caption is an error.
    pub fn new_strict(policy: RatingPolicy, captions: CaptionTable) -> RaterResult<Self> {
        policy.validate()?;
        let missing = captions.missing(reachable_scores(&policy));
        if !missing.is_empty() {
            return Err(RaterError::Config(format!(
                "no caption for reachable scores: {}",
                format_scores(&missing)
            )));
        }
        Ok(Self { policy, captions })
    }

    pub fn policy(&self) -> &RatingPolicy {
        &self.policy
    }

    pub fn captions(&self) -> &CaptionTable {
        &self.captions
    }

    /// Reachable scores lacking a caption.
    pub fn missing_captions(&self) -> Vec<Score> {
        self.captions.missing(reachable_scores(&self.policy))
    }

    /// Measure and rate a decoded image.
    pub fn rate_image(&self, img: &DynamicImage) -> (Rating, MetricFlags) {
        let metrics = extract(img, &self.policy);
        let rating = rate(&metrics, &self.policy, &self.captions);
        tracing::debug!(
            score = %rating.score,
            failed = ?metrics.failed_checks(),
            "Rated image"
        );
        (rating, metrics)
    }

    /// Rate raw encoded bytes.
    pub fn rate_bytes(&self, bytes: Vec<u8>, name: &str) -> RaterResult<Assessment> {
        let (img, reference) = load_bytes(bytes, name)?;
        Ok(self.assess(&img, reference))
    }

    /// Rate an image file.
    pub fn rate_file(&self, path: &str) -> RaterResult<Assessment> {
        let (img, reference) = load_file(path)?;
        Ok(self.assess(&img, reference))
    }

    /// Rate base64-encoded image data.
    pub fn rate_base64(&self, data: &str, mime: &str) -> RaterResult<Assessment> {
        let (img, reference) = load_base64(data, mime)?;
        Ok(self.assess(&img, reference))
    }

    /// Rate an image file and append the result to `history`.
    ///
    /// Nothing is recorded if the file cannot be read or decoded.
    pub fn record_file(&self, path: &str, history: &mut History) -> RaterResult<(u64, Rating)> {
        let assessment = self.rate_file(path)?;
        let rating = assessment.rating.clone();
        let id = history.record(assessment.into_entry());
        Ok((id, rating))
    }

    /// Rate raw bytes and append the result to `history`.
    pub fn record_bytes(
        &self,
        bytes: Vec<u8>,
        name: &str,
        history: &mut History,
    ) -> RaterResult<(u64, Rating)> {
        let assessment = self.rate_bytes(bytes, name)?;
        let rating = assessment.rating.clone();
        let id = history.record(assessment.into_entry());
        Ok((id, rating))
    }

    fn assess(&self, img: &DynamicImage, reference: ImageRef) -> Assessment {
        let (rating, metrics) = self.rate_image(img);
        Assessment {
            rating,
            metrics,
            reference,
        }
    }
}

fn format_scores(scores: &[Score]) -> String {
    scores
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
