//! Wallpaper Rater: image heuristics, scoring, captions, and session history.

pub mod captions;
pub mod capture;
pub mod history;
pub mod metrics;
pub mod policy;
pub mod rater;
pub mod scorer;
pub mod types;

pub use captions::{CaptionOverrides, CaptionTable, FALLBACK_CAPTION};
pub use capture::{is_supported_format, load_base64, load_bytes, load_file, thumbnail_jpeg};
pub use history::History;
pub use metrics::extract;
pub use policy::{BlurMethod, ColorMethod, Deductions, RatingPolicy, ResolutionTier};
pub use rater::{Assessment, Rater};
pub use scorer::{rate, reachable_scores, score};
pub use types::*;
