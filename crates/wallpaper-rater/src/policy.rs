//! Thresholds, metric choices, and deductions used to rate an image.

use serde::{Deserialize, Serialize};

use crate::types::{RaterError, RaterResult};

/// Score an image starts from before deductions.
pub const BASE_SCORE: f32 = 10.0;

/// Find-edges variance below this marks an image blurry.
pub const FIND_EDGES_BLUR_THRESHOLD: f64 = 50.0;

/// Laplacian variance below this marks an image blurry.
pub const LAPLACIAN_BLUR_THRESHOLD: f64 = 100.0;

/// Mean RGB intensity above this marks an image bright.
pub const BRIGHTNESS_THRESHOLD: f64 = 100.0;

/// Brightness threshold of the strict preset.
pub const STRICT_BRIGHTNESS_THRESHOLD: f64 = 120.0;

/// Distinct RGB triples above this mark an image colorful.
pub const UNIQUE_COLOR_THRESHOLD: usize = 1000;

/// Mean per-channel standard deviation above this marks an image colorful.
pub const CHANNEL_DEVIATION_THRESHOLD: f64 = 40.0;

/// Edge-map intensity at or above this counts as an edge pixel for clutter.
pub const CLUTTER_EDGE_LEVEL: u8 = 50;

/// Mean binarised edge map above this marks an image cluttered.
pub const CLUTTER_THRESHOLD: f32 = 200.0;

pub const BLUR_PENALTY: f32 = 3.0;
pub const DARK_PENALTY: f32 = 2.0;
pub const DULL_PENALTY: f32 = 2.5;
pub const RESOLUTION_PENALTY: f32 = 2.0;
pub const CLUTTER_PENALTY: f32 = 2.0;

/// Highest score an image with at least one failed check can get under the
/// strict preset.
pub const IMPERFECT_CAP: f32 = 9.0;

/// Edge filter used by the blur check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum BlurMethod {
    /// 3x3 find-edges kernel on 8-bit luma, clamped to 0..=255.
    FindEdges { threshold: f64 },
    /// 4-neighbour Laplacian in floating point over interior pixels.
    Laplacian { threshold: f64 },
}

impl BlurMethod {
    pub fn threshold(&self) -> f64 {
        match self {
            BlurMethod::FindEdges { threshold } | BlurMethod::Laplacian { threshold } => *threshold,
        }
    }
}

impl Default for BlurMethod {
    fn default() -> Self {
        BlurMethod::FindEdges {
            threshold: FIND_EDGES_BLUR_THRESHOLD,
        }
    }
}

/// Measure used by the colorfulness check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ColorMethod {
    /// Count of distinct RGB triples.
    UniqueColors { threshold: usize },
    /// Mean of the per-channel standard deviations.
    ChannelDeviation { threshold: f64 },
}

impl Default for ColorMethod {
    fn default() -> Self {
        ColorMethod::UniqueColors {
            threshold: UNIQUE_COLOR_THRESHOLD,
        }
    }
}

/// Minimum dimensions for the resolution check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// 800x600.
    #[default]
    Standard,
    /// 1280x720.
    Hd,
    /// 1920x1080.
    FullHd,
}

impl ResolutionTier {
    pub fn min_dimensions(self) -> (u32, u32) {
        match self {
            ResolutionTier::Standard => (800, 600),
            ResolutionTier::Hd => (1280, 720),
            ResolutionTier::FullHd => (1920, 1080),
        }
    }
}

/// Points removed for each failed check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    pub blurry: f32,
    pub dark: f32,
    pub dull: f32,
    pub low_resolution: f32,
    pub cluttered: f32,
}

impl Default for Deductions {
    fn default() -> Self {
        Self {
            blurry: BLUR_PENALTY,
            dark: DARK_PENALTY,
            dull: DULL_PENALTY,
            low_resolution: RESOLUTION_PENALTY,
            cluttered: CLUTTER_PENALTY,
        }
    }
}

/// Everything that decides how an image is rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingPolicy {
    pub blur: BlurMethod,
    pub brightness_threshold: f64,
    pub color: ColorMethod,
    pub resolution: ResolutionTier,
    /// Clutter is only measured and penalised when set.
    pub clutter_threshold: Option<f32>,
    pub deductions: Deductions,
    /// Cap any image that failed a check at [`IMPERFECT_CAP`].
    pub cap_imperfect: bool,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self::canonical()
    }
}

impl RatingPolicy {
    /// Find-edges blur at 50, brightness above 100, more than 1000 colors,
    /// at least 800x600, no clutter check.
    pub fn canonical() -> Self {
        Self {
            blur: BlurMethod::default(),
            brightness_threshold: BRIGHTNESS_THRESHOLD,
            color: ColorMethod::default(),
            resolution: ResolutionTier::Standard,
            clutter_threshold: None,
            deductions: Deductions::default(),
            cap_imperfect: false,
        }
    }

    /// Brighter and larger images required, clutter penalised, and only
    /// flawless images may reach 10.
    pub fn strict() -> Self {
        Self {
            brightness_threshold: STRICT_BRIGHTNESS_THRESHOLD,
            resolution: ResolutionTier::FullHd,
            clutter_threshold: Some(CLUTTER_THRESHOLD),
            cap_imperfect: true,
            ..Self::canonical()
        }
    }

    /// Laplacian blur check and channel-deviation colorfulness.
    pub fn laplacian() -> Self {
        Self {
            blur: BlurMethod::Laplacian {
                threshold: LAPLACIAN_BLUR_THRESHOLD,
            },
            color: ColorMethod::ChannelDeviation {
                threshold: CHANNEL_DEVIATION_THRESHOLD,
            },
            resolution: ResolutionTier::Hd,
            ..Self::canonical()
        }
    }

    /// Look up a named preset.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "canonical" | "default" => Some(Self::canonical()),
            "strict" => Some(Self::strict()),
            "laplacian" => Some(Self::laplacian()),
            _ => None,
        }
    }

    /// Names accepted by [`RatingPolicy::preset`].
    pub fn preset_names() -> &'static [&'static str] {
        &["canonical", "strict", "laplacian"]
    }

    /// Deductions enabled under this policy, in the order they are applied.
    pub fn active_deductions(&self) -> Vec<f32> {
        let d = &self.deductions;
        let mut active = vec![d.blurry, d.dark, d.dull, d.low_resolution];
        if self.clutter_threshold.is_some() {
            active.push(d.cluttered);
        }
        active
    }

    /// Reject deductions off the half-point grid or negative, and thresholds
    /// that are not finite.
    pub fn validate(&self) -> RaterResult<()> {
        let d = &self.deductions;
        for (name, value) in [
            ("blurry", d.blurry),
            ("dark", d.dark),
            ("dull", d.dull),
            ("low_resolution", d.low_resolution),
            ("cluttered", d.cluttered),
        ] {
            if !value.is_finite() || value < 0.0 || (value * 2.0).fract() != 0.0 {
                return Err(RaterError::Config(format!(
                    "deduction '{name}' must be a non-negative multiple of 0.5, got {value}"
                )));
            }
        }

        if !self.blur.threshold().is_finite() || !self.brightness_threshold.is_finite() {
            return Err(RaterError::Config("thresholds must be finite".to_string()));
        }
        if let ColorMethod::ChannelDeviation { threshold } = self.color {
            if !threshold.is_finite() {
                return Err(RaterError::Config(
                    "color deviation threshold must be finite".to_string(),
                ));
            }
        }
        if let Some(t) = self.clutter_threshold {
            if !t.is_finite() {
                return Err(RaterError::Config(
                    "clutter threshold must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Convert points to the nearest half-point count.
pub(crate) fn to_half_points(points: f32) -> i32 {
    (points * 2.0).round() as i32
}
