//! Turns measurements into a score and caption.

use std::collections::BTreeSet;

use crate::captions::CaptionTable;
use crate::policy::{to_half_points, RatingPolicy, BASE_SCORE, IMPERFECT_CAP};
use crate::types::{MetricFlags, Rating, Score};

/// Score an image's measurements.
///
/// Starts from 10 and subtracts each failed check's deduction, then clamps
/// to [-10, 10]. Single-color images score 0 outright.
pub fn score(flags: &MetricFlags, policy: &RatingPolicy) -> Score {
    if flags.is_uniform {
        return Score::ZERO;
    }

    let d = &policy.deductions;
    let failed = [
        (flags.is_blurry, d.blurry),
        (!flags.is_bright, d.dark),
        (!flags.is_colorful, d.dull),
        (!flags.has_good_resolution, d.low_resolution),
        (
            policy.clutter_threshold.is_some() && flags.is_cluttered,
            d.cluttered,
        ),
    ];

    let mut total = to_half_points(BASE_SCORE);
    let mut any_failed = false;
    for (hit, penalty) in failed {
        if hit {
            total -= to_half_points(penalty);
            any_failed = true;
        }
    }

    finish(total, any_failed, policy)
}

fn finish(total_half_points: i32, any_failed: bool, policy: &RatingPolicy) -> Score {
    let score = Score::from_half_points(total_half_points);
    if policy.cap_imperfect && any_failed {
        score.min(Score::from_half_points(to_half_points(IMPERFECT_CAP)))
    } else {
        score
    }
}

/// Score an image's measurements and look up the caption.
pub fn rate(flags: &MetricFlags, policy: &RatingPolicy, captions: &CaptionTable) -> Rating {
    let score = score(flags, policy);
    Rating {
        score,
        caption: captions.caption_for(score).to_string(),
    }
}

/// Every score the policy can produce, including 0 for single-color images.
pub fn reachable_scores(policy: &RatingPolicy) -> BTreeSet<Score> {
    let penalties: Vec<i32> = policy
        .active_deductions()
        .into_iter()
        .map(to_half_points)
        .collect();

    let mut scores = BTreeSet::new();
    scores.insert(Score::ZERO);

    let base = to_half_points(BASE_SCORE);
    for mask in 0u32..(1 << penalties.len()) {
        let deducted: i32 = penalties
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, p)| p)
            .sum();
        scores.insert(finish(base - deducted, mask != 0, policy));
    }
    scores
}
