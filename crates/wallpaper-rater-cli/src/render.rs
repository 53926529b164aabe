//! Text and JSON rendering of ratings, history, and caption tables.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use wallpaper_rater::{Assessment, CaptionTable, History, MetricFlags, Rating, RatingEntry, Score};

/// `Rating: <score> - <caption>`
pub fn rating_line(rating: &Rating) -> String {
    format!("Rating: {} - {}", rating.score, rating.caption)
}

/// One history row, numbered from 1.
pub fn entry_line(position: usize, entry: &RatingEntry) -> String {
    format!(
        "{position:>3}. {:>5}  {:<34} {}",
        entry.score.to_string(),
        entry.caption,
        entry.reference.source
    )
}

/// Whole history listing with a summary line.
pub fn history_listing(history: &History) -> Vec<String> {
    if history.is_empty() {
        return vec!["No ratings yet. Use /rate <image> to add one.".to_string()];
    }

    let mut lines: Vec<String> = history
        .list()
        .iter()
        .enumerate()
        .map(|(i, entry)| entry_line(i + 1, entry))
        .collect();

    let average = history.average_score().unwrap_or_default();
    lines.push(String::new());
    lines.push(format!(
        "{} rating(s), average {average:.2}, {} KiB of images held",
        history.len(),
        history.retained_bytes() / 1024
    ));
    lines
}

/// Measurements behind a rating.
pub fn metrics_lines(metrics: &MetricFlags) -> Vec<String> {
    if metrics.is_uniform {
        return vec![format!(
            "{}x{} single-color image, other checks skipped",
            metrics.width, metrics.height
        )];
    }

    let mark = |ok: bool| if ok { "pass" } else { "FAIL" };
    let mut lines = vec![
        format!(
            "Resolution  {:<4}  {}x{}",
            mark(metrics.has_good_resolution),
            metrics.width,
            metrics.height
        ),
        format!(
            "Sharpness   {:<4}  edge variance {:.1}",
            mark(!metrics.is_blurry),
            metrics.blur_variance
        ),
        format!(
            "Brightness  {:<4}  mean {:.1}",
            mark(metrics.is_bright),
            metrics.brightness
        ),
        format!(
            "Color       {:<4}  {:.1}",
            mark(metrics.is_colorful),
            metrics.color_measure
        ),
    ];
    if let Some(clutter) = metrics.clutter_score {
        lines.push(format!(
            "Clutter     {:<4}  edge density {clutter:.1}",
            mark(!metrics.is_cluttered)
        ));
    }
    lines
}

/// Caption table rows; reachable scores are starred and reachable scores
/// without a caption are listed after the table.
pub fn caption_listing(table: &CaptionTable, reachable: &BTreeSet<Score>) -> Vec<String> {
    let mut lines: Vec<String> = table
        .entries()
        .into_iter()
        .rev()
        .map(|(score, caption)| {
            let star = if reachable.contains(&score) { "*" } else { " " };
            format!("{star} {:>5}  {caption}", score.to_string())
        })
        .collect();

    let missing = table.missing(reachable.iter().copied());
    if !missing.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Reachable scores without a caption: {}",
            missing
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    lines
}

/// JSON object describing one rated file.
pub fn assessment_json(assessment: &Assessment) -> Value {
    json!({
        "source": assessment.reference.source,
        "score": assessment.rating.score,
        "caption": assessment.rating.caption,
        "failed_checks": assessment.metrics.failed_checks(),
        "metrics": assessment.metrics,
    })
}

/// JSON array of history entries.
pub fn history_json(history: &History) -> Value {
    json!(history.list())
}
