//! End-to-end rating tests: encoded bytes in, score and caption out.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use wallpaper_rater::{
    reachable_scores, CaptionTable, History, Rater, RaterError, RatingPolicy, Score,
    FALLBACK_CAPTION,
};

// ─────────────────────── helpers ───────────────────────

fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    img.write_with_encoder(encoder).unwrap();
    buf
}

/// Large, bright, many colors, with a fine checker layer for sharp edges.
fn sharp_photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let fine = if (x + y) % 2 == 0 { 255 } else { 0 };
        Rgb([(x % 256) as u8, (y % 256) as u8, fine])
    }))
}

/// Small, dark, smooth, and nearly monochrome.
fn dim_photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        Rgb([(x / 40) as u8, 0, 0])
    }))
}

// ═══════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════

#[test]
fn solid_red_pixel_scores_zero() {
    let rater = Rater::default();
    let bytes = png_bytes(&DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]))));
    let assessment = rater.rate_bytes(bytes, "red.png").unwrap();

    assert!(assessment.metrics.is_uniform);
    assert_eq!(assessment.rating.score, Score::ZERO);
    assert_eq!(
        assessment.rating.caption,
        CaptionTable::default().caption_for(Score::ZERO)
    );
}

#[test]
fn uniform_images_score_zero_at_any_size() {
    let rater = Rater::default();
    for (w, h) in [(1, 1), (3000, 2), (1920, 1080)] {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([250])));
        let assessment = rater.rate_bytes(png_bytes(&img), "flat.png").unwrap();
        assert_eq!(assessment.rating.score, Score::ZERO, "{w}x{h}");
    }
}

#[test]
fn sharp_bright_colorful_full_hd_scores_ten() {
    let rater = Rater::default();
    let assessment = rater
        .rate_bytes(png_bytes(&sharp_photo(1920, 1080)), "photo.png")
        .unwrap();

    let m = &assessment.metrics;
    assert!(!m.is_blurry, "blur variance {}", m.blur_variance);
    assert!(m.is_bright, "brightness {}", m.brightness);
    assert!(m.is_colorful, "colors {}", m.color_measure);
    assert!(m.has_good_resolution);
    assert_eq!(assessment.rating.score, Score::MAX);
    assert_eq!(assessment.rating.caption, "W Wallpaper 💯");
}

#[test]
fn dim_low_color_small_photo_takes_every_deduction() {
    let rater = Rater::default();
    let assessment = rater
        .rate_bytes(png_bytes(&dim_photo(400, 300)), "dim.png")
        .unwrap();

    let m = &assessment.metrics;
    assert!(m.is_blurry);
    assert!(!m.is_bright);
    assert!(!m.is_colorful);
    assert!(!m.has_good_resolution);
    // 10 - 3 - 2 - 2.5 - 2
    assert_eq!(assessment.rating.score.value(), 0.5);
}

#[test]
fn rating_is_idempotent() {
    let rater = Rater::new(RatingPolicy::strict(), CaptionTable::default()).unwrap();
    let bytes = png_bytes(&sharp_photo(320, 200));
    let first = rater.rate_bytes(bytes.clone(), "a.png").unwrap();
    let second = rater.rate_bytes(bytes, "a.png").unwrap();
    assert_eq!(first.rating, second.rating);
    assert_eq!(first.metrics, second.metrics);
}

#[test]
fn scores_stay_in_reachable_set_across_presets() {
    let images = [sharp_photo(900, 700), dim_photo(400, 300), sharp_photo(64, 64)];
    for name in RatingPolicy::preset_names() {
        let policy = RatingPolicy::preset(name).unwrap();
        let reachable = reachable_scores(&policy);
        let rater = Rater::new(policy, CaptionTable::default()).unwrap();
        for img in &images {
            let (rating, _) = rater.rate_image(img);
            assert!(reachable.contains(&rating.score), "{name}: {}", rating.score);
            assert_ne!(rating.caption, FALLBACK_CAPTION);
        }
    }
}

#[test]
fn jpeg_input_is_accepted() {
    let img = sharp_photo(64, 48);
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    img.to_rgb8().write_with_encoder(encoder).unwrap();

    let assessment = Rater::default().rate_bytes(buf, "photo.jpg").unwrap();
    assert!(!assessment.metrics.has_good_resolution);
}

// ═══════════════════════════════════════════════════════
// HISTORY
// ═══════════════════════════════════════════════════════

#[test]
fn history_tracks_session_ratings() {
    let rater = Rater::default();
    let mut history = History::new();

    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");
    std::fs::write(&first, png_bytes(&dim_photo(400, 300))).unwrap();
    std::fs::write(&second, png_bytes(&DynamicImage::new_rgb8(8, 8))).unwrap();

    rater.record_file(first.to_str().unwrap(), &mut history).unwrap();
    rater.record_file(second.to_str().unwrap(), &mut history).unwrap();
    assert_eq!(history.len(), 2);

    history.delete(0);
    assert_eq!(history.len(), 1);
    assert_eq!(history.list()[0].score, Score::ZERO);
    assert!(history.list()[0].reference.source.to_string().ends_with("second.png"));

    history.delete(5);
    assert_eq!(history.len(), 1);

    history.clear();
    assert!(history.list().is_empty());
}

#[test]
fn unreadable_file_leaves_history_untouched() {
    let rater = Rater::default();
    let mut history = History::new();

    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"not a png at all").unwrap();

    let err = rater
        .record_file(bogus.to_str().unwrap(), &mut history)
        .unwrap_err();
    assert!(matches!(err, RaterError::Decode(_)));

    let missing = dir.path().join("missing.png");
    let err = rater
        .record_file(missing.to_str().unwrap(), &mut history)
        .unwrap_err();
    assert!(matches!(err, RaterError::Io(_)));

    assert!(history.is_empty());
}
