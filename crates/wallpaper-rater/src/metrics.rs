//! Image measurements behind each rating check.
//!
//! Every function here is pure. Images of any channel layout are converted to
//! 8-bit luma or RGB first, so each check is defined for every decodable image.

use std::collections::HashSet;

use image::{DynamicImage, GenericImageView, GrayImage, Luma, RgbImage};

use crate::policy::{BlurMethod, ColorMethod, RatingPolicy, ResolutionTier, CLUTTER_EDGE_LEVEL};
use crate::types::MetricFlags;

/// 3x3 find-edges kernel, row-major.
const FIND_EDGES_KERNEL: [i32; 9] = [-1, -1, -1, -1, 8, -1, -1, -1, -1];

/// Measure an image under the given policy.
///
/// Single-color images stop after the uniformity check.
pub fn extract(img: &DynamicImage, policy: &RatingPolicy) -> MetricFlags {
    let (width, height) = img.dimensions();
    let rgb = img.to_rgb8();

    if is_one_color_rgb(&rgb) {
        tracing::debug!("{width}x{height} image is a single color");
        return MetricFlags::uniform(width, height);
    }

    let gray = luma(&rgb);
    let edges = find_edges(&gray);

    let blur_variance = match policy.blur {
        BlurMethod::FindEdges { .. } => variance(&edges),
        BlurMethod::Laplacian { .. } => laplacian_variance(&gray),
    };
    let is_blurry = blur_variance < policy.blur.threshold();

    let brightness = mean_brightness_rgb(&rgb);
    let is_bright = brightness > policy.brightness_threshold;

    let (color_measure, is_colorful) = match policy.color {
        ColorMethod::UniqueColors { threshold } => {
            let count = unique_color_count_rgb(&rgb);
            (count as f64, count > threshold)
        }
        ColorMethod::ChannelDeviation { threshold } => {
            let deviation = channel_deviation_rgb(&rgb);
            (deviation, deviation > threshold)
        }
    };

    let has_good_resolution = has_good_resolution(width, height, policy.resolution);

    let (clutter_score, is_cluttered) = match policy.clutter_threshold {
        Some(threshold) => {
            let score = edge_density(&edges, CLUTTER_EDGE_LEVEL);
            (Some(score), score > threshold)
        }
        None => (None, false),
    };

    tracing::debug!(
        width,
        height,
        blur_variance,
        brightness,
        color_measure,
        ?clutter_score,
        "measured image"
    );

    MetricFlags {
        width,
        height,
        is_uniform: false,
        is_blurry,
        is_bright,
        is_colorful,
        has_good_resolution,
        blur_variance,
        brightness,
        color_measure,
        clutter_score,
        is_cluttered,
    }
}

/// True iff every pixel has the same RGB value.
pub fn is_one_color(img: &DynamicImage) -> bool {
    is_one_color_rgb(&img.to_rgb8())
}

fn is_one_color_rgb(rgb: &RgbImage) -> bool {
    let mut pixels = rgb.pixels();
    match pixels.next() {
        Some(first) => pixels.all(|p| p == first),
        None => false,
    }
}

/// Number of distinct RGB triples.
pub fn unique_color_count(img: &DynamicImage) -> usize {
    unique_color_count_rgb(&img.to_rgb8())
}

fn unique_color_count_rgb(rgb: &RgbImage) -> usize {
    rgb.pixels().map(|p| p.0).collect::<HashSet<[u8; 3]>>().len()
}

/// Mean intensity over every channel of every pixel, 0-255.
pub fn mean_brightness(img: &DynamicImage) -> f64 {
    mean_brightness_rgb(&img.to_rgb8())
}

fn mean_brightness_rgb(rgb: &RgbImage) -> f64 {
    let raw = rgb.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    let sum: u64 = raw.iter().map(|&v| v as u64).sum();
    sum as f64 / raw.len() as f64
}

/// Mean of the population standard deviations of the R, G and B channels.
pub fn channel_deviation(img: &DynamicImage) -> f64 {
    channel_deviation_rgb(&img.to_rgb8())
}

fn channel_deviation_rgb(rgb: &RgbImage) -> f64 {
    let n = (rgb.width() as u64 * rgb.height() as u64) as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    for pixel in rgb.pixels() {
        for c in 0..3 {
            let v = pixel.0[c] as f64;
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }

    let mut total = 0.0;
    for c in 0..3 {
        let mean = sum[c] / n;
        let var = (sum_sq[c] / n - mean * mean).max(0.0);
        total += var.sqrt();
    }
    total / 3.0
}

/// Whether the image meets the tier's minimum width and height.
pub fn has_good_resolution(width: u32, height: u32, tier: ResolutionTier) -> bool {
    let (min_w, min_h) = tier.min_dimensions();
    width >= min_w && height >= min_h
}

/// Convert RGB to 8-bit luma with ITU-R 601 weights (299/587/114).
///
/// Uses 16-bit fixed point with rounding, matching the blur and clutter
/// thresholds.
pub fn luma(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// Apply the find-edges kernel to a luma image.
///
/// Only interior pixels are filtered; the outermost rows and columns are
/// copied from the source unchanged. Results are clamped to 0..=255.
pub fn find_edges(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = gray.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = 0i32;
            for ky in 0..3u32 {
                for kx in 0..3u32 {
                    let k = FIND_EDGES_KERNEL[(ky * 3 + kx) as usize];
                    acc += k * gray.get_pixel(x + kx - 1, y + ky - 1).0[0] as i32;
                }
            }
            out.put_pixel(x, y, Luma([acc.clamp(0, 255) as u8]));
        }
    }
    out
}

/// Population variance of a luma image's pixel values.
pub fn variance(gray: &GrayImage) -> f64 {
    let raw = gray.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    let n = raw.len() as f64;
    let mean = raw.iter().map(|&v| v as f64).sum::<f64>() / n;
    raw.iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

/// Variance of the 4-neighbour Laplacian over interior pixels, unclamped.
///
/// Images narrower or shorter than 3 pixels have no interior and yield 0.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| gray.get_pixel(x, y).0[0] as f64;
    let mut values = Vec::with_capacity(((w - 2) * (h - 2)) as usize);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let lap = px(x - 1, y) + px(x + 1, y) + px(x, y - 1) + px(x, y + 1) - 4.0 * px(x, y);
            values.push(lap);
        }
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Mean of the edge map after binarising it to 0 or 255 at `level`.
pub fn edge_density(edges: &GrayImage, level: u8) -> f32 {
    let raw = edges.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    let edge_pixels = raw.iter().filter(|&&v| v >= level).count();
    (edge_pixels as f64 * 255.0 / raw.len() as f64) as f32
}
