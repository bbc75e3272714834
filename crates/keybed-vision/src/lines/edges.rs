// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Self-tuning edge detection: Canny thresholds derived from the median
// intensity of the blurred working image.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use keybed_core::config::LineConfig;
use tracing::debug;

/// Hysteresis thresholds handed to the Canny detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
}

/// Median pixel intensity. Even-sized images average the two middle values.
pub fn median_intensity(gray: &GrayImage) -> f32 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = gray.width() as u64 * gray.height() as u64;
    if total == 0 {
        return 0.0;
    }

    let upper = nth_intensity(&histogram, total / 2);
    if total % 2 == 1 {
        upper as f32
    } else {
        let lower = nth_intensity(&histogram, total / 2 - 1);
        (lower as f32 + upper as f32) / 2.0
    }
}

/// Intensity of the zero-based `rank`-th pixel in sorted order.
fn nth_intensity(histogram: &[u64; 256], rank: u64) -> u8 {
    let mut seen = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > rank {
            return value as u8;
        }
    }
    u8::MAX
}

/// Derive Canny thresholds from the image median: `median·(1 − σ)` and
/// `median·(1 + σ)`, clamped to `[floor, 255]`.
pub fn auto_canny_thresholds(median: f32, sigma: f32, floor: f32) -> EdgeThresholds {
    let low = ((1.0 - sigma) * median).clamp(0.0, 255.0).max(floor);
    let high = ((1.0 + sigma) * median).clamp(0.0, 255.0).max(low);
    EdgeThresholds { low, high }
}

/// Blur the working luma image and run Canny with median-derived thresholds.
///
/// Images too small to have an interior yield an empty edge map.
pub fn detect_edges(gray: &GrayImage, config: &LineConfig) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let blurred = gaussian_blur_f32(gray, config.blur_sigma);
    let median = median_intensity(&blurred);
    let thresholds = auto_canny_thresholds(median, config.auto_canny_sigma, config.min_edge_threshold);
    debug!(
        median,
        low = thresholds.low,
        high = thresholds.high,
        "Auto-Canny thresholds computed"
    );

    canny(&blurred, thresholds.low, thresholds.high)
}
