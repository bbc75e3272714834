// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Band splitting and global (Otsu) binarization helpers shared by the scorer
// and the black-key counter.

use image::imageops;
use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;

/// Split an image at row `floor(height · fraction)` into `(upper, lower)`.
///
/// Returns `None` when either band would be empty.
pub fn split_bands(image: &RgbImage, fraction: f32) -> Option<(RgbImage, RgbImage)> {
    let (width, height) = image.dimensions();
    let split = (height as f32 * fraction) as u32;
    if width == 0 || split == 0 || split >= height {
        return None;
    }
    let upper = imageops::crop_imm(image, 0, 0, width, split).to_image();
    let lower = imageops::crop_imm(image, 0, split, width, height - split).to_image();
    Some((upper, lower))
}

/// Luma conversion followed by a Gaussian blur.
pub fn blurred_luma(band: &RgbImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(&imageops::grayscale(band), sigma)
}

/// Binarize with the Otsu level of the image itself: pixels above the level
/// become 255, all others 0.
pub fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    threshold(gray, otsu_level(gray), ThresholdType::Binary)
}

/// Mean pixel intensity, 0 for an empty image.
pub fn mean_intensity(gray: &GrayImage) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
    sum as f64 / count as f64
}
