// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Black-key counting over the upper (key) band of a rectified candidate.

use std::collections::BTreeMap;

use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::{Connectivity, connected_components};
use keybed_core::config::ScoringConfig;
use serde::Serialize;

use super::bands::{binarize_otsu, blurred_luma};

/// Counts black keys in the key band of a rectified candidate.
///
/// Implementations must be deterministic: the same band always gives the same
/// count. Scoring calls them from several threads at once.
pub trait BlackKeyCounter: Send + Sync {
    fn count_black_keys(&self, band: &RgbImage) -> u32;
}

impl<F> BlackKeyCounter for F
where
    F: Fn(&RgbImage) -> u32 + Send + Sync,
{
    fn count_black_keys(&self, band: &RgbImage) -> u32 {
        self(band)
    }
}

/// Bounding box and pixel area of one dark connected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyBlob {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub area: u32,
}

impl KeyBlob {
    fn seed(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
            area: 0,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        let right = (self.x + self.width).max(x + 1);
        let bottom = (self.y + self.height).max(y + 1);
        self.x = self.x.min(x);
        self.y = self.y.min(y);
        self.width = right - self.x;
        self.height = bottom - self.y;
        self.area += 1;
    }

    /// Whether the bounding box reaches column 0 or the last column of a band
    /// `band_width` pixels wide.
    pub fn touches_side(&self, band_width: u32) -> bool {
        self.x == 0 || self.x + self.width >= band_width
    }

    /// Height over width of the bounding box.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

/// Counts dark, upright connected regions after Otsu binarization.
///
/// A region counts as a key when it covers at least `min_key_area_fraction`
/// of the band and its bounding box is at least `min_key_aspect` times as tall
/// as it is wide. Wide dark strips (shadows, the fallboard) fail the aspect test.
/// Regions touching the left or right edge of the band are ignored: a key is
/// always flanked by white keys, while warp padding and the keyboard cheeks sit
/// on the edge.
#[derive(Debug, Clone)]
pub struct BlobKeyCounter {
    blur_sigma: f32,
    min_area_fraction: f32,
    min_aspect: f32,
}

impl BlobKeyCounter {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            blur_sigma: config.blur_sigma,
            min_area_fraction: config.min_key_area_fraction,
            min_aspect: config.min_key_aspect,
        }
    }

    /// The dark regions that qualify as keys, ordered by label.
    pub fn key_blobs(&self, band: &RgbImage) -> Vec<KeyBlob> {
        let (width, height) = band.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let binary = binarize_otsu(&blurred_luma(band, self.blur_sigma));
        let dark = GrayImage::from_fn(width, height, |x, y| {
            if binary.get_pixel(x, y).0[0] == 0 { Luma([255]) } else { Luma([0]) }
        });
        let labels = connected_components(&dark, Connectivity::Four, Luma([0u8]));

        let mut blobs: BTreeMap<u32, KeyBlob> = BTreeMap::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label.0[0];
            if label == 0 {
                continue;
            }
            blobs
                .entry(label)
                .or_insert_with(|| KeyBlob::seed(x, y))
                .include(x, y);
        }

        let min_area = self.min_area_fraction * (width as f32 * height as f32);
        blobs
            .into_values()
            .filter(|blob| {
                blob.area as f32 >= min_area
                    && blob.aspect() >= self.min_aspect
                    && !blob.touches_side(width)
            })
            .collect()
    }
}

impl Default for BlobKeyCounter {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl BlackKeyCounter for BlobKeyCounter {
    fn count_black_keys(&self, band: &RgbImage) -> u32 {
        self.key_blobs(band).len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// White band with `count` dark bars, each 10 px wide, spread evenly.
    fn band_with_bars(width: u32, height: u32, count: u32) -> RgbImage {
        let mut band = RgbImage::from_pixel(width, height, Rgb([230, 230, 230]));
        for i in 0..count {
            let centre = (i + 1) * width / (count + 1);
            for y in 5..height - 10 {
                for x in centre - 5..centre + 5 {
                    band.put_pixel(x, y, Rgb([20, 20, 20]));
                }
            }
        }
        band
    }

    #[test]
    fn counts_upright_bars() {
        let counter = BlobKeyCounter::default();
        for count in [1, 2, 5, 7] {
            let band = band_with_bars(240, 60, count);
            assert_eq!(counter.count_black_keys(&band), count, "{count} bars");
        }
    }

    #[test]
    fn blobs_are_tall_and_narrow() {
        let blobs = BlobKeyCounter::default().key_blobs(&band_with_bars(240, 60, 3));
        assert_eq!(blobs.len(), 3);
        for blob in blobs {
            assert!(blob.aspect() > 3.0, "{blob:?}");
            assert!((6..=14).contains(&blob.width), "{blob:?}");
        }
    }

    #[test]
    fn white_band_has_no_keys() {
        let band = RgbImage::from_pixel(120, 40, Rgb([230, 230, 230]));
        assert_eq!(BlobKeyCounter::default().count_black_keys(&band), 0);
    }

    #[test]
    fn wide_dark_strip_is_not_a_key() {
        let mut band = RgbImage::from_pixel(200, 60, Rgb([230, 230, 230]));
        for y in 0..12 {
            for x in 0..200 {
                band.put_pixel(x, y, Rgb([15, 15, 15]));
            }
        }
        assert_eq!(BlobKeyCounter::default().count_black_keys(&band), 0);
    }

    #[test]
    fn dark_columns_on_the_sides_are_not_keys() {
        let mut band = band_with_bars(240, 60, 3);
        for y in 0..60 {
            for x in (0..2).chain(237..240) {
                band.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let blobs = BlobKeyCounter::default().key_blobs(&band);
        assert_eq!(blobs.len(), 3, "{blobs:?}");
        assert!(blobs.iter().all(|blob| !blob.touches_side(240)));
    }

    #[test]
    fn side_contact_is_measured_on_the_bounding_box() {
        let inner = KeyBlob { x: 1, y: 0, width: 10, height: 30, area: 300 };
        assert!(!inner.touches_side(12));
        assert!(inner.touches_side(11));
        assert!(KeyBlob { x: 0, ..inner }.touches_side(100));
    }

    #[test]
    fn area_floor_scales_with_band() {
        let band = band_with_bars(240, 60, 2);
        let strict = BlobKeyCounter::new(&ScoringConfig {
            min_key_area_fraction: 0.5,
            ..ScoringConfig::default()
        });
        assert_eq!(strict.count_black_keys(&band), 0);
    }

    #[test]
    fn closures_are_counters() {
        let fixed = |_: &RgbImage| 36u32;
        assert_eq!(fixed.count_black_keys(&RgbImage::new(4, 4)), 36);
    }

    #[test]
    fn empty_band_has_no_keys() {
        assert!(BlobKeyCounter::default().key_blobs(&RgbImage::new(0, 0)).is_empty());
    }
}
