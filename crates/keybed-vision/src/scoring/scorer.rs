// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyboard likelihood scoring for rectified candidates.

use image::RgbImage;
use keybed_core::config::ScoringConfig;
use keybed_core::{CandidateScore, NotKeyboardReason};
use tracing::trace;

use super::bands::{binarize_otsu, blurred_luma, mean_intensity, split_bands};
use super::keys::{BlackKeyCounter, BlobKeyCounter};
use crate::rectify::RectifiedCandidate;

/// Scores rectified candidates by how much they look like a keyboard.
///
/// The upper `key_band_fraction` of the candidate is the key band, the rest
/// the front band. After Otsu binarization a keyboard's key band is darker on
/// average than its front band (the black keys live there); anything else is
/// not a keyboard. Keyboard-like candidates score their black-key count.
#[derive(Debug, Clone)]
pub struct CandidateScorer<C = BlobKeyCounter> {
    config: ScoringConfig,
    counter: C,
}

impl CandidateScorer<BlobKeyCounter> {
    pub fn new(config: ScoringConfig) -> Self {
        let counter = BlobKeyCounter::new(&config);
        Self { config, counter }
    }
}

impl Default for CandidateScorer<BlobKeyCounter> {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl<C: BlackKeyCounter> CandidateScorer<C> {
    /// Scorer with a custom black-key counter.
    pub fn with_counter(config: ScoringConfig, counter: C) -> Self {
        Self { config, counter }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Score a candidate without modifying it.
    pub fn score(&self, candidate: &RectifiedCandidate) -> CandidateScore {
        self.score_image(candidate.image())
    }

    /// Score a candidate and record the score on it.
    pub fn score_in_place(&self, candidate: &mut RectifiedCandidate) -> CandidateScore {
        let score = self.score(candidate);
        candidate.set_score(score);
        score
    }

    /// Score a rectified raster.
    pub fn score_image(&self, image: &RgbImage) -> CandidateScore {
        let (width, height) = image.dimensions();
        if width == 0 || height < self.config.min_candidate_height {
            trace!(width, height, "Candidate too small to score");
            return CandidateScore::NotKeyboard(NotKeyboardReason::TooSmall);
        }
        let Some((key_band, front_band)) = split_bands(image, self.config.key_band_fraction) else {
            return CandidateScore::NotKeyboard(NotKeyboardReason::TooSmall);
        };

        let key_mean = self.binary_mean(&key_band);
        let front_mean = self.binary_mean(&front_band);
        if key_mean >= front_mean {
            trace!(key_mean, front_mean, "Key band not darker than front band");
            return CandidateScore::NotKeyboard(NotKeyboardReason::KeyBandNotDarker);
        }

        let keys = self.counter.count_black_keys(&key_band);
        trace!(key_mean, front_mean, keys, "Candidate scored");
        CandidateScore::BlackKeys(keys)
    }

    fn binary_mean(&self, band: &RgbImage) -> f64 {
        mean_intensity(&binarize_otsu(&blurred_luma(band, self.config.blur_sigma)))
    }
}
