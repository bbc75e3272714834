// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration and the named tuning constants behind its defaults.

use serde::{Deserialize, Serialize};

use crate::error::{KeybedError, Result};

// -- Line extraction ----------------------------------------------------------

/// Scale applied to the frame to build the working copy.
pub const DOWNSCALE_FACTOR: f32 = 0.5;
/// Gaussian sigma applied to the working luma image before edge detection.
pub const EDGE_BLUR_SIGMA: f32 = 2.0;
/// Canny thresholds are `median * (1 - σ)` and `median * (1 + σ)`.
pub const AUTO_CANNY_SIGMA: f32 = 0.33;
/// Lower bound on both Canny thresholds. Keeps an all-black frame edge-free.
pub const MIN_EDGE_THRESHOLD: f32 = 1.0;
/// Minimum accumulator votes for a Hough peak.
pub const HOUGH_VOTE_THRESHOLD: u32 = 100;
/// Angular resolution of the first Hough attempt, in degrees.
pub const INITIAL_THETA_STEP_DEG: f32 = 2.0;
/// Amount the angular resolution is coarsened by after each attempt.
pub const THETA_STEP_INCREMENT_DEG: f32 = 1.0;
/// Maximum number of Hough attempts.
pub const MAX_RESOLUTION_ATTEMPTS: u32 = 10;
/// Line count that ends the resolution search.
pub const MIN_LINE_COUNT: usize = 30;
/// Lines kept after the search, strongest first. Bounds the pairwise search.
pub const MAX_LINE_COUNT: usize = 40;
/// Hough non-maximum suppression half-window along rho, in pixels.
pub const SUPPRESSION_RADIUS_PX: u32 = 8;
/// Hough non-maximum suppression half-window along theta, in bins.
pub const SUPPRESSION_RADIUS_BINS: u32 = 1;
/// Lines with a polar angle in `[0°, REJECT_ANGLE_BAND_DEG)` are discarded.
pub const REJECT_ANGLE_BAND_DEG: f32 = 30.0;
/// Lines within this many degrees of 90° are clipped against the left and right borders.
pub const HORIZONTAL_TOLERANCE_DEG: f32 = 5.0;

// -- Rectification -------------------------------------------------------------

/// Quadrilaterals with any side shorter than this are degenerate.
pub const MIN_SIDE_LENGTH: f32 = 20.0;

// -- Scoring -------------------------------------------------------------------

/// Rectified candidates shorter than this are never keyboards.
pub const MIN_CANDIDATE_HEIGHT: u32 = 10;
/// Share of the candidate height that forms the upper (key) band.
pub const KEY_BAND_FRACTION: f32 = 2.0 / 3.0;
/// Gaussian sigma applied to each band before Otsu thresholding.
pub const SCORE_BLUR_SIGMA: f32 = 1.1;
/// Smallest black-key blob, as a fraction of the key band's area.
pub const MIN_KEY_AREA_FRACTION: f32 = 0.002;
/// Smallest height/width ratio of a black-key blob's bounding box.
pub const MIN_KEY_ASPECT: f32 = 1.0;

/// Edge detection and Hough line search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub downscale_factor: f32,
    pub blur_sigma: f32,
    pub auto_canny_sigma: f32,
    pub min_edge_threshold: f32,
    pub vote_threshold: u32,
    pub initial_theta_step_deg: f32,
    pub theta_step_increment_deg: f32,
    pub max_attempts: u32,
    pub min_line_count: usize,
    pub max_line_count: usize,
    pub suppression_radius_px: u32,
    pub suppression_radius_bins: u32,
    pub reject_angle_band_deg: f32,
    pub horizontal_tolerance_deg: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            downscale_factor: DOWNSCALE_FACTOR,
            blur_sigma: EDGE_BLUR_SIGMA,
            auto_canny_sigma: AUTO_CANNY_SIGMA,
            min_edge_threshold: MIN_EDGE_THRESHOLD,
            vote_threshold: HOUGH_VOTE_THRESHOLD,
            initial_theta_step_deg: INITIAL_THETA_STEP_DEG,
            theta_step_increment_deg: THETA_STEP_INCREMENT_DEG,
            max_attempts: MAX_RESOLUTION_ATTEMPTS,
            min_line_count: MIN_LINE_COUNT,
            max_line_count: MAX_LINE_COUNT,
            suppression_radius_px: SUPPRESSION_RADIUS_PX,
            suppression_radius_bins: SUPPRESSION_RADIUS_BINS,
            reject_angle_band_deg: REJECT_ANGLE_BAND_DEG,
            horizontal_tolerance_deg: HORIZONTAL_TOLERANCE_DEG,
        }
    }
}

impl LineConfig {
    /// Angular resolution used by the zero-based Hough `attempt`.
    pub fn theta_step_deg(&self, attempt: u32) -> f32 {
        self.initial_theta_step_deg + attempt as f32 * self.theta_step_increment_deg
    }
}

/// Perspective rectification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyConfig {
    pub min_side_length: f32,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            min_side_length: MIN_SIDE_LENGTH,
        }
    }
}

/// Candidate scoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub min_candidate_height: u32,
    pub key_band_fraction: f32,
    pub blur_sigma: f32,
    pub min_key_area_fraction: f32,
    pub min_key_aspect: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_candidate_height: MIN_CANDIDATE_HEIGHT,
            key_band_fraction: KEY_BAND_FRACTION,
            blur_sigma: SCORE_BLUR_SIGMA,
            min_key_area_fraction: MIN_KEY_AREA_FRACTION,
            min_key_aspect: MIN_KEY_ASPECT,
        }
    }
}

/// Complete detector settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub lines: LineConfig,
    pub rectify: RectifyConfig,
    pub scoring: ScoringConfig,
}

impl DetectorConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make a pipeline stage meaningless or panic.
    pub fn validate(&self) -> Result<()> {
        let lines = &self.lines;
        if !(lines.downscale_factor > 0.0 && lines.downscale_factor <= 1.0) {
            return Err(invalid(format!(
                "downscale_factor must be in (0, 1], got {}",
                lines.downscale_factor
            )));
        }
        positive("lines.blur_sigma", lines.blur_sigma)?;
        positive("lines.initial_theta_step_deg", lines.initial_theta_step_deg)?;
        if !(lines.theta_step_increment_deg >= 0.0) {
            return Err(invalid(format!(
                "theta_step_increment_deg must be non-negative, got {}",
                lines.theta_step_increment_deg
            )));
        }
        if lines.max_attempts == 0 {
            return Err(invalid("max_attempts must be at least 1".into()));
        }
        if lines.theta_step_deg(lines.max_attempts - 1) >= 180.0 {
            return Err(invalid(format!(
                "angular resolution reaches {}° within {} attempts; it must stay below 180°",
                lines.theta_step_deg(lines.max_attempts - 1),
                lines.max_attempts
            )));
        }
        if !(0.0..1.0).contains(&lines.auto_canny_sigma) {
            return Err(invalid(format!(
                "auto_canny_sigma must be in [0, 1), got {}",
                lines.auto_canny_sigma
            )));
        }
        if lines.max_line_count == 0 {
            return Err(invalid("max_line_count must be at least 1".into()));
        }

        if !(self.rectify.min_side_length >= 0.0) {
            return Err(invalid(format!(
                "min_side_length must be non-negative, got {}",
                self.rectify.min_side_length
            )));
        }

        let scoring = &self.scoring;
        if !(scoring.key_band_fraction > 0.0 && scoring.key_band_fraction < 1.0) {
            return Err(invalid(format!(
                "key_band_fraction must be in (0, 1), got {}",
                scoring.key_band_fraction
            )));
        }
        positive("scoring.blur_sigma", scoring.blur_sigma)?;
        if !(scoring.min_key_area_fraction >= 0.0 && scoring.min_key_aspect >= 0.0) {
            return Err(invalid(
                "min_key_area_fraction and min_key_aspect must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

fn invalid(message: String) -> KeybedError {
    KeybedError::InvalidConfig(message)
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_built_from_constants() {
        let config = DetectorConfig::default();
        assert_eq!(config.rectify.min_side_length, MIN_SIDE_LENGTH);
        assert_eq!(config.scoring.min_candidate_height, MIN_CANDIDATE_HEIGHT);
        assert_eq!(config.lines.reject_angle_band_deg, REJECT_ANGLE_BAND_DEG);
        assert_eq!(config.lines.max_attempts, MAX_RESOLUTION_ATTEMPTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn theta_step_coarsens_per_attempt() {
        let lines = LineConfig::default();
        assert_eq!(lines.theta_step_deg(0), 2.0);
        assert_eq!(lines.theta_step_deg(9), 11.0);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config =
            DetectorConfig::from_json_str(r#"{ "rectify": { "min_side_length": 12.5 } }"#)
                .expect("valid json");
        assert_eq!(config.rectify.min_side_length, 12.5);
        assert_eq!(config.lines, LineConfig::default());
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut config = DetectorConfig::default();
        config.lines.vote_threshold = 64;
        let json = config.to_json_pretty().expect("serialize");
        assert_eq!(DetectorConfig::from_json_str(&json).expect("parse"), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = DetectorConfig::default();
        config.lines.blur_sigma = 0.0;
        assert!(matches!(config.validate(), Err(KeybedError::InvalidConfig(_))));

        let mut config = DetectorConfig::default();
        config.scoring.key_band_fraction = 1.0;
        assert!(matches!(config.validate(), Err(KeybedError::InvalidConfig(_))));

        let mut config = DetectorConfig::default();
        config.lines.downscale_factor = 1.5;
        assert!(matches!(config.validate(), Err(KeybedError::InvalidConfig(_))));

        let mut config = DetectorConfig::default();
        config.lines.theta_step_increment_deg = 30.0;
        assert!(matches!(config.validate(), Err(KeybedError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = DetectorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, KeybedError::Serialization(_)));
    }

    #[test]
    fn load_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "scoring": {{ "min_candidate_height": 16 }} }}"#).expect("write");

        let config = DetectorConfig::load(file.path()).expect("load");
        assert_eq!(config.scoring.min_candidate_height, 16);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = DetectorConfig::load("/nonexistent/keybed.json").unwrap_err();
        assert!(matches!(err, KeybedError::Io(_)));
    }
}
