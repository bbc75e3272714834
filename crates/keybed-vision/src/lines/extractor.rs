// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary line extraction: self-tuning edges on a downscaled frame, then an
// angular-resolution search over the Hough transform.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use keybed_core::config::LineConfig;
use keybed_core::error::{KeybedError, Result};
use keybed_core::Line;
use tracing::{debug, info, instrument, warn};

use crate::geometry::{PolarLine, clip_to_frame};
use crate::lines::edges::detect_edges;
use crate::lines::hough::{HoughOptions, detect_lines};

/// Everything the extractor produced for one frame.
#[derive(Debug, Clone)]
pub struct LineExtraction {
    /// Downscaled copy of the frame. Line coordinates refer to this image.
    pub working: RgbImage,
    /// Binary Canny output of the working image.
    pub edges: GrayImage,
    /// Boundary lines clipped to the working image, strongest first.
    pub lines: Vec<Line>,
    /// Angular resolution the lines were found at, if any attempt found lines.
    pub theta_step_deg: Option<f32>,
    /// Number of Hough attempts made.
    pub attempts: u32,
}

/// Finds candidate keyboard boundary lines in a frame.
#[derive(Debug, Clone)]
pub struct LineExtractor {
    config: LineConfig,
}

impl LineExtractor {
    pub fn new(config: LineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    /// Convenience wrapper around [`LineExtractor::extract`] for `DynamicImage` frames.
    pub fn extract_dynamic(&self, frame: &DynamicImage) -> Result<LineExtraction> {
        self.extract(&frame.to_rgb8())
    }

    /// Extract boundary lines, discarding the intermediate images.
    pub fn extract_lines(&self, frame: &RgbImage) -> Result<Vec<Line>> {
        Ok(self.extract(frame)?.lines)
    }

    /// Run the full extraction on a frame.
    ///
    /// 1. Downscale by `downscale_factor`
    /// 2. Luma, Gaussian blur, Canny with median-derived thresholds
    /// 3. Hough at `initial_theta_step_deg`; while fewer than `min_line_count`
    ///    lines are found, coarsen by `theta_step_increment_deg` and retry, up to
    ///    `max_attempts`. The first attempt reaching the minimum wins, otherwise
    ///    the attempt with the most lines (the finer one on ties).
    /// 4. Drop lines with θ in `[0°, reject_angle_band_deg)` and keep the
    ///    strongest `max_line_count`
    /// 5. Clip each line to the working image borders
    ///
    /// A frame without usable edges yields an empty line list, not an error.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn extract(&self, frame: &RgbImage) -> Result<LineExtraction> {
        let working = self.downscale(frame)?;
        let gray = imageops::grayscale(&working);
        let edges = detect_edges(&gray, &self.config);

        let (theta_step_deg, polar, attempts) = self.search_resolution(&edges);
        let lines = self.boundary_lines(&polar, working.width(), working.height());

        if lines.is_empty() {
            warn!(attempts, "No boundary lines found");
        } else {
            info!(
                line_count = lines.len(),
                theta_step_deg,
                attempts,
                "Boundary lines extracted"
            );
        }

        Ok(LineExtraction {
            working,
            edges,
            lines,
            theta_step_deg,
            attempts,
        })
    }

    /// Resize the frame to the working scale.
    pub fn downscale(&self, frame: &RgbImage) -> Result<RgbImage> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(KeybedError::InvalidFrame(format!(
                "frame must be non-empty, got {width}x{height}"
            )));
        }

        let factor = self.config.downscale_factor;
        if factor >= 1.0 {
            return Ok(frame.clone());
        }
        let scaled_w = ((width as f32 * factor).round() as u32).max(1);
        let scaled_h = ((height as f32 * factor).round() as u32).max(1);
        debug!(scaled_w, scaled_h, "Downscaling frame");
        Ok(imageops::resize(frame, scaled_w, scaled_h, FilterType::Triangle))
    }

    /// Hough attempts at successively coarser angular resolution.
    ///
    /// Returns the resolution used (if any lines were found), its lines, and
    /// the number of attempts made.
    fn search_resolution(&self, edges: &GrayImage) -> (Option<f32>, Vec<PolarLine>, u32) {
        let options = HoughOptions {
            vote_threshold: self.config.vote_threshold,
            suppression_radius_px: self.config.suppression_radius_px,
            suppression_radius_bins: self.config.suppression_radius_bins,
        };
        self.search_with(|step| detect_lines(edges, step, &options))
    }

    /// Resolution search over any line detector taking a theta step in degrees.
    fn search_with<F>(&self, mut detect: F) -> (Option<f32>, Vec<PolarLine>, u32)
    where
        F: FnMut(f32) -> Vec<PolarLine>,
    {
        let mut best: Option<(f32, Vec<PolarLine>)> = None;
        let mut attempts = 0;
        for attempt in 0..self.config.max_attempts {
            attempts = attempt + 1;
            let step = self.config.theta_step_deg(attempt);
            let found = detect(step);
            debug!(attempt, theta_step_deg = step, line_count = found.len(), "Hough attempt");

            let enough = found.len() >= self.config.min_line_count;
            if best.as_ref().is_none_or(|(_, lines)| found.len() > lines.len()) {
                best = Some((step, found));
            }
            if enough {
                break;
            }
        }

        match best {
            Some((step, lines)) if !lines.is_empty() => (Some(step), lines, attempts),
            _ => (None, Vec::new(), attempts),
        }
    }

    /// Angle filter, line cap, and clipping.
    fn boundary_lines(&self, polar: &[PolarLine], width: u32, height: u32) -> Vec<Line> {
        let reject_below = self.config.reject_angle_band_deg;
        polar
            .iter()
            .filter(|line| !(0.0..reject_below).contains(&line.theta_degrees()))
            .take(self.config.max_line_count)
            .filter_map(|line| clip_to_frame(line, width, height, self.config.horizontal_tolerance_deg))
            .collect()
    }
}

impl Default for LineExtractor {
    fn default() -> Self {
        Self::new(LineConfig::default())
    }
}
