// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standard Hough transform with a configurable angular resolution.
//
// `imageproc::hough` fixes theta at one-degree bins; the line extractor needs
// to coarsen the angular resolution between attempts, so the accumulator is
// kept here with rho quantised to one pixel and theta to `theta_step_deg`.

use image::GrayImage;

use crate::geometry::PolarLine;

/// Voting and peak-suppression settings for [`detect_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoughOptions {
    /// Minimum votes for a cell to become a line.
    pub vote_threshold: u32,
    /// Half-window of the non-maximum suppression along rho, in pixels.
    pub suppression_radius_px: u32,
    /// Half-window of the non-maximum suppression along theta, in bins.
    pub suppression_radius_bins: u32,
}

/// Vote accumulator over `(theta, rho)` cells.
pub struct HoughAccumulator {
    votes: Vec<u32>,
    theta_bins: usize,
    rho_bins: usize,
    rho_offset: f32,
    theta_step: f32,
    cos_table: Vec<f32>,
    sin_table: Vec<f32>,
}

impl HoughAccumulator {
    /// Accumulator for a `width` x `height` image with `theta_step_deg`-wide
    /// angle bins covering `[0°, 180°)`.
    pub fn new(width: u32, height: u32, theta_step_deg: f32) -> Self {
        let theta_bins = ((180.0 / theta_step_deg).round() as usize).max(1);
        let theta_step = theta_step_deg.to_radians();
        let (sin_table, cos_table) = (0..theta_bins)
            .map(|t| (t as f32 * theta_step).sin_cos())
            .unzip();

        let diagonal = ((width as f32).powi(2) + (height as f32).powi(2)).sqrt();
        let rho_offset = diagonal.ceil();
        let rho_bins = 2 * rho_offset as usize + 1;

        Self {
            votes: vec![0; theta_bins * rho_bins],
            theta_bins,
            rho_bins,
            rho_offset,
            theta_step,
            cos_table,
            sin_table,
        }
    }

    pub fn theta_bins(&self) -> usize {
        self.theta_bins
    }

    /// Cast one vote per theta bin for every non-zero pixel of `edges`.
    pub fn accumulate(&mut self, edges: &GrayImage) {
        for (x, y, pixel) in edges.enumerate_pixels() {
            if pixel.0[0] == 0 {
                continue;
            }
            let (xf, yf) = (x as f32, y as f32);
            for t in 0..self.theta_bins {
                let rho = xf * self.cos_table[t] + yf * self.sin_table[t];
                let r = (rho + self.rho_offset).round() as usize;
                if r < self.rho_bins {
                    self.votes[t * self.rho_bins + r] += 1;
                }
            }
        }
    }

    #[inline]
    pub fn votes_at(&self, theta_bin: usize, rho_bin: usize) -> u32 {
        self.votes[theta_bin * self.rho_bins + rho_bin]
    }

    /// Local maxima with at least `vote_threshold` votes, strongest first.
    ///
    /// A cell survives suppression when no other cell in its window has more
    /// votes; on a plateau the cell earliest in `(theta, rho)` order wins, so
    /// every plateau yields exactly one line.
    pub fn peaks(&self, options: &HoughOptions) -> Vec<PolarLine> {
        let radius_r = options.suppression_radius_px as isize;
        let radius_t = options.suppression_radius_bins as isize;
        let mut peaks = Vec::new();

        for t in 0..self.theta_bins {
            for r in 0..self.rho_bins {
                let votes = self.votes_at(t, r);
                if votes == 0 || votes < options.vote_threshold {
                    continue;
                }
                if self.is_local_max(t, r, votes, radius_t, radius_r) {
                    peaks.push(PolarLine {
                        rho: r as f32 - self.rho_offset,
                        theta: t as f32 * self.theta_step,
                        votes,
                    });
                }
            }
        }

        peaks.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(a.theta.total_cmp(&b.theta))
                .then(a.rho.total_cmp(&b.rho))
        });
        peaks
    }

    fn is_local_max(&self, t: usize, r: usize, votes: u32, radius_t: isize, radius_r: isize) -> bool {
        for dt in -radius_t..=radius_t {
            let nt = t as isize + dt;
            if nt < 0 || nt >= self.theta_bins as isize {
                continue;
            }
            for dr in -radius_r..=radius_r {
                let nr = r as isize + dr;
                if (dt == 0 && dr == 0) || nr < 0 || nr >= self.rho_bins as isize {
                    continue;
                }
                let other = self.votes_at(nt as usize, nr as usize);
                let earlier = (nt, nr) < (t as isize, r as isize);
                if other > votes || (other == votes && earlier) {
                    return false;
                }
            }
        }
        true
    }
}

/// Run the Hough transform over a binary edge map.
pub fn detect_lines(edges: &GrayImage, theta_step_deg: f32, options: &HoughOptions) -> Vec<PolarLine> {
    let mut accumulator = HoughAccumulator::new(edges.width(), edges.height(), theta_step_deg);
    accumulator.accumulate(edges);
    accumulator.peaks(options)
}
