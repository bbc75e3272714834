// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: warps a quadrilateral hypothesis into an
// axis-aligned, top-down rectangle.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use keybed_core::config::RectifyConfig;
use keybed_core::error::{KeybedError, Result};
use keybed_core::{CandidateScore, Quadrilateral};
use tracing::{debug, trace};

use crate::geometry::order_points;

/// Distance kept between a warp control point and the last pixel row or column.
/// Bilinear sampling needs a right and a lower neighbour, so a corner sitting
/// exactly on the border would sample the fill colour.
const BORDER_INSET: f32 = 0.01;

/// A top-down view of one quadrilateral hypothesis.
#[derive(Debug, Clone)]
pub struct RectifiedCandidate {
    image: RgbImage,
    /// Canonically ordered corners in working-image coordinates.
    source: Quadrilateral,
    score: Option<CandidateScore>,
}

impl RectifiedCandidate {
    /// Wrap an already rectified raster. The score starts unset.
    pub fn new(image: RgbImage, source: Quadrilateral) -> Self {
        Self {
            image,
            source,
            score: None,
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The quadrilateral this candidate was rectified from.
    pub fn source(&self) -> &Quadrilateral {
        &self.source
    }

    /// Score assigned by the scorer, `None` until scored.
    pub fn score(&self) -> Option<CandidateScore> {
        self.score
    }

    pub fn set_score(&mut self, score: CandidateScore) {
        self.score = Some(score);
    }

    /// Builder-style variant of [`RectifiedCandidate::set_score`].
    pub fn with_score(mut self, score: CandidateScore) -> Self {
        self.set_score(score);
        self
    }
}

/// Output size for a canonically ordered quadrilateral: the longer of the top
/// and bottom edges by the longer of the left and right edges, truncated to
/// whole pixels.
pub fn rectified_size(ordered: &Quadrilateral) -> (u32, u32) {
    let [top, bottom, left, right] = ordered.side_lengths();
    let width = (top as u32).max(bottom as u32);
    let height = (left as u32).max(right as u32);
    (width, height)
}

/// Whether any side of a canonically ordered quadrilateral is shorter than `min_side_length`.
pub fn is_degenerate(ordered: &Quadrilateral, min_side_length: f32) -> bool {
    ordered
        .side_lengths()
        .iter()
        .any(|&side| side < min_side_length)
}

/// Corners of `ordered` pulled inside the region bilinear sampling can read,
/// `[BORDER_INSET, dim - 1 - BORDER_INSET]` on both axes.
fn sampling_corners(ordered: &Quadrilateral, width: u32, height: u32) -> [(f32, f32); 4] {
    let x_max = (width as f32 - 1.0 - BORDER_INSET).max(BORDER_INSET);
    let y_max = (height as f32 - 1.0 - BORDER_INSET).max(BORDER_INSET);
    ordered
        .corners()
        .map(|p| (p.x.clamp(BORDER_INSET, x_max), p.y.clamp(BORDER_INSET, y_max)))
}

/// Warps quadrilateral hypotheses into rectangles.
#[derive(Debug, Clone, Default)]
pub struct PerspectiveRectifier {
    config: RectifyConfig,
}

impl PerspectiveRectifier {
    pub fn new(config: RectifyConfig) -> Self {
        Self { config }
    }

    /// Rectify `quad` out of `image`.
    ///
    /// The corner order of `quad` is not trusted and is re-derived. Returns
    /// `Ok(None)` for degenerate quadrilaterals (a side shorter than
    /// `min_side_length`, or no projective solution), and an error when the
    /// image is empty or a corner is not finite.
    pub fn rectify(
        &self,
        image: &RgbImage,
        quad: &Quadrilateral,
    ) -> Result<Option<RectifiedCandidate>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(KeybedError::InvalidFrame(format!(
                "cannot rectify from an empty {}x{} image",
                image.width(),
                image.height()
            )));
        }
        if !quad.is_finite() {
            return Err(KeybedError::InvalidQuadrilateral(format!(
                "corners must be finite, got {:?}",
                quad.corners()
            )));
        }

        let ordered = order_points(quad.corners());
        if is_degenerate(&ordered, self.config.min_side_length) {
            trace!(
                min_side = ordered.min_side_length(),
                "Degenerate quadrilateral rejected"
            );
            return Ok(None);
        }

        let (width, height) = rectified_size(&ordered);
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let (w, h) = ((width - 1) as f32, (height - 1) as f32);
        let destination = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let source = sampling_corners(&ordered, image.width(), image.height());

        let Some(projection) = Projection::from_control_points(source, destination) else {
            debug!(corners = ?ordered.corners(), "No projective transform for quadrilateral");
            return Ok(None);
        };

        let mut output = RgbImage::new(width, height);
        warp_into(
            image,
            &projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut output,
        );
        trace!(width, height, "Quadrilateral rectified");

        Ok(Some(RectifiedCandidate::new(output, ordered)))
    }
}
