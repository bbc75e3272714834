// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for keyboard detection: points, boundary lines,
// quadrilateral hypotheses, and candidate scores.

use serde::{Deserialize, Serialize};

/// A 2D image coordinate. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Multiply both coordinates by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// A straight boundary line clipped to the working image.
///
/// `start` and `end` lie on opposite image borders. `rho` and `theta` are the
/// polar parameters the line was detected with (`x·cos θ + y·sin θ = ρ`,
/// θ in radians within `[0, π)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub rho: f32,
    pub theta: f32,
}

impl Line {
    pub fn new(start: Point, end: Point, rho: f32, theta: f32) -> Self {
        Self {
            start,
            end,
            rho,
            theta,
        }
    }

    /// Length of the clipped segment.
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }

    /// Polar angle in degrees.
    pub fn theta_degrees(&self) -> f32 {
        self.theta.to_degrees()
    }
}

/// Four corners of a candidate keyboard boundary.
///
/// When produced by `order_points` the corners are in canonical order:
/// top-left, top-right, bottom-right, bottom-left. A quadrilateral built with
/// [`Quadrilateral::from_corners`] carries no ordering guarantee, so consumers
/// that depend on the order must re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    corners: [Point; 4],
}

impl Quadrilateral {
    /// Wrap four corners as given, without reordering.
    pub const fn from_corners(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Side lengths as `[top, bottom, left, right]`, i.e. TL–TR, BR–BL, TL–BL, TR–BR.
    pub fn side_lengths(&self) -> [f32; 4] {
        let [tl, tr, br, bl] = self.corners;
        [
            tl.distance(&tr),
            br.distance(&bl),
            tl.distance(&bl),
            tr.distance(&br),
        ]
    }

    /// Length of the shortest side.
    pub fn min_side_length(&self) -> f32 {
        self.side_lengths()
            .into_iter()
            .fold(f32::INFINITY, f32::min)
    }

    pub fn is_finite(&self) -> bool {
        self.corners.iter().all(Point::is_finite)
    }

    /// Scale every corner by `factor`, e.g. to map working-image coordinates
    /// back onto the source frame.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            corners: self.corners.map(|p| p.scaled(factor)),
        }
    }
}

/// Why a rectified candidate was judged not to be a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotKeyboardReason {
    /// Too short (or too narrow) to split into analysable bands.
    TooSmall,
    /// The upper band did not binarise darker than the lower band.
    KeyBandNotDarker,
}

/// Keyboard-likeness verdict for a rectified candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateScore {
    /// Number of black-key blobs found in the key band.
    BlackKeys(u32),
    /// The candidate is unlikely to be a keyboard.
    NotKeyboard(NotKeyboardReason),
}

impl CandidateScore {
    /// Numeric value used when the score must be flattened to an integer.
    pub const NOT_KEYBOARD: i64 = -1;

    /// Black-key count, or [`Self::NOT_KEYBOARD`] for rejected candidates.
    pub fn value(&self) -> i64 {
        match self {
            Self::BlackKeys(count) => i64::from(*count),
            Self::NotKeyboard(_) => Self::NOT_KEYBOARD,
        }
    }

    pub fn black_keys(&self) -> Option<u32> {
        match self {
            Self::BlackKeys(count) => Some(*count),
            Self::NotKeyboard(_) => None,
        }
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, Self::BlackKeys(_))
    }
}

impl std::fmt::Display for CandidateScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlackKeys(count) => write!(f, "{count} black keys"),
            Self::NotKeyboard(reason) => write!(f, "not a keyboard ({reason:?})"),
        }
    }
}
