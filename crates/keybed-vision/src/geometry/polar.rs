// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Polar (Hough) line helpers: boundary intersections and clipping an infinite
// line to the working image.

use keybed_core::{Line, Point};

/// Denominators below this magnitude are treated as zero.
const EPS: f32 = 1e-6;

/// A line in Hough form, `x·cos θ + y·sin θ = ρ`, with θ in radians in `[0, π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarLine {
    pub rho: f32,
    pub theta: f32,
    /// Accumulator votes the line was detected with.
    pub votes: u32,
}

impl PolarLine {
    pub fn theta_degrees(&self) -> f32 {
        self.theta.to_degrees()
    }
}

/// A fixed coordinate on one image axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// The vertical line `x = value`.
    Column(f32),
    /// The horizontal line `y = value`.
    Row(f32),
}

/// Intersect a polar line with a boundary and return the coordinate on the
/// other axis: `y` for a [`Boundary::Column`], `x` for a [`Boundary::Row`].
///
/// Returns `None` when the line is parallel to the boundary.
pub fn line_boundary_intersection(rho: f32, theta: f32, boundary: Boundary) -> Option<f32> {
    let (sin_t, cos_t) = theta.sin_cos();
    match boundary {
        Boundary::Column(x) => (sin_t.abs() > EPS).then(|| (rho - x * cos_t) / sin_t),
        Boundary::Row(y) => (cos_t.abs() > EPS).then(|| (rho - y * sin_t) / cos_t),
    }
}

/// Whether a line's polar angle lies within `tolerance_deg` of 90°, i.e. the
/// line itself runs close to horizontal.
pub fn is_near_horizontal(theta: f32, tolerance_deg: f32) -> bool {
    (90.0 - theta.to_degrees()).abs() <= tolerance_deg
}

/// Clip a polar line to a `width` x `height` image.
///
/// Near-horizontal lines are evaluated as `y(x)` at the left and right borders;
/// all others as `x(y)` at the top and bottom borders.
pub fn clip_to_frame(
    line: &PolarLine,
    width: u32,
    height: u32,
    horizontal_tolerance_deg: f32,
) -> Option<Line> {
    let (start, end) = if is_near_horizontal(line.theta, horizontal_tolerance_deg) {
        let x_max = width.saturating_sub(1) as f32;
        let y0 = line_boundary_intersection(line.rho, line.theta, Boundary::Column(0.0))?;
        let y1 = line_boundary_intersection(line.rho, line.theta, Boundary::Column(x_max))?;
        (Point::new(0.0, y0), Point::new(x_max, y1))
    } else {
        let y_max = height.saturating_sub(1) as f32;
        let x0 = line_boundary_intersection(line.rho, line.theta, Boundary::Row(0.0))?;
        let x1 = line_boundary_intersection(line.rho, line.theta, Boundary::Row(y_max))?;
        (Point::new(x0, 0.0), Point::new(x1, y_max))
    };
    Some(Line::new(start, end, line.rho, line.theta))
}
