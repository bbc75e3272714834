// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering for quadrilateral hypotheses.

use std::cmp::Ordering;

use keybed_core::{Point, Quadrilateral};

/// Order four points as top-left, top-right, bottom-right, bottom-left.
///
/// The two points with the smallest `y` form the top edge and the other two the
/// bottom edge; within each edge the smaller `x` comes first. Equal `y` values
/// are broken by `x` ascending, so the result is deterministic for any input
/// order.
pub fn order_points(points: [Point; 4]) -> Quadrilateral {
    let mut sorted = points;
    sorted.sort_by(by_y_then_x);

    let (top, bottom) = sorted.split_at_mut(2);
    top.sort_by(by_x_then_y);
    bottom.sort_by(by_x_then_y);

    Quadrilateral::from_corners([top[0], top[1], bottom[1], bottom[0]])
}

fn by_y_then_x(a: &Point, b: &Point) -> Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}

fn by_x_then_y(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}
