// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral hypotheses from pairs of boundary lines.

use keybed_core::{Line, Quadrilateral};

use crate::geometry::order_points;

/// Lazily yields one quadrilateral per unordered pair of distinct lines, in
/// `(i, j)` order with `i < j`.
///
/// Each quadrilateral is the four clipped endpoints of the pair, put in
/// canonical corner order. Geometrically identical quadrilaterals from
/// different pairs are not deduplicated.
#[derive(Debug, Clone)]
pub struct Hypotheses<'a> {
    lines: &'a [Line],
    i: usize,
    j: usize,
}

impl Iterator for Hypotheses<'_> {
    type Item = Quadrilateral;

    fn next(&mut self) -> Option<Self::Item> {
        if self.j >= self.lines.len() {
            self.i += 1;
            self.j = self.i + 1;
        }
        if self.j >= self.lines.len() {
            return None;
        }
        let (a, b) = (&self.lines[self.i], &self.lines[self.j]);
        self.j += 1;
        Some(order_points([a.start, a.end, b.start, b.end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = remaining_pairs(self.lines.len(), self.i, self.j);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Hypotheses<'_> {}

/// Pairs still to be produced when the cursor stands at `(i, j)`.
fn remaining_pairs(n: usize, i: usize, j: usize) -> usize {
    if i >= n {
        return 0;
    }
    let in_current_row = n.saturating_sub(j);
    let rows_after = n - i - 1;
    in_current_row + rows_after * rows_after.saturating_sub(1) / 2
}

/// Number of hypotheses `lines` produce: `n·(n − 1) / 2`.
pub fn hypothesis_count(line_count: usize) -> usize {
    line_count * line_count.saturating_sub(1) / 2
}

/// Enumerate all pairwise quadrilateral hypotheses for `lines`.
pub fn generate_hypotheses(lines: &[Line]) -> Hypotheses<'_> {
    Hypotheses { lines, i: 0, j: 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keybed_core::Point;

    fn horizontal(y: f32) -> Line {
        Line::new(Point::new(0.0, y), Point::new(199.0, y), y, 90f32.to_radians())
    }

    #[test]
    fn no_lines_no_hypotheses() {
        assert_eq!(generate_hypotheses(&[]).count(), 0);
        assert_eq!(generate_hypotheses(&[horizontal(10.0)]).count(), 0);
    }

    #[test]
    fn every_unordered_pair_once() {
        let lines: Vec<Line> = (0..6).map(|i| horizontal(i as f32 * 30.0)).collect();
        let quads: Vec<Quadrilateral> = generate_hypotheses(&lines).collect();
        assert_eq!(quads.len(), 15);
        assert_eq!(quads.len(), hypothesis_count(lines.len()));

        // First pair is (0, 1), last is (4, 5).
        assert_eq!(quads[0].top_left(), Point::new(0.0, 0.0));
        assert_eq!(quads[0].bottom_left(), Point::new(0.0, 30.0));
        assert_eq!(quads[14].top_left(), Point::new(0.0, 120.0));
        assert_eq!(quads[14].bottom_right(), Point::new(199.0, 150.0));
    }

    #[test]
    fn size_hint_counts_down() {
        let lines: Vec<Line> = (0..5).map(|i| horizontal(i as f32 * 25.0)).collect();
        let mut hypotheses = generate_hypotheses(&lines);
        for remaining in (0..=10).rev() {
            assert_eq!(hypotheses.len(), remaining);
            hypotheses.next();
        }
        assert!(hypotheses.next().is_none());
    }

    #[test]
    fn corners_are_canonical_regardless_of_line_order() {
        let lower = Line::new(Point::new(199.0, 90.0), Point::new(0.0, 80.0), 80.0, 1.6);
        let upper = Line::new(Point::new(199.0, 15.0), Point::new(0.0, 5.0), 5.0, 1.6);
        let quad = generate_hypotheses(&[lower, upper]).next().unwrap();
        assert_eq!(
            quad.corners(),
            [
                Point::new(0.0, 5.0),
                Point::new(199.0, 15.0),
                Point::new(199.0, 90.0),
                Point::new(0.0, 80.0),
            ]
        );
    }
}
