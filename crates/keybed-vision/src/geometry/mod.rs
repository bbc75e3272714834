// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry utilities: corner ordering and polar-line boundary math.

pub mod points;
pub mod polar;

pub use points::order_points;
pub use polar::{Boundary, PolarLine, clip_to_frame, is_near_horizontal, line_boundary_intersection};
