// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge/line extraction: auto-Canny edge maps and a variable-resolution Hough
// transform, combined by the boundary line extractor.

pub mod edges;
pub mod extractor;
pub mod hough;

pub use extractor::{LineExtraction, LineExtractor};
