// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// keybed-vision: Keyboard detection for Keybed.
//
// Extracts candidate boundary lines from a frame (Canny + Hough with an
// angular-resolution search), pairs them into quadrilateral hypotheses,
// rectifies each hypothesis with a perspective warp, scores the result by its
// black-key pattern, and keeps the best candidate.

pub mod detector;
pub mod geometry;
pub mod hypothesis;
pub mod lines;
pub mod rectify;
pub mod scoring;
pub mod select;

// Re-export the primary types so callers can use `keybed_vision::KeyboardDetector` etc.
pub use detector::{DetectionReport, DiagnosticSink, KeyboardDetection, KeyboardDetector, NoopSink};
pub use geometry::order_points;
pub use hypothesis::generate_hypotheses;
pub use lines::{LineExtraction, LineExtractor};
pub use rectify::{PerspectiveRectifier, RectifiedCandidate};
pub use scoring::{BlackKeyCounter, BlobKeyCounter, CandidateScorer};
pub use select::{Selection, SelectionTally, select_best};
