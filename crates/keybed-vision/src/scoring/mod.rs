// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate scoring.

pub mod bands;
pub mod keys;
pub mod scorer;

pub use keys::{BlackKeyCounter, BlobKeyCounter, KeyBlob};
pub use scorer::CandidateScorer;
