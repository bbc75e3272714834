// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Keybed.
//
// Only caller contract violations travel through this type. Expected per-hypothesis
// outcomes (degenerate quadrilaterals, "not a keyboard" verdicts, frames without
// lines) are ordinary values in the pipeline, never errors.

use thiserror::Error;

/// Top-level error type for all Keybed operations.
#[derive(Debug, Error)]
pub enum KeybedError {
    // -- Input contract violations --
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("invalid quadrilateral: {0}")]
    InvalidQuadrilateral(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KeybedError>;
