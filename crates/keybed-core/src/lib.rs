// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keybed: geometry types and tuning configuration shared by the vision crate,
// plus the common error type.

pub mod config;
pub mod error;
pub mod types;

pub use config::DetectorConfig;
pub use error::{KeybedError, Result};
pub use types::*;
