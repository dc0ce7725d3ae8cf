//! # Idempotency Guard
//!
//! Detects text that already carries a validations block.

use crate::render::VALIDATIONS_HEADER;
use serde::{Deserialize, Serialize};

/// Granularity of the already-patched check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardScope {
    /// Any header anywhere in the file skips the whole file.
    #[default]
    File,
    /// Only documents holding a header are skipped, the rest are still patched.
    Document,
}

/// True if `text` contains a validations header.
pub fn is_patched(text: &str) -> bool {
    text.contains(VALIDATIONS_HEADER)
}
