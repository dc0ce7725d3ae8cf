#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use celpatch_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Missing or malformed arguments. Carries the full message to print.
    #[from(ignore)]
    #[display("{}", _0)]
    Usage(String),

    /// The manifest path does not exist.
    #[from(ignore)]
    #[display("Error: File not found: {}", _0)]
    NotFound(String),

    /// Failure inside the patching library.
    #[display("Error: {}", _0)]
    Core(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),
}

/// Manual implementation of the standard Error trait.
///
/// We implement this manually (instead of `derive(Error)`) because the `String`
/// variants do not implement `std::error::Error`, causing auto-derived `source()`
/// implementations to fail compilation.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
