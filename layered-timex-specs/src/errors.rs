//! Error types for the fixture harness.

use layered_timex::TimexError;
use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The fixture file is not valid fixture TOML.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Error loading a fixture file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// A fixture refers to text its segment does not contain.
    #[error("assertion failed: {message}")]
    Assertion { message: String },

    /// The annotator itself failed.
    #[error(transparent)]
    Annotator(#[from] TimexError),
}

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;
