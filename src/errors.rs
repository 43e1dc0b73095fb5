//! Error types for the time annotator.
//!
//! Initialization errors (lexicon, model, config) are fatal for the
//! component. Processing errors abort the segment being annotated.

use crate::span::Span;
use thiserror::Error;

/// Errors that can occur while building or running the annotator.
#[derive(Debug, Error)]
pub enum TimexError {
    /// A lexicon line did not split into `<category> <word>`.
    #[error("malformed lexicon entry at line {line_number}: expected '<type> <word>', found: {line:?}")]
    MalformedLexiconEntry { line_number: usize, line: String },

    /// A resource could not be read or written.
    #[error("i/o error on {path}: {message}")]
    Io { path: String, message: String },

    /// The classifier model is missing or cannot be decoded.
    #[error("failed to load model from {path}: {message}")]
    ModelLoad { path: String, message: String },

    /// The classifier failed to label or score a feature vector.
    #[error("classification failed: {message}")]
    Classification { message: String },

    /// Features could not be extracted for a node.
    #[error("feature extraction failed: {message}")]
    FeatureExtraction { message: String },

    /// A training instance could not be persisted.
    #[error("failed to write training instance: {message}")]
    InstanceWrite { message: String },

    /// The annotator configuration is invalid.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Bracketed tree text could not be read or aligned to the segment text.
    #[error("tree syntax error at offset {position}: {message}")]
    TreeSyntax { position: usize, message: String },

    /// Two tokens of a token layer share characters.
    #[error("tokens {first} and {second} overlap")]
    OverlappingTokens { first: Span, second: Span },
}

impl TimexError {
    pub(crate) fn io(path: impl std::fmt::Display, err: std::io::Error) -> Self {
        TimexError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for annotator operations.
pub type TimexResult<T> = Result<T, TimexError>;
