//! Unfurl error types.
//!
//! All errors are typed and provide root cause information.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Unfurl operations.
#[derive(Error, Debug)]
pub enum UnfurlError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Tree-sitter parsing error.
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// The file that failed to parse.
        file: PathBuf,
        /// The parse error message.
        message: String,
    },

    /// Invalid byte span.
    #[error("Invalid span ({start}, {end}) in {file}")]
    InvalidSpan {
        /// The file containing the invalid span.
        file: PathBuf,
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
    },

    /// Two edits in one set cover overlapping byte ranges.
    #[error("Overlapping edits detected in {file}")]
    OverlappingEdits {
        /// The file whose edit set overlaps.
        file: PathBuf,
    },

    /// Tree-sitter reparse gate failed after a rewrite.
    #[error("Parse validation failed: file '{file}' - {message}")]
    ParseValidationFailed {
        /// The file that failed validation.
        file: PathBuf,
        /// The validation error message.
        message: String,
    },

    /// Rescan gate found same-line directives after a rewrite.
    #[error("Rescan found {remaining} remaining end-of-line directive(s) in {file}")]
    RescanFailed {
        /// The file that failed the rescan gate.
        file: PathBuf,
        /// Number of same-line directives still present.
        remaining: usize,
    },

    /// UTF-8 validation error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for UnfurlError {
    fn from(err: std::io::Error) -> Self {
        UnfurlError::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl UnfurlError {
    /// Stable kind identifier for structured CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            UnfurlError::Io { .. } => "Io",
            UnfurlError::Parse { .. } => "Parse",
            UnfurlError::InvalidSpan { .. } => "InvalidSpan",
            UnfurlError::OverlappingEdits { .. } => "OverlappingEdits",
            UnfurlError::ParseValidationFailed { .. } => "ParseValidationFailed",
            UnfurlError::RescanFailed { .. } => "RescanFailed",
            UnfurlError::Utf8(_) => "Utf8",
            UnfurlError::Other(_) => "Other",
        }
    }

    /// File context for structured CLI output, when the error carries one.
    pub fn file_path(&self) -> Option<&std::path::Path> {
        match self {
            UnfurlError::Io { path, .. } => Some(path),
            UnfurlError::Parse { file, .. }
            | UnfurlError::InvalidSpan { file, .. }
            | UnfurlError::OverlappingEdits { file }
            | UnfurlError::ParseValidationFailed { file, .. }
            | UnfurlError::RescanFailed { file, .. } => Some(file),
            UnfurlError::Utf8(_) | UnfurlError::Other(_) => None,
        }
    }
}

/// Result type alias for Unfurl operations.
pub type Result<T> = std::result::Result<T, UnfurlError>;
