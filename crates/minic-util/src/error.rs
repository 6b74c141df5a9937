//! Core error types for minic-util.
//!
//! These cover misuse of the utility types themselves. Problems in the
//! *compiled program* are never errors in this sense; they travel as
//! [`crate::Diagnostic`]s instead.

use thiserror::Error;

/// Error type for span operations.
#[derive(Debug, Error)]
pub enum SpanError {
    /// Start offset past the end offset.
    #[error("Invalid span: start {start} > end {end}")]
    InvalidRange { start: usize, end: usize },

    /// Span reaches past the end of the source it indexes.
    #[error("Span out of bounds: source has {source_len} bytes, span is {start}..{end}")]
    OutOfBounds {
        source_len: usize,
        start: usize,
        end: usize,
    },
}

/// Result type alias for span operations.
pub type SpanResult<T> = std::result::Result<T, SpanError>;
