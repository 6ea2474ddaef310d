//! Error types and results.

use thiserror::Error;

/// Errors raised inside the link stack.
///
/// These never cross the host surface as errors; the link layer folds them
/// into [`crate::status::Status`] codes instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// A received byte sequence is shorter than the 10-byte frame minimum.
    #[error("frame shorter than the 10-byte minimum")]
    MalformedFrame,
    /// The RF layer could not be brought up.
    #[error("RF layer failed to initialize: {0}")]
    RfInit(String),
}

/// Convenience result alias used across the workspace.
pub type Result<T> = std::result::Result<T, ErrorKind>;
