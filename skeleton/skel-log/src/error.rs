//! Error types for frame logs.

use std::path::PathBuf;

use skel_types::FrameError;
use thiserror::Error;

/// Result type for frame log operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur while reading or writing a frame log.
#[derive(Debug, Error)]
pub enum LogError {
    /// Log file not found.
    #[error("log file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// A log record is not valid JSON for a frame.
    #[error("line {line}: malformed frame record: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A frame decoded but violates the frame invariants.
    #[error("frame at position {position} is invalid: {source}")]
    InvalidFrame {
        /// 1-based line number, or 0-based position for in-memory sources.
        position: usize,
        /// The violated invariant.
        #[source]
        source: FrameError,
    },

    /// Frame serialization failed.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Maps an open error, reporting a missing file by path.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path: path.into() }
        } else {
            Self::Io(err)
        }
    }
}
