//! Error types for normal estimation.

use skel_types::FrameError;
use thiserror::Error;

use crate::params::NormalMode;

/// Result type alias for normal estimation.
pub type NormalResult<T> = Result<T, NormalError>;

/// Errors that can occur during normal estimation.
#[derive(Debug, Error)]
pub enum NormalError {
    /// Invalid estimator parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The input kind does not match the configured mode.
    #[error("estimator configured for {expected:?} mode but given {actual:?} input")]
    ModeMismatch {
        /// Configured mode.
        expected: NormalMode,
        /// Mode implied by the input.
        actual: NormalMode,
    },

    /// Input grids are inconsistent, or the frame is structurally invalid.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl NormalError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NormalError::invalid_params("sigma must be non-negative");
        assert!(format!("{err}").contains("sigma"));

        let err = NormalError::ModeMismatch {
            expected: NormalMode::Point,
            actual: NormalMode::Depth,
        };
        let msg = format!("{err}");
        assert!(msg.contains("Point"));
        assert!(msg.contains("Depth"));
    }
}
