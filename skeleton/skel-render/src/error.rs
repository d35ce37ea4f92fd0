//! Error types for image output.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering or writing images.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The grid is too large for an image.
    #[error("grid of {width}x{height} exceeds image dimensions")]
    TooLarge {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// The output file could not be created.
    #[error("failed to create {path}: {source}")]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl RenderError {
    /// Create an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
