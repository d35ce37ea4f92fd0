//! Error types for frame data.

use thiserror::Error;

/// Result type alias for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised when a frame snapshot is structurally invalid.
///
/// These are fatal to a processing run: the frame cannot be interpreted
/// consistently, so no per-pixel output can be produced for it.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Grid buffer has the wrong number of elements for its shape.
    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Expected buffer size (width × height).
        expected: usize,
        /// Actual buffer size.
        actual: usize,
    },

    /// Two grids that must share a shape do not.
    #[error("shape mismatch: {what} is {actual_width}x{actual_height}, expected {width}x{height}")]
    ShapeMismatch {
        /// Which grid is mismatched.
        what: &'static str,
        /// Expected width.
        width: usize,
        /// Expected height.
        height: usize,
        /// Actual width.
        actual_width: usize,
        /// Actual height.
        actual_height: usize,
    },

    /// Point cloud length differs from the number of valid depth pixels.
    #[error("point cloud has {points} points but depth grid has {valid_pixels} valid pixels")]
    PointCountMismatch {
        /// Number of points in the cloud.
        points: usize,
        /// Number of nonzero depth pixels.
        valid_pixels: usize,
    },

    /// Point-label array length differs from the point cloud length.
    #[error("point-label array has {labels} entries but point cloud has {points} points")]
    PointLabelMismatch {
        /// Number of point labels.
        labels: usize,
        /// Number of points.
        points: usize,
    },

    /// Joint identifier outside the skeleton joint schema.
    #[error("unknown joint id: {0}")]
    UnknownJoint(u32),
}

impl FrameError {
    /// Creates a buffer size mismatch error.
    #[must_use]
    pub const fn buffer_mismatch(expected: usize, actual: usize) -> Self {
        Self::BufferSizeMismatch { expected, actual }
    }

    /// Creates a shape mismatch error.
    #[must_use]
    pub const fn shape_mismatch(
        what: &'static str,
        (width, height): (usize, usize),
        (actual_width, actual_height): (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            what,
            width,
            height,
            actual_width,
            actual_height,
        }
    }
}
