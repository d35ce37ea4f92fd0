//! Error types for bone labelling.

use nalgebra::Point3;
use skel_types::FrameError;
use thiserror::Error;

/// Result type alias for bone labelling operations.
pub type BoneResult<T> = Result<T, BoneError>;

/// Errors that can occur while labelling points by nearest bone.
#[derive(Debug, Error)]
pub enum BoneError {
    /// Segment endpoints coincide, so it has no direction.
    #[error("degenerate segment: endpoints {p1} and {p2} coincide")]
    DegenerateSegment {
        /// First endpoint.
        p1: Point3<f64>,
        /// Second endpoint.
        p2: Point3<f64>,
    },

    /// A bone's two joints are at the same position in this frame.
    #[error("degenerate bone {bone}: both joints at the same position")]
    DegenerateBone {
        /// Bone name.
        bone: String,
    },

    /// The bone topology table is malformed.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// The frame is structurally invalid.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl BoneError {
    /// Creates a degenerate segment error.
    #[must_use]
    pub const fn degenerate(p1: Point3<f64>, p2: Point3<f64>) -> Self {
        Self::DegenerateSegment { p1, p2 }
    }

    /// Creates an invalid topology error.
    #[must_use]
    pub fn invalid_topology(details: impl Into<String>) -> Self {
        Self::InvalidTopology(details.into())
    }

    /// Returns `true` for errors that only affect a single bone.
    #[must_use]
    pub const fn is_per_bone(&self) -> bool {
        matches!(
            self,
            Self::DegenerateSegment { .. } | Self::DegenerateBone { .. }
        )
    }
}
