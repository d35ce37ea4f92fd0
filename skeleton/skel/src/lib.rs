//! Post-processing for recorded depth-camera skeleton logs.
//!
//! This umbrella crate re-exports the `skel-*` crates. A typical pass reads
//! a log frame by frame, derives a per-pixel output and writes one PNG per
//! frame:
//!
//! ```no_run
//! use skel::prelude::*;
//!
//! let source = JsonLinesFrameSource::open("capture.jsonl").unwrap();
//! let encoder = RenderEncoder::new(OutputPattern::new("out/bones"));
//! let topology = BoneTopology::openni();
//!
//! for frame in source.frames() {
//!     let frame = frame.unwrap();
//!     let labels = label_frame(&frame, &topology, &ClassifyParams::default()).unwrap();
//!     encoder.write_labels(frame.index, &labels).unwrap();
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - `Frame`, `User`, `Joint`, `Grid` and the frame invariants
//! - [`bones`] - bone topology, segment distance, nearest-bone labelling
//! - [`normals`] - grid filters and surface-normal estimation
//! - [`render`] - jet false colour, normal shading, PNG output
//! - [`log`] - frame sources and the JSON-lines log format

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Frame, user, joint and grid types.
pub use skel_types as types;

/// Nearest-bone labelling.
pub use skel_bones as bones;

/// Surface-normal estimation.
pub use skel_normals as normals;

/// Image output.
pub use skel_render as render;

/// Frame logs.
pub use skel_log as log;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for log post-processing.
///
/// ```
/// use skel::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use skel_types::{Frame, Grid, Joint, JointId, LabelGrid, NormalField, User};

    // Bone labelling
    pub use skel_bones::{BoneTopology, ClassifyParams, label_frame};

    // Normals
    pub use skel_normals::{NormalMode, NormalParams, frame_normals};

    // Output
    pub use skel_render::{OutputPattern, RenderEncoder};

    // Logs
    pub use skel_log::{FrameLogWriter, FrameSource, JsonLinesFrameSource, MemoryFrameSource};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let frame = Frame::empty(0, 4, 3);
        assert_eq!(frame.width(), 4);
        assert_eq!(BoneTopology::openni().len(), 13);
        assert_eq!(NormalParams::default().mode, NormalMode::Point);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::Frame::empty(0, 1, 1);
        let _ = bones::ClassifyParams::default();
        let _ = normals::NormalParams::depth();
        let _ = render::Jet::new();
        let _ = log::MemoryFrameSource::default();
    }
}
