//! Nearest-bone labelling for depth-camera point clouds.
//!
//! Given the 3D points of a tracked user and that user's skeletal joints,
//! this crate labels every point with the bone it lies closest to:
//!
//! - [`Segment`] / [`distances_to_segment`] - distance to a finite segment
//! - [`BoneTopology`] - fixed table of named bones (joint pairs)
//! - [`classify_points`] - nearest-bone label per point
//! - [`label_frame`] - bone label grid for a whole frame
//!
//! Bones are only defined for a frame when both of their joints were
//! tracked, so the set of labels can change from frame to frame. Labels are
//! 1-based over the defined bones in name order; 0 means background.
//!
//! # Example
//!
//! ```
//! use skel_bones::{BoneTopology, ClassifyParams, label_frame};
//! use skel_types::{Frame, Grid, Joint, JointId, User};
//! use nalgebra::Point3;
//!
//! let user = User::with_joints(1, vec![
//!     Joint::new(JointId::HEAD, Point3::new(0.0, 10.0, 0.0)),
//!     Joint::new(JointId::NECK, Point3::new(0.0, 0.0, 0.0)),
//! ]);
//! let frame = Frame::new(
//!     0,
//!     Grid::from_vec(2, 1, vec![800u16, 0]).unwrap(),
//!     Grid::from_vec(2, 1, vec![1u16, 0]).unwrap(),
//!     vec![Point3::new(1.0, 4.0, 0.0)],
//!     vec![1],
//!     vec![user],
//! ).unwrap();
//!
//! let labels = label_frame(&frame, &BoneTopology::openni(), &ClassifyParams::default()).unwrap();
//! assert_eq!(labels.as_slice(), &[1, 0]);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod classify;
mod error;
mod segment;
mod topology;

pub use classify::{
    BoneDistanceTable, ClassifyParams, DefinedBone, classify_points, define_bones, label_frame,
    label_user,
};
pub use error::{BoneError, BoneResult};
pub use segment::{Segment, distances_to_segment};
pub use topology::{BoneSpec, BoneTopology, ResolvedBone};
