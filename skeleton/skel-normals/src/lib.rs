//! Per-pixel surface-normal estimation for depth-camera frames.
//!
//! Normals are estimated from one of two inputs, selected with
//! [`NormalMode`]:
//!
//! - **Point** - the 3D point field. Holes are filled by repeatedly growing
//!   valid values with a 3×3 maximum filter; tangents are the row and
//!   column derivatives of the smoothed points.
//! - **Depth** - the raw depth map. Holes are filled with a single 7×7 grey
//!   dilation; tangents are built from the depth derivatives and a fixed
//!   pixel scale.
//!
//! Every output entry is either unit length or exactly zero, and invalid
//! pixels are always zero. A surface facing the camera has normal
//! `(0, 0, -1)`.
//!
//! # Example
//!
//! ```
//! use skel_normals::{NormalParams, frame_normals};
//! use skel_types::Frame;
//!
//! let frame = Frame::empty(0, 8, 6);
//! let normals = frame_normals(&frame, &NormalParams::point()).unwrap();
//! assert_eq!(normals.shape(), (8, 6));
//! ```
//!
//! The [`filter`] module exposes the underlying separable filters.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod estimate;
pub mod filter;
mod params;

pub use error::{NormalError, NormalResult};
pub use estimate::{NormalEstimator, SurfaceInput, estimate_normals, frame_normals};
pub use params::{NormalMode, NormalParams};
