//! Frame data types for recorded depth-camera skeleton logs.
//!
//! A log is a sequence of [`Frame`]s. Each frame carries:
//! - a [`DepthGrid`] of raw sensor depth (`0` = no reading)
//! - a [`LabelGrid`] assigning each pixel to a tracked user (`0` = none)
//! - a point cloud with one real-world position per valid depth pixel
//! - a per-point user label, aligned with the point cloud
//! - the [`User`]s segmented in the frame, each with optional [`Joint`]s
//!
//! Derived per-pixel outputs (bone labels, surface normals) reuse the same
//! [`Grid`] container.
//!
//! # Example
//!
//! ```
//! use skel_types::{Frame, Grid, Joint, JointId, User};
//! use nalgebra::Point3;
//!
//! let frame = Frame::empty(0, 640, 480);
//! assert!(frame.validate().is_ok());
//!
//! let user = User::with_joints(1, vec![
//!     Joint::new(JointId::HEAD, Point3::new(0.0, 900.0, 2000.0)),
//!     Joint::new(JointId::NECK, Point3::new(0.0, 700.0, 2000.0)),
//! ]);
//! assert_eq!(user.joint_map().len(), 2);
//! ```
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for all types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod frame;
mod grid;
mod joint;
mod user;

pub use error::{FrameError, FrameResult};
pub use frame::{Frame, UserPoints};
pub use grid::{DepthGrid, Grid, LabelGrid, Mask, NormalField, ScalarField, VectorField};
pub use joint::{Joint, JointId};
pub use user::{TrackingState, User};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
