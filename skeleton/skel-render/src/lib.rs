//! Image output for derived frame grids.
//!
//! - [`label_image`] - false-colours a bone or user label grid with [`Jet`]
//! - [`normal_image`] - shades a normal field, `(0.5 + 0.5·n)` per channel
//! - [`RenderEncoder`] - writes either one to `<prefix>-<index>.png`
//!
//! # Example
//!
//! ```
//! use skel_render::{OutputPattern, RenderEncoder};
//! use skel_types::Grid;
//!
//! let dir = std::env::temp_dir();
//! let encoder = RenderEncoder::new(OutputPattern::new(
//!     dir.join("skel-render-doc").to_string_lossy(),
//! ));
//! let path = encoder.write_labels(3, &Grid::new(4, 4, 0u16)).unwrap();
//! assert!(path.ends_with("skel-render-doc-00003.png"));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod colormap;
mod encode;
mod error;

pub use colormap::{JET_SIZE, Jet};
pub use encode::{OutputPattern, RenderEncoder, label_image, normal_image, shade, write_png};
pub use error::{RenderError, RenderResult};
