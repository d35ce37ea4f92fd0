//! Recorded frame logs.
//!
//! Post-processing reads a log front to back, one [`Frame`] at a time:
//!
//! - [`FrameSource`] - the single-pass frame stream, with an iterator adapter
//! - [`MemoryFrameSource`] - frames held in memory
//! - [`JsonLinesFrameSource`] - one JSON frame record per line
//! - [`FrameLogWriter`] - appends frames to a JSON-lines log
//!
//! Every source validates each frame as it is read, so a structurally
//! broken record surfaces as a [`LogError`] rather than a bad result
//! further down the pipeline.
//!
//! [`Frame`]: skel_types::Frame

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod jsonl;
mod source;

pub use error::{LogError, LogResult};
pub use jsonl::{FrameLogWriter, JsonLinesFrameSource};
pub use source::{FrameSource, Frames, MemoryFrameSource};
