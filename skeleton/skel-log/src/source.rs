//! Sequential frame sources.

use std::collections::VecDeque;

use skel_types::Frame;

use crate::error::{LogError, LogResult};

/// A single-pass, ordered stream of frames.
///
/// Sources hand out validated frames in log order and report `None` once
/// exhausted. An error ends the stream.
pub trait FrameSource {
    /// The next frame, or `None` at the end of the log.
    ///
    /// # Errors
    ///
    /// Returns a [`LogError`] if the next record cannot be read or violates
    /// the frame invariants.
    fn next_frame(&mut self) -> LogResult<Option<Frame>>;

    /// Adapts the source into an iterator of frames.
    fn frames(self) -> Frames<Self>
    where
        Self: Sized,
    {
        Frames {
            source: self,
            done: false,
        }
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> LogResult<Option<Frame>> {
        (**self).next_frame()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> LogResult<Option<Frame>> {
        (**self).next_frame()
    }
}

/// Iterator over a [`FrameSource`]; fused after the end or the first
/// error.
#[derive(Debug)]
pub struct Frames<S> {
    source: S,
    done: bool,
}

impl<S: FrameSource> Iterator for Frames<S> {
    type Item = LogResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<S: FrameSource> std::iter::FusedIterator for Frames<S> {}

/// Frames held in memory.
///
/// # Example
///
/// ```
/// use skel_log::{FrameSource, MemoryFrameSource};
/// use skel_types::Frame;
///
/// let mut source = MemoryFrameSource::new(vec![Frame::empty(0, 4, 3), Frame::empty(1, 4, 3)]);
/// assert_eq!(source.next_frame().unwrap().map(|f| f.index), Some(0));
/// assert_eq!(source.frames().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFrameSource {
    frames: VecDeque<Frame>,
    position: usize,
}

impl MemoryFrameSource {
    /// Wraps `frames`, yielded in order.
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            position: 0,
        }
    }

    /// Number of frames not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> LogResult<Option<Frame>> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };
        let position = self.position;
        self.position += 1;
        frame
            .validate()
            .map_err(|source| LogError::InvalidFrame { position, source })?;
        Ok(Some(frame))
    }
}

impl FromIterator<Frame> for MemoryFrameSource {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
