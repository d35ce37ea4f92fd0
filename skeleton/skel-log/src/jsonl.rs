//! JSON-lines frame logs.
//!
//! One frame record per line, in capture order:
//!
//! ```text
//! {"index":0,"depth":{"width":2,"height":1,"data":[0,1500]},"label":{...},"points":[[10.0,20.0,1500.0]],"point_labels":[1],"users":[{"id":1}]}
//! ```
//!
//! Blank lines are ignored. `users`, and each user's `state` and `joints`,
//! may be omitted.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use skel_types::Frame;
use tracing::debug;

use crate::error::{LogError, LogResult};
use crate::source::FrameSource;

/// Reads frames from a JSON-lines log.
#[derive(Debug)]
pub struct JsonLinesFrameSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl JsonLinesFrameSource<BufReader<File>> {
    /// Opens a log file.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::FileNotFound`] if the file does not exist, or
    /// [`LogError::Io`] if it cannot be opened.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use skel_log::{FrameSource, JsonLinesFrameSource};
    ///
    /// let source = JsonLinesFrameSource::open("capture.jsonl").unwrap();
    /// for frame in source.frames() {
    ///     let frame = frame.unwrap();
    ///     println!("frame {} has {} points", frame.index, frame.points.len());
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> LogResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LogError::open(path, e))?;
        debug!(path = %path.display(), "Opened frame log");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesFrameSource<R> {
    /// Reads frames from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> FrameSource for JsonLinesFrameSource<R> {
    fn next_frame(&mut self) -> LogResult<Option<Frame>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let record = self.buf.trim();
            if record.is_empty() {
                continue;
            }

            let line = self.line;
            let frame: Frame = serde_json::from_str(record)
                .map_err(|source| LogError::Parse { line, source })?;
            frame.validate().map_err(|source| LogError::InvalidFrame {
                position: line,
                source,
            })?;
            return Ok(Some(frame));
        }
    }
}

/// Appends frames to a JSON-lines log.
///
/// Each frame is stamped with its position in the log, so indices always
/// run `0, 1, 2, ...` regardless of the index a frame arrived with.
///
/// # Example
///
/// ```
/// use skel_log::{FrameLogWriter, FrameSource, JsonLinesFrameSource};
/// use skel_types::Frame;
///
/// let mut writer = FrameLogWriter::new(Vec::new());
/// writer.append(Frame::empty(41, 3, 2)).unwrap();
/// writer.append(Frame::empty(7, 3, 2)).unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let indices: Vec<u64> = JsonLinesFrameSource::new(bytes.as_slice())
///     .frames()
///     .map(|f| f.unwrap().index)
///     .collect();
/// assert_eq!(indices, vec![0, 1]);
/// ```
#[derive(Debug)]
pub struct FrameLogWriter<W: Write> {
    writer: W,
    written: u64,
}

impl FrameLogWriter<BufWriter<File>> {
    /// Creates (or truncates) a log file.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> LogResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FrameLogWriter<W> {
    /// Writes frames to `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of frames written.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Appends `frame`, returning the index it was written with.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidFrame`] if the frame violates the frame
    /// invariants (nothing is written), or an I/O or encoding error.
    #[allow(clippy::cast_possible_truncation)]
    pub fn append(&mut self, mut frame: Frame) -> LogResult<u64> {
        frame.validate().map_err(|source| LogError::InvalidFrame {
            position: self.written as usize,
            source,
        })?;
        frame.index = self.written;
        serde_json::to_writer(&mut self.writer, &frame)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(frame.index)
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if flushing fails.
    pub fn finish(mut self) -> LogResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use skel_types::{FrameError, Grid, Joint, JointId, Point3, User};
    use std::io::Cursor;

    fn user_frame(index: u64) -> Frame {
        let depth = Grid::from_vec(2, 2, vec![0, 1500, 1400, 0]).unwrap();
        let label = Grid::from_vec(2, 2, vec![0, 1, 1, 0]).unwrap();
        let user = User::with_joints(
            1,
            vec![
                Joint::new(JointId::HEAD, Point3::new(0.0, 300.0, 1500.0)),
                Joint::new(JointId::NECK, Point3::new(0.0, 100.0, 1500.0)),
            ],
        );
        Frame::new(
            index,
            depth,
            label,
            vec![Point3::new(1.0, 0.0, 1500.0), Point3::new(0.0, -1.0, 1400.0)],
            vec![1, 1],
            vec![user],
        )
        .unwrap()
    }

    fn read_all(bytes: &[u8]) -> Vec<LogResult<Frame>> {
        JsonLinesFrameSource::new(bytes).frames().collect()
    }

    #[test]
    fn test_write_then_read() {
        let mut writer = FrameLogWriter::new(Vec::new());
        assert_eq!(writer.append(user_frame(10)).unwrap(), 0);
        assert_eq!(writer.append(Frame::empty(3, 2, 2)).unwrap(), 1);
        assert_eq!(writer.written(), 2);
        let bytes = writer.finish().unwrap();

        let frames: Vec<Frame> = read_all(&bytes).into_iter().map(Result::unwrap).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].index, 0);
        assert_eq!(frames[1].index, 1);

        let mut expected = user_frame(0);
        expected.index = 0;
        assert_eq!(frames[0], expected);
        assert_eq!(frames[0].skeleton_user().map(|u| u.id), Some(1));
    }

    #[test]
    fn test_hand_written_record() {
        let log = concat!(
            r#"{"index":4,"depth":{"width":2,"height":1,"data":[0,1500]},"#,
            r#""label":{"width":2,"height":1,"data":[0,1]},"#,
            r#""points":[[10.0,20.0,1500.0]],"point_labels":[1],"users":[{"id":1}]}"#,
            "\n"
        );
        let frames = read_all(log.as_bytes());
        assert_eq!(frames.len(), 1);
        let frame = frames.into_iter().next().unwrap().unwrap();
        assert_eq!(frame.index, 4);
        assert_eq!(frame.points[0], Point3::new(10.0, 20.0, 1500.0));
        assert!(!frame.users[0].has_skeleton());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut writer = FrameLogWriter::new(Vec::new());
        writer.append(Frame::empty(0, 1, 1)).unwrap();
        let record = writer.finish().unwrap();

        let mut log = b"\n   \n".to_vec();
        log.extend_from_slice(&record);
        log.extend_from_slice(b"\n\n");
        log.extend_from_slice(&record);

        let mut source = JsonLinesFrameSource::new(Cursor::new(log));
        assert!(source.next_frame().unwrap().is_some());
        assert_eq!(source.line(), 3);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let mut writer = FrameLogWriter::new(Vec::new());
        writer.append(Frame::empty(0, 1, 1)).unwrap();
        let mut log = writer.finish().unwrap();
        log.extend_from_slice(b"{\"index\": 1, \"depth\": \n");

        let results = read_all(&log);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(LogError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_invalid_frame_rejected_on_read() {
        let log = concat!(
            r#"{"index":0,"depth":{"width":2,"height":1,"data":[900,1500]},"#,
            r#""label":{"width":2,"height":1,"data":[0,1]},"#,
            r#""points":[[10.0,20.0,1500.0]],"point_labels":[1]}"#,
        );
        let results = read_all(log.as_bytes());
        assert!(matches!(
            results[0],
            Err(LogError::InvalidFrame {
                position: 1,
                source: FrameError::PointCountMismatch { .. },
            })
        ));
    }

    #[test]
    fn test_inconsistent_grid_buffer_rejected() {
        let log = concat!(
            r#"{"index":0,"depth":{"width":3,"height":1,"data":[0,0]},"#,
            r#""label":{"width":3,"height":1,"data":[0,0,0]},"#,
            r#""points":[],"point_labels":[]}"#,
        );
        let results = read_all(log.as_bytes());
        assert!(matches!(
            results[0],
            Err(LogError::InvalidFrame {
                source: FrameError::BufferSizeMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_writer_rejects_invalid_frame() {
        let mut frame = Frame::empty(0, 2, 1);
        frame.point_labels.push(1);
        let mut writer = FrameLogWriter::new(Vec::new());
        assert!(writer.append(frame).is_err());
        assert_eq!(writer.written(), 0);
        assert!(writer.finish().unwrap().is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");

        let mut writer = FrameLogWriter::create(&path).unwrap();
        for i in 0..3 {
            writer.append(user_frame(i * 10)).unwrap();
        }
        writer.finish().unwrap();

        let source = JsonLinesFrameSource::open(&path).unwrap();
        let indices: Vec<u64> = source.frames().map(|f| f.unwrap().index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonLinesFrameSource::open(dir.path().join("nope.jsonl")).unwrap_err();
        assert!(matches!(err, LogError::FileNotFound { .. }));
    }
}
