//! `label-bones`: nearest-bone false colour per frame.

use std::path::Path;

use anyhow::{Context, Result};
use skel::bones::{BoneTopology, ClassifyParams, label_frame};
use skel::log::{FrameSource, JsonLinesFrameSource};
use skel::render::{OutputPattern, RenderEncoder};
use tracing::info;

use crate::PROGRESS_INTERVAL;

/// Labels every frame of `logfile`, returning the number of frames written.
pub fn run(logfile: &Path, frame_prefix: &str, strict: bool) -> Result<u64> {
    info!(path = %logfile.display(), "Opening log file");
    let source = JsonLinesFrameSource::open(logfile)
        .with_context(|| format!("failed to open {}", logfile.display()))?;

    let topology = BoneTopology::openni();
    let params = if strict {
        ClassifyParams::strict()
    } else {
        ClassifyParams::default()
    };
    let encoder = RenderEncoder::new(OutputPattern::new(frame_prefix));

    let mut count = 0;
    for frame in source.frames() {
        let frame = frame.with_context(|| format!("failed to read {}", logfile.display()))?;
        if frame.index % PROGRESS_INTERVAL == 0 {
            info!(frame = frame.index, "Processing frame");
        }

        let labels = label_frame(&frame, &topology, &params)
            .with_context(|| format!("failed to label frame {}", frame.index))?;
        encoder
            .write_labels(frame.index, &labels)
            .with_context(|| format!("failed to write frame {}", frame.index))?;
        count += 1;
    }

    info!(frames = count, "Finished labelling bones");
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use skel::log::FrameLogWriter;
    use skel::types::{Frame, Grid, Joint, JointId, Point3, User};

    fn skeleton_frame() -> Frame {
        let depth = Grid::from_vec(2, 1, vec![800u16, 900]).unwrap();
        let label = Grid::new(2, 1, 1u16);
        let user = User::with_joints(1, vec![
            Joint::new(JointId::HEAD, Point3::new(0.0, 10.0, 800.0)),
            Joint::new(JointId::NECK, Point3::new(0.0, 10.0, 800.0)),
        ]);
        Frame::new(
            0,
            depth,
            label,
            vec![Point3::new(0.0, 0.0, 800.0), Point3::new(1.0, 0.0, 900.0)],
            vec![1, 1],
            vec![user],
        )
        .unwrap()
    }

    #[test]
    fn test_writes_one_png_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("capture.jsonl");
        let mut writer = FrameLogWriter::create(&log).unwrap();
        for _ in 0..3 {
            writer.append(Frame::empty(0, 4, 3)).unwrap();
        }
        writer.finish().unwrap();

        let prefix = dir.path().join("bones");
        let count = run(&log, &prefix.to_string_lossy(), false).unwrap();
        assert_eq!(count, 3);
        for i in 0..3 {
            assert!(dir.path().join(format!("bones-0000{i}.png")).exists());
        }
    }

    #[test]
    fn test_strict_fails_on_degenerate_bone() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("capture.jsonl");
        let mut writer = FrameLogWriter::create(&log).unwrap();
        writer.append(skeleton_frame()).unwrap();
        writer.finish().unwrap();

        let prefix = dir.path().join("bones");
        assert_eq!(run(&log, &prefix.to_string_lossy(), false).unwrap(), 1);
        let err = run(&log, &prefix.to_string_lossy(), true).unwrap_err();
        assert!(format!("{err:#}").contains("frame 0"));
    }

    #[test]
    fn test_missing_log_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().join("none.jsonl"), "x", false).unwrap_err();
        assert!(format!("{err:#}").contains("none.jsonl"));
    }
}
