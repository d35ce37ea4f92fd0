//! `normal-shade`: per-pixel surface normals as RGB per frame.

use std::path::Path;

use anyhow::{Context, Result};
use skel::log::{FrameSource, JsonLinesFrameSource};
use skel::normals::{NormalMode, NormalParams, frame_normals};
use skel::render::{OutputPattern, RenderEncoder};
use tracing::info;

use crate::PROGRESS_INTERVAL;

/// Shades every frame of `logfile`, returning the number of frames written.
pub fn run(logfile: &Path, frame_prefix: &str, mode: NormalMode) -> Result<u64> {
    info!(path = %logfile.display(), ?mode, "Opening log file");
    let source = JsonLinesFrameSource::open(logfile)
        .with_context(|| format!("failed to open {}", logfile.display()))?;

    let params = NormalParams::for_mode(mode);
    let encoder = RenderEncoder::new(OutputPattern::new(frame_prefix));

    let mut count = 0;
    for frame in source.frames() {
        let frame = frame.with_context(|| format!("failed to read {}", logfile.display()))?;
        if frame.index % PROGRESS_INTERVAL == 0 {
            info!(frame = frame.index, "Processing frame");
        }

        let normals = frame_normals(&frame, &params)
            .with_context(|| format!("failed to estimate normals for frame {}", frame.index))?;
        encoder
            .write_normals(frame.index, &normals)
            .with_context(|| format!("failed to write frame {}", frame.index))?;
        count += 1;
    }

    info!(frames = count, "Finished shading normals");
    Ok(count)
}
