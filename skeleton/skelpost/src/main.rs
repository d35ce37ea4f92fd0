//! Skeleton log post-processing.
//!
//! Streams a recorded frame log and writes one PNG per frame.
//!
//! # Commands
//!
//! - `skelpost label-bones <logfile> <frame-prefix>` - false-coloured
//!   nearest-bone labels for the tracked skeleton
//! - `skelpost normal-shade <logfile> <frame-prefix>` - per-pixel surface
//!   normals encoded as RGB
//!
//! Output files are named `<frame-prefix>-<frame index, 5 digits>.png`.
//! Logging defaults to warnings; `--verbose` adds progress, and `RUST_LOG`
//! overrides both.

mod label_bones;
mod normal_shade;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use skel::normals::NormalMode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Progress is logged every this many frames.
const PROGRESS_INTERVAL: u64 = 30;

/// Post-process a recorded skeleton log into per-frame images
#[derive(Parser)]
#[command(name = "skelpost")]
#[command(about = "Render bone labels and surface normals from skeleton logs", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Colour each user pixel by the skeletal bone it is closest to
    LabelBones {
        /// JSON-lines frame log
        logfile: PathBuf,

        /// Output path prefix
        frame_prefix: String,

        /// Fail on a degenerate bone instead of dropping it
        #[arg(long)]
        strict: bool,
    },

    /// Shade each user pixel by its estimated surface normal
    NormalShade {
        /// JSON-lines frame log
        logfile: PathBuf,

        /// Output path prefix
        frame_prefix: String,

        /// Estimate from the point cloud ("point") or the depth map ("depth")
        #[arg(long, default_value = "point")]
        mode: NormalMode,
    },
}

fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));

    let _tracing = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::LabelBones {
            logfile,
            frame_prefix,
            strict,
        } => label_bones::run(&logfile, &frame_prefix, strict).map(drop),
        Commands::NormalShade {
            logfile,
            frame_prefix,
            mode,
        } => normal_shade::run(&logfile, &frame_prefix, mode).map(drop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_normal_shade_mode() {
        let cli = Cli::parse_from(["skelpost", "normal-shade", "--mode", "depth", "log.jsonl", "out/n"]);
        assert!(matches!(
            cli.command,
            Commands::NormalShade {
                mode: NormalMode::Depth,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_label_bones_verbose() {
        let cli = Cli::parse_from(["skelpost", "label-bones", "--verbose", "log.jsonl", "out/b"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::LabelBones {
                logfile,
                frame_prefix,
                strict,
            } => {
                assert_eq!(logfile, PathBuf::from("log.jsonl"));
                assert_eq!(frame_prefix, "out/b");
                assert!(!strict);
            }
            Commands::NormalShade { .. } => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let parsed =
            Cli::try_parse_from(["skelpost", "normal-shade", "--mode", "sonar", "log.jsonl", "x"]);
        assert!(parsed.is_err());
    }
}
