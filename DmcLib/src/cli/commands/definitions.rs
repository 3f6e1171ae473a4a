use clap::Subcommand;
use std::path::PathBuf;

use crate::formats::motion::TrackChannel;

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Inspect a model file and display its structure
    Inspect {
        /// Model file to inspect
        path: PathBuf,

        /// Output to JSON file (prints to CLI if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Decoder settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum MotionCommands {
    /// Inspect a motion file and list its tracks
    Inspect {
        /// Motion file to inspect
        path: PathBuf,

        /// Output to JSON file (prints to CLI if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Decoder settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Sample one bone channel at a frame
    Sample {
        /// Motion file to read
        path: PathBuf,

        /// Bone index
        #[arg(short, long)]
        bone: usize,

        /// Channel (tx, ty, tz, rx, ry, rz, sx, sy, sz)
        #[arg(long)]
        channel: TrackChannel,

        /// Frame to sample (fractional frames allowed)
        #[arg(short, long)]
        frame: f64,

        /// Decoder settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Sample every track at each whole frame and write JSON
    Bake {
        /// Motion file to read
        path: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Decoder settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
}
