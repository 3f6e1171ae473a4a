pub mod batch;
pub mod definitions;
pub mod execute;
pub mod model;
pub mod motion;

use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::options::DecodeOptions;
use definitions::{ModelCommands, MotionCommands};

#[derive(Subcommand)]
pub enum Commands {
    /// Model file operations (.mod / .scm)
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },

    /// Motion file operations (.mot)
    Motion {
        #[command(subcommand)]
        command: MotionCommands,
    },

    /// Decode every model and motion file under a directory
    Batch {
        /// Directory to scan recursively
        dir: PathBuf,

        /// Decoder settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Load decoder settings from `config`, or use the defaults.
pub(crate) fn load_options(config: Option<&Path>) -> anyhow::Result<DecodeOptions> {
    match config {
        Some(path) => Ok(DecodeOptions::load(path)?),
        None => Ok(DecodeOptions::default()),
    }
}
