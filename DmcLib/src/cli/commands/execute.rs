//! Command execution implementations

use super::Commands;
use super::definitions::{ModelCommands, MotionCommands};
use super::{batch, load_options, model, motion};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Model { command } => command.execute(),
            Commands::Motion { command } => command.execute(),
            Commands::Batch { dir, config, quiet } => {
                batch::execute(dir, &load_options(config.as_deref())?, *quiet)
            }
        }
    }
}

impl ModelCommands {
    /// Execute the selected model command.
    ///
    /// # Errors
    /// Returns an error if the model cannot be decoded or written.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ModelCommands::Inspect {
                path,
                output,
                config,
            } => model::inspect(path, output.as_deref(), &load_options(config.as_deref())?),
        }
    }
}

impl MotionCommands {
    /// Execute the selected motion command.
    ///
    /// # Errors
    /// Returns an error if the motion cannot be decoded or sampled.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            MotionCommands::Inspect {
                path,
                output,
                config,
            } => motion::inspect(path, output.as_deref(), &load_options(config.as_deref())?),
            MotionCommands::Sample {
                path,
                bone,
                channel,
                frame,
                config,
            } => motion::sample(
                path,
                *bone,
                *channel,
                *frame,
                &load_options(config.as_deref())?,
            ),
            MotionCommands::Bake {
                path,
                output,
                config,
                quiet,
            } => motion::bake(path, output, &load_options(config.as_deref())?, *quiet),
        }
    }
}
