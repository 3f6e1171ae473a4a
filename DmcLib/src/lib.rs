//! # DmcLib
//!
//! A pure-Rust library for reading Devil May Cry 3 model and motion files.
//!
//! ## Supported Formats
//!
//! - **MOD / SCM** - Character and stage models: objects, meshes, triangle
//!   strips and the bone hierarchy
//! - **MOT** - Skeletal motions: quantized keyframe tracks with linear and
//!   cubic Hermite interpolation
//!
//! ## Quick Start
//!
//! ### Reading a Model
//!
//! ```no_run
//! use dmclib::formats::model::read_model_file;
//! use dmclib::DecodeOptions;
//!
//! let model = read_model_file("pl000.mod", &DecodeOptions::default())?;
//! for (object, mesh, data) in model.meshes() {
//!     println!("{} has {} triangles", data.display_name(object, mesh), data.triangles.len());
//! }
//! # Ok::<(), dmclib::Error>(())
//! ```
//!
//! ### Sampling a Motion
//!
//! ```no_run
//! use dmclib::formats::motion::{TrackChannel, read_motion_file};
//! use dmclib::DecodeOptions;
//!
//! let motion = read_motion_file("pl000_walk.mot", &DecodeOptions::default())?;
//! if let Some(track) = motion.group(0).and_then(|g| g.track(TrackChannel::RotationY)) {
//!     println!("rotation at frame 12.5: {}", track.sample(12.5)?);
//! }
//! # Ok::<(), dmclib::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use dmclib::prelude::*;
//!
//! let options = DecodeOptions::strict();
//! assert!(!options.parallel);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `dmclib` command-line binary

pub mod batch;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod options;

// Re-exports for convenience
pub use error::{Error, Result};
pub use options::DecodeOptions;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::options::{
        BoneIndexDecoding, DecodeOptions, DegenerateTriangles, UnsupportedTracks,
    };

    pub use crate::formats::common::BinaryReader;
    pub use crate::formats::model::{
        Bone, Mesh, Model, ModelKind, Object, Skeleton, VertexChannels, VertexData, read_model,
        read_model_file, read_model_with_options,
    };
    pub use crate::formats::motion::{
        Compression, Keyframe, Motion, Track, TrackChannel, TrackGroup, read_motion,
        read_motion_file, read_motion_with_options,
    };

    pub use crate::batch::{BatchResult, batch_inspect, find_asset_files};
    pub use crate::inspect::{ModelInfo, MotionInfo, inspect_model, inspect_motion};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
