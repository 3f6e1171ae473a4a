//! Motion files (`.mot` skeletal animation clips)
//!
//! A motion holds one group of scalar tracks per animated bone. Tracks store
//! 16-bit quantized keyframes interpolated linearly or with cubic Hermite
//! curves.

pub mod reader;
pub mod sampler;
mod types;

pub use reader::{MotionReader, read_motion, read_motion_file, read_motion_with_options};
pub use sampler::{POSITION_SCALE, hermite, lerp, sample, sample_segment};
pub use types::{
    Compression, HermiteTangents, Keyframe, Motion, MotionHeader, Quantization, SkippedTrack,
    TangentQuantization, Track, TrackChannel, TrackGroup, TransformKind,
};
