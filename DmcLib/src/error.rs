//! Error types for `dmclib`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `dmclib` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Stream Errors ====================
    /// The stream ended before a field could be read.
    #[error("truncated input at offset 0x{offset:x}: needed {expected} bytes, {available} available")]
    TruncatedInput {
        /// Stream position of the failed read.
        offset: u64,
        /// Number of bytes the read required.
        expected: usize,
        /// Number of bytes left in the stream.
        available: usize,
    },

    /// A null-terminated string ran off the end of the stream.
    #[error("unterminated string starting at offset 0x{offset:x}")]
    UnterminatedString {
        /// Stream position where the string started.
        offset: u64,
    },

    /// A seek target resolved to a negative stream position.
    #[error("invalid offset: {offset}")]
    InvalidOffset {
        /// The requested position.
        offset: i64,
    },

    // ==================== Model Errors ====================
    /// The model header tag is neither `"MOD "` nor `"SCM "`.
    #[error("unknown format tag {0:?}: expected \"MOD \" or \"SCM \"")]
    UnknownFormatTag([u8; 4]),

    /// The skeleton parent tables do not describe a valid bone forest.
    #[error("malformed bone hierarchy at bone {bone}: {reason}")]
    MalformedHierarchy {
        /// Bone (or table slot) where the problem was found.
        bone: usize,
        /// Description of what is invalid.
        reason: String,
    },

    /// A triangle strip step produced a triangle with no usable face normal.
    #[error("degenerate triangle ending at strip vertex {vertex}")]
    DegenerateTriangle {
        /// Index of the strip vertex that closes the triangle.
        vertex: usize,
    },

    // ==================== Motion Errors ====================
    /// A track uses a compression code the decoder cannot read.
    #[error("unsupported track compression {code} at offset 0x{offset:x}")]
    UnsupportedCompression {
        /// The compression code found in the track header.
        code: u16,
        /// Stream position of the track header.
        offset: u64,
    },

    /// Two consecutive keyframes share a time index.
    #[error("zero-length interpolation span at frame {time}")]
    DegenerateInterpolationSpan {
        /// The shared time index.
        time: u16,
    },

    /// A curve was sampled that holds no keyframes.
    #[error("track has no keyframes")]
    NoKeyframes,

    /// A segment index does not name a pair of consecutive keyframes.
    #[error("segment {segment} out of range for {key_count} keyframes")]
    SegmentOutOfRange {
        /// Index of the segment's closing keyframe.
        segment: usize,
        /// Number of keyframes in the track.
        key_count: usize,
    },

    /// The motion header declares a size that ends inside its own tables.
    #[error("motion header size {size} is smaller than its tables ({required} bytes)")]
    InvalidHeaderSize {
        /// Declared size.
        size: u32,
        /// Bytes occupied by the header and track masks.
        required: u64,
    },

    // ==================== Configuration Errors ====================
    /// Decode options could not be parsed.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// The parser error message.
        message: String,
    },

    /// A configuration file does not exist.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// The missing path.
        path: PathBuf,
    },

    // ==================== Parsing Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid format error (use specific variants when possible).
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfig {
            message: err.to_string(),
        }
    }
}

/// A specialized Result type for `dmclib` operations.
pub type Result<T> = std::result::Result<T, Error>;
