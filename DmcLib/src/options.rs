//! Decode options for model and motion files
//!
//! Options can be built in code with the `with_*` builders or loaded from a
//! TOML file:
//!
//! ```toml
//! bone_indices = "divide_with_fallback"
//! degenerate_triangles = "error"
//! unsupported_tracks = "abort"
//! parallel = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Policies
// ============================================================================

/// How raw on-disk bone index bytes are mapped to bone indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneIndexDecoding {
    /// Divide the raw byte by 4, truncating.
    #[default]
    Divide,
    /// Divide by 4 and clamp an out-of-range result to the last bone.
    DivideWithFallback,
}

impl BoneIndexDecoding {
    /// Map one raw index byte to a bone index.
    #[must_use]
    pub fn decode(self, raw: u8, bone_count: u8) -> u8 {
        let index = raw / 4;
        match self {
            Self::Divide => index,
            Self::DivideWithFallback => {
                if bone_count == 0 || index < bone_count {
                    index
                } else {
                    bone_count - 1
                }
            }
        }
    }
}

/// What to do with strip steps whose face normal cannot be computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateTriangles {
    /// Drop the triangle and keep walking the strip.
    #[default]
    Skip,
    /// Fail the mesh decode with [`Error::DegenerateTriangle`].
    Error,
}

/// What to do with tracks whose compression code is not supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedTracks {
    /// Record the track in `Motion::skipped` and continue with its siblings.
    #[default]
    Skip,
    /// Fail the whole motion decode.
    Abort,
}

// ============================================================================
// Options
// ============================================================================

/// Options controlling model and motion decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Bone index byte mapping for character meshes
    pub bone_indices: BoneIndexDecoding,
    /// Policy for zero-area strip triangles
    pub degenerate_triangles: DegenerateTriangles,
    /// Policy for tracks with unknown compression
    pub unsupported_tracks: UnsupportedTracks,
    /// Decode mesh vertex data on the rayon thread pool
    pub parallel: bool,
}

impl DecodeOptions {
    /// Create options with the default lenient policies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options that fail on any recoverable condition.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            bone_indices: BoneIndexDecoding::Divide,
            degenerate_triangles: DegenerateTriangles::Error,
            unsupported_tracks: UnsupportedTracks::Abort,
            parallel: false,
        }
    }

    /// Set the bone index decoding mode.
    #[must_use]
    pub fn with_bone_indices(mut self, mode: BoneIndexDecoding) -> Self {
        self.bone_indices = mode;
        self
    }

    /// Set the degenerate triangle policy.
    #[must_use]
    pub fn with_degenerate_triangles(mut self, policy: DegenerateTriangles) -> Self {
        self.degenerate_triangles = policy;
        self
    }

    /// Set the unsupported track policy.
    #[must_use]
    pub fn with_unsupported_tracks(mut self, policy: UnsupportedTracks) -> Self {
        self.unsupported_tracks = policy;
        self
    }

    /// Enable or disable parallel mesh decoding.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse options from a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the document does not parse.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    /// Returns [`Error::ConfigNotFound`] if the file is missing, or
    /// [`Error::InvalidConfig`] if it does not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
