//! Batch inspection
//!
//! Finds model and motion files under a directory and decodes them in
//! parallel, counting successes and failures.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::inspect::{inspect_model, inspect_motion};
use crate::options::DecodeOptions;

/// Asset type derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// `.mod` or `.scm`
    Model,
    /// `.mot`
    Motion,
}

impl AssetKind {
    /// Classify a path by extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mod" | "scm" => Some(Self::Model),
            "mot" => Some(Self::Motion),
            _ => None,
        }
    }
}

/// Progress information for batch operations
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// File being processed
    pub current_file: String,
}

/// Result of a batch operation
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Number of successful operations
    pub success_count: usize,
    /// Number of failed operations
    pub fail_count: usize,
    /// One message per file processed
    pub results: Vec<String>,
}

/// Find all model and motion files in a directory recursively.
///
/// Returns a sorted list of paths.
pub fn find_asset_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_file() && AssetKind::from_path(e.path()).is_some())
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Decode every file in parallel and summarize the outcome per file.
///
/// Results keep the order of `files`.
pub fn batch_inspect<F>(files: &[PathBuf], options: &DecodeOptions, progress: F) -> BatchResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<String> = files
        .par_iter()
        .map(|path| {
            let file_name = path.to_string_lossy().to_string();
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                current_file: file_name.clone(),
            });

            let summary = match AssetKind::from_path(path) {
                Some(AssetKind::Model) => inspect_model(path, options).map(|info| {
                    format!(
                        "{} model: {} objects, {} meshes, {} triangles, {} bones",
                        info.kind.as_str(),
                        info.object_count,
                        info.mesh_count,
                        info.triangle_count,
                        info.skeleton.bone_count
                    )
                }),
                Some(AssetKind::Motion) => inspect_motion(path, options).map(|info| {
                    format!(
                        "motion {}: {} tracks, {} skipped, frames {}..{}",
                        info.id,
                        info.decoded_track_count,
                        info.skipped.len(),
                        info.start_frame,
                        info.end_frame
                    )
                }),
                None => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    return format!("Skipped {file_name}: unknown file type");
                }
            };

            match summary {
                Ok(line) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    format!("{file_name}: {line}")
                }
                Err(e) => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!(file = %file_name, error = %e, "failed to decode");
                    format!("Failed {file_name}: {e}")
                }
            }
        })
        .collect();

    BatchResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    }
}
