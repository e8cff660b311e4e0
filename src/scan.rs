//! Candidate photo discovery.
//!
//! Walks a source directory tree and returns the ordered list of photo paths
//! the pipeline should consider. Discovery is deliberately upstream of the
//! pipeline core: the orchestrator only ever sees the path list this module
//! produces.
//!
//! ## Rules
//!
//! - Any directory containing a `.noframe` file is pruned entirely, including
//!   all of its subdirectories. Drop the marker into a folder to keep its
//!   photos off the frame.
//! - Only files with a whitelisted image extension are returned
//!   (case-insensitive).
//! - Entries are visited in file-name order, so the output is deterministic
//!   for a given tree.
//!
//! A missing or unreadable source directory is the one fatal condition of the
//! whole program; everything downstream degrades per image instead.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Marker file that excludes a directory subtree from discovery.
pub const EXCLUDE_MARKER: &str = ".noframe";

/// Extensions the pipeline accepts as source photos.
pub const VALID_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("source directory not found: {0}")]
    SourceDirNotFound(PathBuf),
    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

fn has_valid_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            VALID_EXTENSIONS
                .iter()
                .any(|valid| ext.eq_ignore_ascii_case(valid))
        })
}

fn is_excluded_dir(path: &Path) -> bool {
    path.join(EXCLUDE_MARKER).exists()
}

/// Discover candidate photos under `source`, in deterministic order.
pub fn scan(source: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !source.is_dir() {
        return Err(ScanError::SourceDirNotFound(source.to_path_buf()));
    }

    let mut candidates = Vec::new();
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && is_excluded_dir(entry.path()) {
                log::debug!("skipping {} ({EXCLUDE_MARKER} present)", entry.path().display());
                return false;
            }
            true
        });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && has_valid_extension(entry.path()) {
            candidates.push(entry.into_path());
        }
    }

    log::debug!("discovered {} candidate photos", candidates.len());
    Ok(candidates)
}
