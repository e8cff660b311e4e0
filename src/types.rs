//! Shared types used across pipeline stages.

use std::path::PathBuf;

/// One accepted output image, written to the caller's work directory.
///
/// Invariants maintained by the pipeline:
/// - `width <= target_width` and `height <= target_height`, with exactly one
///   of the two equal to its target (aspect ratio is preserved, so the other
///   dimension is derived).
/// - `size_bytes` never exceeds the configured output byte budget — images
///   over budget are dropped from the result set entirely rather than
///   represented with an error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    /// Where the encoded image was written.
    pub path: PathBuf,
    /// Encoded length of the file at `path`.
    pub size_bytes: u64,
    /// Final pixel width after the fit-resize.
    pub width: u32,
    /// Final pixel height after the fit-resize.
    pub height: u32,
}

/// Resolved caption content for a single image. Derived per image, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionMetadata {
    /// Capture timestamp formatted with the configured date pattern.
    pub timestamp: String,
    /// Place label from reverse geocoding, or the coordinate-string fallback.
    /// `None` when the photo has no GPS tags or geocoding failed unexpectedly.
    pub place: Option<String>,
}

impl CaptionMetadata {
    /// Caption lines in draw order: timestamp first, place second if present.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.timestamp.clone()];
        if let Some(place) = &self.place {
            lines.push(place.clone());
        }
        lines
    }
}
