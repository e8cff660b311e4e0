//! # frameprep
//!
//! Prepares photo collections for bandwidth-constrained digital photo
//! frames: resize to the frame's native resolution, overlay a caption with
//! the capture date and place, and enforce a hard per-image byte budget.
//!
//! # Architecture: Sequential Pipeline
//!
//! A run is a strict sequence over one photo at a time:
//!
//! ```text
//! scan  →  select  →  [ read → metadata → resize → caption → encode → budget → write ]*
//! ```
//!
//! Sequential processing is deliberate: frames hold hundreds of photos but a
//! decoded camera original is tens of megabytes, so bounding the pipeline to
//! one in-flight image keeps peak memory flat regardless of batch size.
//! Failures are isolated per image — one unreadable or oversized photo is
//! skipped and logged, never aborting the batch. Only a missing source
//! directory or an empty candidate set is fatal.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Candidate discovery — recursive walk, extension whitelist, `.noframe` subtree pruning |
//! | [`select`] | Bounded random selection when a run exceeds the photo cap |
//! | [`metadata`] | EXIF capture metadata: timestamp (with mtime fallback) and GPS coordinates |
//! | [`geocode`] | Reverse geocoding of GPS coordinates to place names, with graceful degradation |
//! | [`imaging`] | Per-image transformation: resize math, caption overlay, font handling, JPEG output |
//! | [`pipeline`] | The sequential orchestrator tying the stages together |
//! | [`config`] | `config.toml` loading and validation |
//! | [`progress`] | Progress reporting trait so callers own the presentation |
//! | [`types`] | Shared value types (`PreparedImage`, `CaptionMetadata`) |
//!
//! # Design Decisions
//!
//! ## Hard Byte Budget, No Retry
//!
//! An image whose encoded output exceeds `max_file_size_mb` is rejected, not
//! re-encoded at a lower quality. Frames render one fixed quality well; a
//! photo that blows the budget at quality 80 is an outlier worth surfacing
//! in the log rather than silently degrading.
//!
//! ## Caption Contrast From the Bottom Band
//!
//! Text color is chosen by the luminance of the bottom tenth of the resized
//! image for both caption positions. The 5x5 outline in the opposite color
//! keeps text legible even when the sampled band misrepresents the area
//! actually behind the text.
//!
//! ## Injected Randomness and Geocoding
//!
//! The selection RNG and the reverse geocoder are both passed in by the
//! caller. Runs are reproducible under test with a seeded
//! [`rand::rngs::StdRng`] and a mock geocoder, and the CLI decides whether a
//! run is seeded.

pub mod config;
pub mod geocode;
pub mod imaging;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod scan;
pub mod select;
pub mod types;
