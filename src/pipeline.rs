//! Batch orchestration: select, prepare, report.
//!
//! The orchestrator consumes an ordered candidate list (discovery lives
//! upstream in [`crate::scan`]) and runs strictly sequentially. One image
//! flows through read → metadata → resize → caption → encode → budget check
//! → write before the next one is touched, so peak memory is bounded by a
//! single decoded photo regardless of batch size.
//!
//! Failures split two ways: an empty candidate set or an unwritable output
//! directory abort the run, while anything that goes wrong with an
//! individual image (unreadable file, decode failure, blown byte budget)
//! only skips that image.

use crate::config::ProcessingOptions;
use crate::geocode::ReverseGeocoder;
use crate::imaging::{self, FontHandle, ImagingError};
use crate::metadata;
use crate::progress::ProgressSink;
use crate::select::select_candidates;
use crate::types::PreparedImage;
use image::ImageFormat;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no candidate photos to prepare")]
    NoCandidates,
    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why one image was dropped from the batch.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// Outcome of a full run. Accepted images keep the relative order of the
/// (possibly sampled) input.
#[derive(Debug)]
pub struct RunSummary {
    pub prepared: Vec<PreparedImage>,
    pub skipped: usize,
}

/// The sequential orchestrator. Collaborators are injected at construction;
/// nothing here touches global state.
pub struct Pipeline<'a> {
    options: &'a ProcessingOptions,
    geocoder: &'a dyn ReverseGeocoder,
    progress: &'a mut dyn ProgressSink,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        options: &'a ProcessingOptions,
        geocoder: &'a dyn ReverseGeocoder,
        progress: &'a mut dyn ProgressSink,
    ) -> Self {
        Self {
            options,
            geocoder,
            progress,
        }
    }

    /// Prepare the batch: select at most `max_photos` candidates and write
    /// the accepted outputs into `work_dir`.
    pub fn prepare<R: Rng>(
        &mut self,
        candidates: Vec<PathBuf>,
        work_dir: &Path,
        rng: &mut R,
    ) -> Result<RunSummary, PipelineError> {
        if candidates.is_empty() {
            return Err(PipelineError::NoCandidates);
        }

        let selected = select_candidates(candidates, self.options.max_photos, rng);
        fs::create_dir_all(work_dir).map_err(|source| PipelineError::CreateOutputDir {
            path: work_dir.to_path_buf(),
            source,
        })?;

        let font = FontHandle::resolve(self.options.caption.font_path.as_deref());
        let max_bytes = self.options.max_output_bytes();
        let total = selected.len();
        let started = Instant::now();

        let mut prepared = Vec::new();
        let mut skipped = 0usize;
        for (index, path) in selected.iter().enumerate() {
            let suffix = match self.prepare_one(index, path, work_dir, max_bytes, &font) {
                Ok(image) => {
                    let name = display_name(&image.path);
                    prepared.push(image);
                    name
                }
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    skipped += 1;
                    format!("skipped {}: {err}", display_name(path))
                }
            };
            self.progress.report(
                "preparing",
                started.elapsed().as_secs_f64(),
                index + 1,
                total,
                &suffix,
            );
        }

        log::info!("done: {} prepared, {skipped} skipped", prepared.len());
        Ok(RunSummary { prepared, skipped })
    }

    /// Prepare one photo and write it into `work_dir`.
    fn prepare_one(
        &self,
        index: usize,
        source: &Path,
        work_dir: &Path,
        max_bytes: u64,
        font: &FontHandle,
    ) -> Result<PreparedImage, PrepareError> {
        let bytes = fs::read(source)?;
        let format = imaging::detect_format(&bytes)?;
        let capture = metadata::read_capture_metadata(&bytes);

        let decoded = imaging::decode(&bytes)?;
        let mut resized = imaging::resize_to_fit(
            &decoded,
            (self.options.target_width, self.options.target_height),
        );

        if self.options.caption.enabled {
            let caption = metadata::resolve_caption_metadata(
                &capture,
                source,
                &self.options.caption.date_format,
                self.geocoder,
            )?;
            imaging::draw_caption(&mut resized, &caption, &self.options.caption, font);
        }

        let encoded = imaging::encode(&resized, format)?;
        imaging::check_budget(&encoded, max_bytes)?;

        let destination = work_dir.join(output_name(index, source, format));
        fs::write(&destination, &encoded)?;

        Ok(PreparedImage {
            path: destination,
            size_bytes: encoded.len() as u64,
            width: resized.width(),
            height: resized.height(),
        })
    }
}

/// Output file name for the nth image of the batch. The index prefix keeps
/// names unique when different source folders hold a same-named photo; the
/// extension follows the output container.
fn output_name(index: usize, source: &Path, format: ImageFormat) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    let ext = format.extensions_str().first().copied().unwrap_or("img");
    format!("{:04}_{stem}.{ext}", index + 1)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("?")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::GeocodeError;
    use crate::geocode::tests::MockGeocoder;
    use crate::progress::SilentProgress;
    use crate::progress::tests::RecordingProgress;
    use image::{DynamicImage, Rgb, RgbImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, image: RgbImage) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        fs::write(&path, buffer.into_inner()).unwrap();
        path
    }

    fn write_photo(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        write_png(dir, name, RgbImage::from_pixel(width, height, Rgb([90, 140, 60])))
    }

    /// Incompressible noise image; its lossless encoding is large.
    fn write_noise_photo(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let mut state = 0x2545F491u32;
        let noise = RgbImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Rgb([state as u8, (state >> 8) as u8, (state >> 16) as u8])
        });
        write_png(dir, name, noise)
    }

    fn test_options() -> ProcessingOptions {
        ProcessingOptions {
            target_width: 320,
            target_height: 200,
            ..Default::default()
        }
    }

    fn geocoder() -> MockGeocoder {
        MockGeocoder::Fail(GeocodeError::Other)
    }

    fn run(
        source: &Path,
        output: &Path,
        options: &ProcessingOptions,
        progress: &mut dyn crate::progress::ProgressSink,
    ) -> Result<RunSummary, PipelineError> {
        let candidates = crate::scan::scan(source).unwrap();
        let mocked = geocoder();
        let mut rng = StdRng::seed_from_u64(1);
        Pipeline::new(options, &mocked, progress).prepare(candidates, output, &mut rng)
    }

    #[test]
    fn prepares_every_candidate_in_order() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_photo(source.path(), "a.png", 640, 400);
        write_photo(source.path(), "b.png", 100, 400);
        write_photo(source.path(), "trips/c.png", 400, 100);

        let mut progress = RecordingProgress::default();
        let summary = run(source.path(), output.path(), &test_options(), &mut progress).unwrap();

        assert_eq!(summary.prepared.len(), 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(progress.reports.len(), 3);
        assert_eq!(progress.reports[2].1, 3); // current
        assert_eq!(progress.reports[2].2, 3); // total
        for image in &summary.prepared {
            assert!(image.path.exists());
            assert!(image.width <= 320 && image.height <= 200);
            assert!(image.width == 320 || image.height == 200);
            assert_eq!(image.size_bytes, fs::metadata(&image.path).unwrap().len());
        }
        // Input was discovered in name order; outputs keep it.
        let stems: Vec<_> = summary
            .prepared
            .iter()
            .map(|p| p.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(stems, vec!["0001_a.png", "0002_b.png", "0003_c.png"]);
    }

    #[test]
    fn corrupt_file_is_skipped_not_fatal() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_photo(source.path(), "good.png", 200, 200);
        fs::write(source.path().join("broken.jpg"), b"not an image").unwrap();

        let mut progress = RecordingProgress::default();
        let summary = run(source.path(), output.path(), &test_options(), &mut progress).unwrap();

        assert_eq!(summary.prepared.len(), 1);
        assert_eq!(summary.skipped, 1);
        // Every image reports, including the skip, and the reason is carried
        // in the suffix.
        assert_eq!(progress.reports.len(), 2);
        assert!(progress.reports.iter().any(|(_, _, _, s)| s.contains("broken.jpg")));
    }

    #[test]
    fn empty_candidate_list_aborts() {
        let output = TempDir::new().unwrap();
        let options = test_options();
        let mocked = geocoder();
        let mut progress = SilentProgress;
        let mut rng = StdRng::seed_from_u64(1);
        let result = Pipeline::new(&options, &mocked, &mut progress).prepare(
            Vec::new(),
            output.path(),
            &mut rng,
        );
        assert!(matches!(result, Err(PipelineError::NoCandidates)));
    }

    #[test]
    fn cap_bounds_the_batch() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for i in 0..5 {
            write_photo(source.path(), &format!("photo-{i}.png"), 100, 100);
        }

        let options = ProcessingOptions {
            max_photos: 2,
            ..test_options()
        };
        let summary = run(source.path(), output.path(), &options, &mut SilentProgress).unwrap();
        assert_eq!(summary.prepared.len(), 2);
    }

    #[test]
    fn over_budget_image_is_absent_from_the_output_set() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        // Three compressible photos and one incompressible one whose lossless
        // output exceeds a 1 MiB budget.
        write_photo(source.path(), "a.png", 200, 200);
        write_photo(source.path(), "b.png", 200, 200);
        write_photo(source.path(), "c.png", 200, 200);
        write_noise_photo(source.path(), "noise.png", 1280, 800);

        let options = ProcessingOptions {
            target_width: 1280,
            target_height: 800,
            max_file_size_mb: 1,
            ..Default::default()
        };
        let summary = run(source.path(), output.path(), &options, &mut SilentProgress).unwrap();

        assert_eq!(summary.prepared.len(), 3);
        assert_eq!(summary.skipped, 1);
        assert!(
            summary
                .prepared
                .iter()
                .all(|p| !p.path.to_str().unwrap().contains("noise"))
        );
    }

    #[test]
    fn rejected_output_is_not_written() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let photo = write_photo(source.path(), "big.png", 300, 200);

        let options = test_options();
        let mocked = geocoder();
        let mut progress = SilentProgress;
        let pipeline = Pipeline::new(&options, &mocked, &mut progress);
        // A 10 byte budget no encoder can meet
        let result = pipeline.prepare_one(0, &photo, output.path(), 10, &FontHandle::Builtin);
        assert!(matches!(
            result,
            Err(PrepareError::Imaging(ImagingError::OverBudget { .. }))
        ));
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn same_stem_in_different_folders_gets_unique_outputs() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_photo(source.path(), "april/cat.png", 100, 100);
        write_photo(source.path(), "may/cat.png", 100, 100);

        let summary =
            run(source.path(), output.path(), &test_options(), &mut SilentProgress).unwrap();
        assert_eq!(summary.prepared.len(), 2);
        assert_ne!(summary.prepared[0].path, summary.prepared[1].path);
    }

    #[test]
    fn caption_disabled_skips_overlay_and_geocoder() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_photo(source.path(), "plain.png", 100, 100);

        let mut options = test_options();
        options.caption.enabled = false;
        let summary =
            run(source.path(), output.path(), &options, &mut SilentProgress).unwrap();
        assert_eq!(summary.prepared.len(), 1);
    }

    #[test]
    fn output_name_keeps_container_extension() {
        assert_eq!(
            output_name(0, Path::new("/photos/rome.JPG"), ImageFormat::Jpeg),
            "0001_rome.jpg"
        );
        assert_eq!(
            output_name(41, Path::new("cat.png"), ImageFormat::Png),
            "0042_cat.png"
        );
    }
}
