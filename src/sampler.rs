//! The frame sampling loop.
//!
//! [`FrameSampler`] walks a [`FrameSource`] in decode order and writes every
//! K-th frame (K being the resolved [`Stride`](crate::Stride)) to the output
//! directory as `frame_<index>.<ext>`. The source is consumed strictly in
//! order and no decoded frame outlives its loop iteration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    configuration::{DEFAULT_PROGRESS_INTERVAL, SamplerConfig, Stride, WriteFailurePolicy},
    error::SamplerError,
    progress::ProgressTracker,
    source::{FrameSource, VideoSource},
    writer::{FrameWriter, ImageFileWriter, frame_path},
};

/// Counters produced once at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct RunSummary {
    /// Frames decoded from the source, saved or not.
    pub observed: u64,
    /// Frames written to the output directory.
    pub saved: u64,
    /// Frames selected for saving whose write failed and was skipped.
    pub failed: u64,
    /// Effective stride used for the run.
    pub stride: u64,
    /// Directory frames were written to.
    pub output_dir: PathBuf,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Samples frames from a video according to a [`SamplerConfig`].
///
/// # Example
///
/// ```no_run
/// use frame_sampler::{FrameSampler, SamplerConfig, SamplerError, Stride};
///
/// let config = SamplerConfig::new("input.mp4", "frames").with_stride(Stride::PerSecond);
/// let summary = FrameSampler::new(config).run()?;
/// println!("saved {} of {} frames", summary.saved, summary.observed);
/// # Ok::<(), SamplerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrameSampler {
    config: SamplerConfig,
}

impl FrameSampler {
    /// Create a sampler for `config`.
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// The configuration this sampler runs with.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Run against the configured video file.
    ///
    /// Creates the output directory, opens the source, samples it, and
    /// releases it before returning.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::OutputDirectory`] if the directory cannot be created.
    /// - [`SamplerError::FileOpen`] or [`SamplerError::NoVideoStream`] if the
    ///   source cannot be opened. Nothing is written in that case.
    /// - [`SamplerError::FrameWrite`] under [`WriteFailurePolicy::Abort`].
    /// - [`SamplerError::Cancelled`] if the cancellation token fires.
    pub fn run(&self) -> Result<RunSummary, SamplerError> {
        ensure_output_dir(&self.config.output_dir)?;

        let mut source = VideoSource::open_with_pixel_format(
            &self.config.source_path,
            self.config.pixel_format,
        )?;

        let metadata = source.metadata();
        log::info!(
            "Video loaded: {} ({}x{}, {:.3} fps, {} frames)",
            source.path().display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
        );

        let writer = ImageFileWriter::new(self.config.output_format);
        self.sample_frames(&mut source, &writer)
    }

    /// Run against an already-open source and an arbitrary writer.
    ///
    /// The output directory is created if missing. Frame file names take the
    /// writer's [`extension`](FrameWriter::extension), so the configured
    /// output format only applies to [`run`](Self::run). The source is
    /// borrowed, so releasing it remains the caller's responsibility.
    pub fn sample_source<S, W>(
        &self,
        source: &mut S,
        writer: &W,
    ) -> Result<RunSummary, SamplerError>
    where
        S: FrameSource + ?Sized,
        W: FrameWriter + ?Sized,
    {
        ensure_output_dir(&self.config.output_dir)?;
        self.sample_frames(source, writer)
    }

    fn sample_frames<S, W>(&self, source: &mut S, writer: &W) -> Result<RunSummary, SamplerError>
    where
        S: FrameSource + ?Sized,
        W: FrameWriter + ?Sized,
    {
        let config = &self.config;
        let stride = config.stride.resolve(source.frame_rate());
        let extension = writer.extension();
        let tracker = ProgressTracker::new(
            config.progress.clone(),
            source.frame_count(),
            config.batch_size,
        );

        match config.stride {
            Stride::PerSecond => log::info!(
                "Saving every {stride} frames (1 per second at {:.3} fps)",
                source.frame_rate()
            ),
            Stride::Fixed(_) => log::info!("Saving every {stride} frames"),
        }

        let mut observed: u64 = 0;
        let mut saved: u64 = 0;
        let mut failed: u64 = 0;

        loop {
            if config.is_cancelled() {
                log::info!("Sampling cancelled after {observed} frames");
                return Err(SamplerError::Cancelled);
            }

            let image = match source.read_frame() {
                Ok(Some(image)) => image,
                Ok(None) => break,
                Err(error) => {
                    log::warn!("Stopping at frame {observed}: {error}");
                    break;
                }
            };

            if observed % stride == 0 {
                let path = frame_path(&config.output_dir, observed, extension);
                match writer.write(&path, &image) {
                    Ok(()) => {
                        saved += 1;
                        if saved % DEFAULT_PROGRESS_INTERVAL == 0 {
                            log::info!("Saved {saved} frames so far");
                        }
                        tracker.frame_saved(observed + 1, saved);
                    }
                    Err(error) => {
                        let error = SamplerError::FrameWrite {
                            frame_number: observed,
                            path,
                            reason: error.to_string(),
                        };
                        match config.write_failure_policy {
                            WriteFailurePolicy::Skip => {
                                log::warn!("{error}");
                                failed += 1;
                            }
                            WriteFailurePolicy::Abort => return Err(error),
                        }
                    }
                }
            }

            observed += 1;
        }

        tracker.finish(observed, saved);

        let summary = RunSummary {
            observed,
            saved,
            failed,
            stride,
            output_dir: config.output_dir.clone(),
            elapsed: tracker.elapsed(),
        };

        log::info!(
            "Sampling complete: {} frames processed, {} images saved to {}",
            summary.observed,
            summary.saved,
            summary.output_dir.display(),
        );
        if summary.failed > 0 {
            log::warn!("{} frames could not be written", summary.failed);
        }

        Ok(summary)
    }
}

/// Sample `source_path` into `output_dir` with the given stride and default
/// settings otherwise.
///
/// # Example
///
/// ```no_run
/// use frame_sampler::{SamplerError, Stride};
///
/// let summary = frame_sampler::sample("input.mp4", "frames", Stride::fixed(30)?)?;
/// assert_eq!(summary.saved, summary.observed.div_ceil(30));
/// # Ok::<(), SamplerError>(())
/// ```
pub fn sample<S: AsRef<Path>, O: AsRef<Path>>(
    source_path: S,
    output_dir: O,
    stride: Stride,
) -> Result<RunSummary, SamplerError> {
    FrameSampler::new(SamplerConfig::new(source_path, output_dir).with_stride(stride)).run()
}

/// Create `output_dir` and its parents if missing. Idempotent.
pub(crate) fn ensure_output_dir(output_dir: &Path) -> Result<(), SamplerError> {
    if output_dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(output_dir).map_err(|source| SamplerError::OutputDirectory {
        path: output_dir.to_path_buf(),
        source,
    })?;
    log::info!("Created output directory: {}", output_dir.display());
    Ok(())
}
