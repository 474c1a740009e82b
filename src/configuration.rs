//! Sampling configuration.
//!
//! [`SamplerConfig`] is a builder carrying everything a run needs: the
//! source and destination, the [`Stride`] policy, output encoding, the
//! write-failure policy, and optional progress and cancellation hooks.
//!
//! # Example
//!
//! ```no_run
//! use frame_sampler::{OutputFormat, SamplerConfig, SamplerError, Stride};
//!
//! let config = SamplerConfig::new("input.mp4", "frames")
//!     .with_stride(Stride::fixed(30)?)
//!     .with_output_format(OutputFormat::Jpeg { quality: 90 });
//! # Ok::<(), SamplerError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ffmpeg_next::format::Pixel;
use image::ImageFormat;

use crate::error::SamplerError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// How often a progress notice is logged, in saved frames. Also the default
/// progress callback cadence.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Sampling cadence: the number of decoded frames between two saved frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stride {
    /// Save every K-th frame.
    Fixed(NonZeroU64),
    /// Save one frame per second of playback. K is derived once from the
    /// source's reported frame rate.
    #[default]
    PerSecond,
}

impl Stride {
    /// A fixed stride of `k` frames.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidStride`] if `k` is zero.
    pub fn fixed(k: u64) -> Result<Self, SamplerError> {
        NonZeroU64::new(k)
            .map(Stride::Fixed)
            .ok_or(SamplerError::InvalidStride)
    }

    /// Resolve the effective stride for a source reporting `frame_rate`.
    ///
    /// Fixed strides ignore the rate. Derived strides are
    /// `max(1, round(frame_rate))`; a zero, negative, or non-finite rate
    /// yields 1.
    pub fn resolve(self, frame_rate: f64) -> u64 {
        match self {
            Stride::Fixed(k) => k.get(),
            Stride::PerSecond => stride_from_frame_rate(frame_rate),
        }
    }
}

fn stride_from_frame_rate(frame_rate: f64) -> u64 {
    let rounded = frame_rate.round();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as u64
    } else {
        1
    }
}

/// Image encoding for saved frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG at the given quality (1–100).
    Jpeg {
        /// Encoder quality, 1 (worst) to 100 (best).
        quality: u8,
    },
    /// Lossless PNG.
    Png,
    /// Uncompressed BMP.
    Bmp,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// Pick a format from a file extension (with or without the leading dot).
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::UnsupportedOutputFormat`] for anything other
    /// than `jpg`, `jpeg`, `png`, or `bmp`.
    pub fn from_extension(extension: &str) -> Result<Self, SamplerError> {
        let clean = extension.trim_start_matches('.').to_ascii_lowercase();
        match clean.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::default()),
            "png" => Ok(OutputFormat::Png),
            "bmp" => Ok(OutputFormat::Bmp),
            _ => Err(SamplerError::UnsupportedOutputFormat(extension.to_string())),
        }
    }

    /// The extension written into frame file names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
        }
    }

    pub(crate) fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg { .. } => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Pixel layout of decoded frames before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    pub(crate) fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// What to do when a sampled frame cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFailurePolicy {
    /// Log the failure, count it in
    /// [`RunSummary::failed`](crate::RunSummary::failed), and keep sampling.
    #[default]
    Skip,
    /// Stop the run and return the write error.
    Abort,
}

/// Configuration for a sampling run.
#[derive(Clone)]
pub struct SamplerConfig {
    pub(crate) source_path: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) stride: Stride,
    pub(crate) output_format: OutputFormat,
    pub(crate) pixel_format: PixelFormat,
    pub(crate) write_failure_policy: WriteFailurePolicy,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    /// Progress callback cadence, in saved frames.
    pub(crate) batch_size: u64,
}

impl Debug for SamplerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SamplerConfig")
            .field("source_path", &self.source_path)
            .field("output_dir", &self.output_dir)
            .field("stride", &self.stride)
            .field("output_format", &self.output_format)
            .field("pixel_format", &self.pixel_format)
            .field("write_failure_policy", &self.write_failure_policy)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl SamplerConfig {
    /// Create a configuration with default settings.
    ///
    /// Defaults: one frame per second of playback, JPEG at quality
    /// [`DEFAULT_JPEG_QUALITY`], RGB8, skip failed writes, a progress
    /// callback every [`DEFAULT_PROGRESS_INTERVAL`] saves, no cancellation.
    pub fn new<S: AsRef<Path>, O: AsRef<Path>>(source_path: S, output_dir: O) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            stride: Stride::default(),
            output_format: OutputFormat::default(),
            pixel_format: PixelFormat::default(),
            write_failure_policy: WriteFailurePolicy::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set the sampling stride.
    #[must_use]
    pub fn with_stride(mut self, stride: Stride) -> Self {
        self.stride = stride;
        self
    }

    /// Set the image encoding for saved frames.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the JPEG quality. Switches the output format to JPEG.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidQuality`] outside of `1..=100`.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Result<Self, SamplerError> {
        if !(1..=100).contains(&quality) {
            return Err(SamplerError::InvalidQuality(quality));
        }
        self.output_format = OutputFormat::Jpeg { quality };
        Ok(self)
    }

    /// Set the pixel layout frames are converted to before encoding.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Choose between skipping and aborting on a failed frame write.
    #[must_use]
    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    /// Attach a progress callback, fired every
    /// [`batch_size`](SamplerConfig::with_batch_size) saves.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before every frame read.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how many saved frames separate two progress callbacks.
    /// Clamped to a minimum of 1. The logged progress notice keeps its own
    /// [`DEFAULT_PROGRESS_INTERVAL`] cadence.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Path of the video source.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory frames are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The configured stride policy.
    pub fn stride(&self) -> Stride {
        self.stride
    }

    /// The configured output format.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
