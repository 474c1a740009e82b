//! # frame-sampler
//!
//! Walk a video's frames in decode order and write every K-th frame to disk
//! as an image, where K is either a fixed frame count or derived from the
//! video's frame rate so that one frame is kept per second of playback.
//!
//! Decoding is done by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and frames are
//! encoded with [`image`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use frame_sampler::{FrameSampler, SamplerConfig, SamplerError, Stride};
//!
//! // One frame per second of playback.
//! let summary = FrameSampler::new(SamplerConfig::new("input.mp4", "frames")).run()?;
//! println!("{} frames processed, {} saved", summary.observed, summary.saved);
//!
//! // Every 30th frame.
//! frame_sampler::sample("input.mp4", "frames", Stride::fixed(30)?)?;
//! # Ok::<(), SamplerError>(())
//! ```
//!
//! Frames are written as `frame_<index>.jpg` with a six-digit zero-padded
//! decode index, so re-running into the same directory overwrites the
//! previous output.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod progress;
pub mod sampler;
pub mod source;
pub mod writer;

pub use configuration::{
    DEFAULT_JPEG_QUALITY, DEFAULT_PROGRESS_INTERVAL, OutputFormat, PixelFormat, SamplerConfig,
    Stride, WriteFailurePolicy,
};
pub use error::SamplerError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use sampler::{FrameSampler, RunSummary, sample};
pub use source::{FrameSource, VideoSource};
pub use writer::{FrameWriter, ImageFileWriter, frame_file_name};
