//! Error types for the `frame-sampler` crate.
//!
//! This module defines [`SamplerError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the paths and
//! upstream messages needed to diagnose a failed run.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `frame-sampler` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SamplerError {
    /// The video source could not be opened.
    #[error("Failed to open video source at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The source does not contain a video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O failure.
        source: IoError,
    },

    /// A sampled frame could not be encoded or written.
    #[error("Failed to write frame {frame_number} to {path}: {reason}")]
    FrameWrite {
        /// Index of the frame in decode order.
        frame_number: u64,
        /// Destination file.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// A stride of zero was supplied.
    #[error("Stride must be greater than zero")]
    InvalidStride,

    /// JPEG quality outside of `1..=100`.
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    /// The output extension does not map to a supported image format.
    #[error("Unsupported output image extension: {0}")]
    UnsupportedOutputFormat(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The run was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for SamplerError {
    fn from(error: FfmpegError) -> Self {
        SamplerError::FfmpegError(error.to_string())
    }
}
