//! Persisting sampled frames.
//!
//! [`FrameWriter`] is the write-image half of the sampler's collaborator;
//! [`ImageFileWriter`] encodes frames with the `image` crate.

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::{configuration::OutputFormat, error::SamplerError};

/// Writes one frame to one file.
pub trait FrameWriter {
    /// File extension matching the encoding [`write`](Self::write) produces,
    /// without the leading dot. Frame file names are built from it.
    fn extension(&self) -> &str;

    /// Encode `image` and write it to `path`, replacing any existing file.
    fn write(&self, path: &Path, image: &DynamicImage) -> Result<(), SamplerError>;
}

/// Encodes frames to files in a fixed [`OutputFormat`].
#[derive(Debug, Clone, Copy)]
pub struct ImageFileWriter {
    format: OutputFormat,
}

impl ImageFileWriter {
    /// Create a writer for `format`.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// The format frames are encoded in.
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl FrameWriter for ImageFileWriter {
    fn extension(&self) -> &str {
        self.format.extension()
    }

    /// The frame is encoded in memory first, so an encoder error never
    /// touches the file system. A failed write removes the partial file.
    fn write(&self, path: &Path, image: &DynamicImage) -> Result<(), SamplerError> {
        let mut encoded = Vec::new();
        match self.format {
            OutputFormat::Jpeg { quality } => {
                let encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
                image.write_with_encoder(encoder)?;
            }
            other => image.write_to(&mut Cursor::new(&mut encoded), other.image_format())?,
        }

        if let Err(error) = fs::write(path, &encoded) {
            if path.is_file() {
                log::debug!("Removing partially written {}", path.display());
                let _ = fs::remove_file(path);
            }
            return Err(error.into());
        }
        Ok(())
    }
}

/// File name for the frame at `frame_number`, zero-padded to six digits.
///
/// ```
/// assert_eq!(frame_sampler::frame_file_name(300, "jpg"), "frame_000300.jpg");
/// ```
pub fn frame_file_name(frame_number: u64, extension: &str) -> String {
    format!("frame_{frame_number:06}.{extension}")
}

pub(crate) fn frame_path(output_dir: &Path, frame_number: u64, extension: &str) -> PathBuf {
    output_dir.join(frame_file_name(frame_number, extension))
}
