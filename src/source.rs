//! Sequential video sources.
//!
//! [`FrameSource`] is the capability the sampler depends on: report a frame
//! rate and frame count, then hand out decoded frames strictly in order until
//! the stream ends. [`VideoSource`] implements it on top of FFmpeg.
//!
//! A source is released when it is dropped, so every exit path of a run
//! (exhaustion, cancellation, an aborted write) closes the demuxer and
//! decoder exactly once.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::DynamicImage;

use crate::{
    configuration::PixelFormat,
    conversion::{frame_to_image, rational_to_frame_rate},
    error::SamplerError,
    metadata::VideoMetadata,
};

/// A forward-only sequence of decoded frames.
pub trait FrameSource {
    /// Frame rate reported by the source. Zero or non-finite when unknown.
    fn frame_rate(&self) -> f64;

    /// Frame count reported by the source, if any.
    fn frame_count(&self) -> Option<u64>;

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` at end of stream. An `Err` means the stream could
    /// not be decoded any further.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, SamplerError>;
}

/// An FFmpeg-backed [`FrameSource`] over the best video stream of a file.
///
/// # Example
///
/// ```no_run
/// use frame_sampler::{FrameSource, VideoSource};
///
/// let mut source = VideoSource::open("input.mp4")?;
/// while let Some(image) = source.read_frame()? {
///     println!("{}x{}", image.width(), image.height());
/// }
/// # Ok::<(), frame_sampler::SamplerError>(())
/// ```
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    metadata: VideoMetadata,
    pixel_format: PixelFormat,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
    path: PathBuf,
}

impl VideoSource {
    /// Open a video file, decoding frames as RGB8.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::FileOpen`] if the file cannot be opened or its
    /// codec is unsupported, and [`SamplerError::NoVideoStream`] if it holds
    /// no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SamplerError> {
        Self::open_with_pixel_format(path, PixelFormat::Rgb8)
    }

    /// Open a video file, decoding frames into `pixel_format`.
    pub fn open_with_pixel_format<P: AsRef<Path>>(
        path: P,
        pixel_format: PixelFormat,
    ) -> Result<Self, SamplerError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video source: {}", path.display());

        let open_error = |reason: String| SamplerError::FileOpen {
            path: path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SamplerError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frames_per_second = rational_to_frame_rate(stream.avg_frame_rate())
            .or_else(|| rational_to_frame_rate(stream.rate()))
            .unwrap_or(0.0);

        let frame_count = match stream.frames() {
            count if count > 0 => count as u64,
            _ if frames_per_second > 0.0 => {
                (duration.as_secs_f64() * frames_per_second).round() as u64
            }
            _ => 0,
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
            duration,
            format: input_context.format().name().to_string(),
        };

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            pixel_format.to_ffmpeg_pixel(),
            metadata.width,
            metadata.height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create pixel converter: {error}")))?;

        log::debug!(
            "Opened {} (stream={}, {}x{}, fps={:.3}, frames={}, codec={})",
            path.display(),
            video_stream_index,
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            metadata,
            pixel_format,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
            path,
        })
    }

    /// Metadata read when the source was opened.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, SamplerError> {
        self.scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;
        frame_to_image(
            &self.scaled_frame,
            self.metadata.width,
            self.metadata.height,
            self.pixel_format,
        )
    }
}

impl FrameSource for VideoSource {
    fn frame_rate(&self) -> f64 {
        self.metadata.frames_per_second
    }

    fn frame_count(&self) -> Option<u64> {
        self.metadata.known_frame_count()
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, SamplerError> {
        if self.done {
            return Ok(None);
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return match self.convert_current_frame() {
                    Ok(image) => Ok(Some(image)),
                    Err(error) => {
                        self.done = true;
                        Err(error)
                    }
                };
            }

            if self.eof_sent {
                self.done = true;
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        self.done = true;
                        return Err(SamplerError::VideoDecodeError(error.to_string()));
                    }
                }
                Err(FfmpegError::Eof) => {
                    // Drain frames still buffered in the decoder.
                    if let Err(error) = self.decoder.send_eof() {
                        self.done = true;
                        return Err(SamplerError::from(error));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    self.done = true;
                    return Err(SamplerError::VideoDecodeError(error.to_string()));
                }
            }
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        log::debug!("Releasing video source: {}", self.path.display());
    }
}
