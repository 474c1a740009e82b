//! Video source metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for the lifetime of the source. The sampler reads the
//! frame rate from it exactly once to derive a per-second stride.

use std::time::Duration;

/// Properties of the video stream being sampled.
///
/// # Example
///
/// ```no_run
/// use frame_sampler::VideoSource;
///
/// let source = VideoSource::open("input.mp4").unwrap();
/// let metadata = source.metadata();
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Reported frames per second. May be approximate for variable frame
    /// rate content, and zero when the container does not report one.
    pub frames_per_second: f64,
    /// Frame count from the container, or an estimate from duration and
    /// frame rate. Zero when neither is available.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Container duration, `Duration::ZERO` when unknown.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Frame count, or `None` when the source does not report one.
    pub fn known_frame_count(&self) -> Option<u64> {
        (self.frame_count > 0).then_some(self.frame_count)
    }
}
