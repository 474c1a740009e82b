//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] receives [`ProgressInfo`] snapshots while a sampling
//! run is in flight, and [`CancellationToken`] lets another thread ask the
//! run to stop before the next frame is read.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frame_sampler::{
//!     FrameSampler, ProgressCallback, ProgressInfo, SamplerConfig, SamplerError,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("saved {} of {} observed", info.saved, info.observed);
//!     }
//! }
//!
//! let config = SamplerConfig::new("input.mp4", "frames")
//!     .with_progress(Arc::new(PrintProgress));
//! FrameSampler::new(config).run()?;
//! # Ok::<(), SamplerError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of sampling progress.
///
/// Delivered to [`ProgressCallback::on_progress`] every
/// [`batch_size`](crate::SamplerConfig::with_batch_size) saved frames and
/// once more when the run finishes.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Frames decoded so far, saved or not.
    pub observed: u64,
    /// Frames written to the output directory so far.
    pub saved: u64,
    /// Frame count reported by the source, if it reports one.
    pub total_frames: Option<u64>,
    /// Completion percentage (0.0 – 100.0) of `observed` against
    /// `total_frames`, if known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates during a sampling run.
///
/// Callbacks observe but cannot halt the run. Use [`CancellationToken`] for
/// that.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during a run.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state. The sampler checks the token before every frame read.
///
/// # Example
///
/// ```
/// use frame_sampler::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks run timing and fires the callback every `batch_size` saves.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total_frames: Option<u64>,
    batch_size: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        total_frames: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total_frames: total_frames.filter(|&total| total > 0),
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
        }
    }

    /// Record a save, reporting when `saved` lands on a batch boundary.
    pub(crate) fn frame_saved(&self, observed: u64, saved: u64) {
        if saved % self.batch_size == 0 {
            self.report(observed, saved);
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&self, observed: u64, saved: u64) {
        self.report(observed, saved);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn report(&self, observed: u64, saved: u64) {
        let percentage = self
            .total_frames
            .map(|total| (observed as f32 / total as f32 * 100.0).min(100.0));

        let info = ProgressInfo {
            observed,
            saved,
            total_frames: self.total_frames,
            percentage,
            elapsed: self.elapsed(),
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{ProgressCallback, ProgressInfo, ProgressTracker};

    #[derive(Default)]
    struct Recording(Mutex<Vec<ProgressInfo>>);

    impl ProgressCallback for Recording {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn reports_on_batch_boundaries_only() {
        let recording = Arc::new(Recording::default());
        let tracker = ProgressTracker::new(recording.clone(), Some(40), 2);

        tracker.frame_saved(1, 1);
        tracker.frame_saved(11, 2);
        tracker.frame_saved(21, 3);
        tracker.finish(40, 4);

        let infos = recording.0.lock().unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].saved, 2);
        assert_eq!(infos[1].percentage, Some(100.0));
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recording = Arc::new(Recording::default());
        let tracker = ProgressTracker::new(recording.clone(), Some(0), 0);
        tracker.frame_saved(0, 1);

        let infos = recording.0.lock().unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].total_frames, None);
        assert_eq!(infos[0].percentage, None);
    }
}
