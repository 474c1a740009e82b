//! Sample one frame per second with progress reporting, cancelling the run
//! once a budget of saved frames is reached.
//!
//! Usage:
//!   cargo run --example sample_frames -- <input_file> [output_dir] [max_saved]

use std::error::Error;
use std::sync::Arc;

use frame_sampler::{
    CancellationToken, FrameSampler, ProgressCallback, ProgressInfo, SamplerConfig,
    SamplerError, Stride,
};

/// Prints each report and cancels the run once `max_saved` frames are on disk.
struct PrintProgress {
    token: CancellationToken,
    max_saved: u64,
}

impl ProgressCallback for PrintProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let pct = info
            .percentage
            .map_or("??".to_string(), |p| format!("{p:.1}"));
        println!(
            "{} frames read, {} saved ({pct}%) elapsed={:.1}s",
            info.observed,
            info.saved,
            info.elapsed.as_secs_f64(),
        );
        if info.saved >= self.max_saved {
            self.token.cancel();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let output_dir = args.next().unwrap_or_else(|| "frames".to_string());
    let max_saved: u64 = match args.next() {
        Some(value) => value.parse()?,
        None => u64::MAX,
    };

    let token = CancellationToken::new();
    let config = SamplerConfig::new(&input_path, &output_dir)
        .with_stride(Stride::PerSecond)
        .with_progress(Arc::new(PrintProgress {
            token: token.clone(),
            max_saved,
        }))
        .with_cancellation(token)
        .with_batch_size(10);

    match FrameSampler::new(config).run() {
        Ok(summary) => println!(
            "Saved {} of {} frames (every {}) to {}",
            summary.saved,
            summary.observed,
            summary.stride,
            summary.output_dir.display(),
        ),
        Err(SamplerError::Cancelled) => println!("Stopped after {max_saved} saved frames"),
        Err(error) => return Err(error.into()),
    }

    Ok(())
}
