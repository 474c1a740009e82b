//! Sampling loop integration tests.
//!
//! These run against an in-memory [`FrameSource`] so they need no media
//! fixtures.

use std::path::Path;

use frame_sampler::{
    FrameSampler, FrameSource, ImageFileWriter, OutputFormat, RunSummary, SamplerConfig,
    SamplerError, Stride,
};
use image::{DynamicImage, ImageFormat, RgbImage};

/// Yields `total` tiny frames, each filled with its own index.
struct SyntheticSource {
    total: u64,
    next: u64,
    frame_rate: f64,
    fail_at: Option<u64>,
}

impl SyntheticSource {
    fn new(total: u64, frame_rate: f64) -> Self {
        Self {
            total,
            next: 0,
            frame_rate,
            fail_at: None,
        }
    }

    fn failing_at(mut self, frame_number: u64) -> Self {
        self.fail_at = Some(frame_number);
        self
    }
}

impl FrameSource for SyntheticSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> Option<u64> {
        Some(self.total)
    }

    fn read_frame(&mut self) -> Result<Option<DynamicImage>, SamplerError> {
        if self.fail_at == Some(self.next) {
            return Err(SamplerError::VideoDecodeError("corrupt packet".to_string()));
        }
        if self.next >= self.total {
            return Ok(None);
        }
        let value = (self.next % 256) as u8;
        self.next += 1;
        Ok(Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            4,
            image::Rgb([value, value, value]),
        ))))
    }
}

fn saved_files(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(directory)
        .expect("Failed to list output directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn run(source: &mut SyntheticSource, output_dir: &Path, stride: Stride) -> RunSummary {
    let config = SamplerConfig::new("synthetic", output_dir)
        .with_stride(stride)
        .with_output_format(OutputFormat::Png);
    let writer = ImageFileWriter::new(OutputFormat::Png);
    FrameSampler::new(config)
        .sample_source(source, &writer)
        .expect("Sampling failed")
}

// ── stride semantics ───────────────────────────────────────────────

#[test]
fn ten_frames_stride_three() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut source = SyntheticSource::new(10, 25.0);

    let summary = run(&mut source, directory.path(), Stride::fixed(3).unwrap());

    assert_eq!(summary.observed, 10);
    assert_eq!(summary.saved, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.stride, 3);
    assert_eq!(
        saved_files(directory.path()),
        vec![
            "frame_000000.png",
            "frame_000003.png",
            "frame_000006.png",
            "frame_000009.png",
        ],
    );
}

#[test]
fn saved_count_is_ceiling_of_observed_over_stride() {
    for (total, k) in [(1, 1), (7, 7), (8, 7), (100, 30), (31, 1)] {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let mut source = SyntheticSource::new(total, 30.0);

        let summary = run(&mut source, directory.path(), Stride::fixed(k).unwrap());

        assert_eq!(summary.observed, total);
        assert_eq!(summary.saved, total.div_ceil(k), "total={total} k={k}");
        assert_eq!(saved_files(directory.path()).len() as u64, summary.saved);
    }
}

#[test]
fn saved_frames_hold_the_sampled_pixels() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut source = SyntheticSource::new(6, 30.0);

    run(&mut source, directory.path(), Stride::fixed(5).unwrap());

    let frame = image::open(directory.path().join("frame_000005.png"))
        .expect("Failed to open saved frame")
        .to_rgb8();
    assert_eq!(frame.get_pixel(0, 0).0, [5, 5, 5]);
}

#[test]
fn per_second_stride_rounds_frame_rate() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut source = SyntheticSource::new(10, 2.6);

    let summary = run(&mut source, directory.path(), Stride::PerSecond);

    assert_eq!(summary.stride, 3);
    assert_eq!(summary.saved, 4);
}

#[test]
fn per_second_stride_with_unknown_rate_saves_every_frame() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut source = SyntheticSource::new(5, 0.0);

    let summary = run(&mut source, directory.path(), Stride::PerSecond);

    assert_eq!(summary.stride, 1);
    assert_eq!(summary.saved, 5);
}

// ── edge cases ─────────────────────────────────────────────────────

#[test]
fn empty_source_writes_nothing() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut source = SyntheticSource::new(0, 30.0);

    let summary = run(&mut source, directory.path(), Stride::PerSecond);

    assert_eq!(summary.observed, 0);
    assert_eq!(summary.saved, 0);
    assert!(saved_files(directory.path()).is_empty());
}

#[test]
fn decode_error_ends_the_run() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut source = SyntheticSource::new(10, 30.0).failing_at(5);

    let summary = run(&mut source, directory.path(), Stride::fixed(2).unwrap());

    assert_eq!(summary.observed, 5);
    assert_eq!(summary.saved, 3);
}

#[test]
fn missing_output_directory_is_created() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = directory.path().join("nested").join("frames");
    let mut source = SyntheticSource::new(4, 30.0);

    let summary = run(&mut source, &output_dir, Stride::fixed(2).unwrap());

    assert!(output_dir.is_dir());
    assert_eq!(summary.output_dir, output_dir);
    assert_eq!(
        saved_files(&output_dir),
        vec!["frame_000000.png", "frame_000002.png"],
    );
}

#[test]
fn rerun_overwrites_identical_names() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");

    let first = run(
        &mut SyntheticSource::new(9, 30.0),
        directory.path(),
        Stride::fixed(4).unwrap(),
    );
    let before = saved_files(directory.path());

    let second = run(
        &mut SyntheticSource::new(9, 30.0),
        directory.path(),
        Stride::fixed(4).unwrap(),
    );

    assert_eq!(first.saved, second.saved);
    assert_eq!(before, saved_files(directory.path()));
}

#[test]
fn jpeg_is_the_default_output() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let config =
        SamplerConfig::new("synthetic", directory.path()).with_stride(Stride::fixed(1).unwrap());
    let writer = ImageFileWriter::new(config.output_format());

    FrameSampler::new(config)
        .sample_source(&mut SyntheticSource::new(2, 30.0), &writer)
        .expect("Sampling failed");

    assert_eq!(
        saved_files(directory.path()),
        vec!["frame_000000.jpg", "frame_000001.jpg"],
    );
}

#[test]
fn file_extension_follows_the_writer_encoding() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    // Default configuration asks for JPEG; the writer encodes PNG.
    let config =
        SamplerConfig::new("synthetic", directory.path()).with_stride(Stride::fixed(1).unwrap());
    let writer = ImageFileWriter::new(OutputFormat::Png);

    FrameSampler::new(config)
        .sample_source(&mut SyntheticSource::new(2, 30.0), &writer)
        .expect("Sampling failed");

    let names = saved_files(directory.path());
    assert_eq!(names, vec!["frame_000000.png", "frame_000001.png"]);
    for name in names {
        let path = directory.path().join(name);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            ImageFormat::from_path(&path).unwrap(),
        );
    }
}
