//! FFmpeg-backed source and end-to-end sampling tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and return early when they are absent.

use std::path::Path;

use frame_sampler::{FrameSampler, FrameSource, PixelFormat, SamplerConfig, Stride, VideoSource};

/// 50 frames at 25 fps.
const SAMPLE_VIDEO_FRAMES: u64 = 50;

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn empty_video_path() -> &'static str {
    "tests/fixtures/empty_video.mp4"
}

fn count_frames(path: &str) -> u64 {
    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    let mut count = 0;
    while let Ok(Some(_)) = source.read_frame() {
        count += 1;
    }
    count
}

#[test]
fn metadata_is_populated() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let source = VideoSource::open(path).expect("Failed to open fixture");
    let metadata = source.metadata();
    assert!(metadata.width > 0);
    assert!(metadata.height > 0);
    assert!(metadata.frames_per_second > 0.0);
    assert!(!metadata.codec.is_empty());
    assert_eq!(source.frame_rate(), metadata.frames_per_second);
}

#[test]
fn frames_match_source_dimensions() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source =
        VideoSource::open_with_pixel_format(path, PixelFormat::Gray8).expect("Failed to open");
    let (width, height) = (source.metadata().width, source.metadata().height);

    let image = source
        .read_frame()
        .expect("Decode error")
        .expect("Expected at least one frame");
    assert_eq!((image.width(), image.height()), (width, height));
    assert!(image.as_luma8().is_some());
}

#[test]
fn reading_past_the_end_stays_at_the_end() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    while let Ok(Some(_)) = source.read_frame() {}
    assert!(matches!(source.read_frame(), Ok(None)));
}

#[test]
fn run_saves_ceiling_of_decoded_frames() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let decoded = count_frames(path);
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let config =
        SamplerConfig::new(path, directory.path()).with_stride(Stride::fixed(10).unwrap());

    let summary = FrameSampler::new(config).run().expect("Sampling failed");

    assert_eq!(summary.observed, decoded);
    assert_eq!(summary.saved, decoded.div_ceil(10));
    assert!(directory.path().join("frame_000000.jpg").exists());
    if decoded > 10 {
        assert!(directory.path().join("frame_000010.jpg").exists());
    }
}

#[test]
fn run_per_second_uses_rounded_frame_rate() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let frames_per_second = VideoSource::open(path)
        .expect("Failed to open fixture")
        .metadata()
        .frames_per_second;
    let directory = tempfile::tempdir().expect("Failed to create temp dir");

    let summary = frame_sampler::sample(path, directory.path(), Stride::PerSecond)
        .expect("Sampling failed");

    assert_eq!(summary.stride, (frames_per_second.round() as u64).max(1));
}

#[test]
fn every_frame_is_decoded_including_the_decoder_tail() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    assert_eq!(count_frames(path), SAMPLE_VIDEO_FRAMES);

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let summary = frame_sampler::sample(path, directory.path(), Stride::PerSecond)
        .expect("Sampling failed");

    assert_eq!(summary.observed, SAMPLE_VIDEO_FRAMES);
    assert_eq!(summary.stride, 25);
    assert_eq!(summary.saved, 2);
    assert!(directory.path().join("frame_000025.jpg").exists());
}

#[test]
fn empty_video_opens_and_saves_nothing() {
    let path = empty_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let summary = frame_sampler::sample(path, directory.path(), Stride::fixed(1).unwrap())
        .expect("Sampling failed");

    assert_eq!(summary.observed, 0);
    assert_eq!(summary.saved, 0);
    assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
}
