//! Internal conversion helpers.
//!
//! Pixel-data copying from FFmpeg frames into [`image`] buffers and frame
//! rate arithmetic on FFmpeg rationals.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::{configuration::PixelFormat, error::SamplerError};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg pads rows so that `stride(0)` may exceed `width * bytes_per_pixel`;
/// the padding is dropped here.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Convert a scaled frame to a [`DynamicImage`] in the given pixel layout.
pub(crate) fn frame_to_image(
    scaled_frame: &VideoFrame,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
) -> Result<DynamicImage, SamplerError> {
    let buffer = frame_to_buffer(scaled_frame, width, height, pixel_format.bytes_per_pixel());

    match pixel_format {
        PixelFormat::Rgb8 => RgbImage::from_raw(width, height, buffer)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| {
                SamplerError::VideoDecodeError(
                    "Failed to construct RGB image from decoded frame data".to_string(),
                )
            }),
        PixelFormat::Gray8 => GrayImage::from_raw(width, height, buffer)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(|| {
                SamplerError::VideoDecodeError(
                    "Failed to construct grayscale image from decoded frame data".to_string(),
                )
            }),
    }
}

/// Frames per second from an FFmpeg rational, or `None` for a zero
/// denominator or a non-positive rate.
pub(crate) fn rational_to_frame_rate(rate: Rational) -> Option<f64> {
    if rate.denominator() == 0 {
        return None;
    }
    let value = rate.numerator() as f64 / rate.denominator() as f64;
    (value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::Rational;

    use super::rational_to_frame_rate;

    #[test]
    fn frame_rate_from_rational() {
        assert_eq!(rational_to_frame_rate(Rational::new(30, 1)), Some(30.0));
        let ntsc = rational_to_frame_rate(Rational::new(30000, 1001)).unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn degenerate_rationals_have_no_rate() {
        assert_eq!(rational_to_frame_rate(Rational::new(0, 0)), None);
        assert_eq!(rational_to_frame_rate(Rational::new(25, 0)), None);
        assert_eq!(rational_to_frame_rate(Rational::new(0, 1)), None);
    }
}
