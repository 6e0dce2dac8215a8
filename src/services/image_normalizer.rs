//! src/services/image_normalizer.rs
//!
//! Bounds oversized camera exports to the remote host's size envelope.
//! Images whose larger dimension exceeds [`MAX_DIMENSION`] are resized
//! (aspect preserved, never upscaled) and re-encoded in their detected
//! format; everything else passes through byte-identical so fingerprints
//! stay stable for already-small files.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, GenericImageView, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Larger-dimension cap applied before upload.
pub const MAX_DIMENSION: u32 = 3000;

/// Quality factor used when re-encoding JPEG output.
pub const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not re-encode image as {format:?}: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },
}

/// Scale `(width, height)` down so the larger side equals `cap`.
///
/// Aspect ratio is preserved to within rounding and neither side collapses
/// to zero. Callers must only invoke this for images that exceed the cap.
fn fit_within(width: u32, height: u32, cap: u32) -> (u32, u32) {
    let ratio = cap as f32 / width.max(height) as f32;
    let w = ((width as f32 * ratio).round() as u32).clamp(1, cap);
    let h = ((height as f32 * ratio).round() as u32).clamp(1, cap);
    (w, h)
}

/// Pick a resize filter by downscale ratio: cheap filters for aggressive
/// reductions, Lanczos for near-1:1 work.
fn select_filter(orig: u32, target: u32) -> FilterType {
    let ratio = orig as f32 / target.max(1) as f32;
    if ratio > 2.0 {
        FilterType::Triangle
    } else if ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Normalize a raw upload buffer for the remote media host.
///
/// Returns `Ok(Some(bytes))` with the resized, re-encoded image when either
/// dimension exceeded [`MAX_DIMENSION`], and `Ok(None)` when the original
/// buffer already fits the envelope and should be uploaded as-is.
///
/// Errors are returned for corrupt data and codecs the `image` crate cannot
/// handle (e.g. HEIC); the caller decides the fallback policy.
pub fn normalize(data: &[u8]) -> Result<Option<Vec<u8>>, NormalizeError> {
    let format = image::guess_format(data).map_err(NormalizeError::Decode)?;
    let img = image::load_from_memory_with_format(data, format).map_err(NormalizeError::Decode)?;

    let (width, height) = img.dimensions();
    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return Ok(None);
    }

    let (target_w, target_h) = fit_within(width, height, MAX_DIMENSION);
    let filter = select_filter(width.max(height), MAX_DIMENSION);
    let resized = img.resize_exact(target_w, target_h, filter);

    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel; flatten before encoding.
            let rgb = resized.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            encoder
                .encode(
                    &rgb,
                    rgb.width(),
                    rgb.height(),
                    image::ColorType::Rgb8.into(),
                )
                .map_err(|source| NormalizeError::Encode { format, source })?;
        }
        other => {
            resized
                .write_to(&mut Cursor::new(&mut buf), other)
                .map_err(|source| NormalizeError::Encode {
                    format: other,
                    source,
                })?;
        }
    }

    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([120, 84, 40]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), format)
            .expect("encode fixture");
        buf
    }

    #[test]
    fn fit_within_caps_larger_side() {
        assert_eq!(fit_within(4000, 2000, 3000), (3000, 1500));
        assert_eq!(fit_within(1000, 4000, 3000), (750, 3000));
        assert_eq!(fit_within(3001, 3001, 3000), (3000, 3000));
    }

    #[test]
    fn fit_within_never_collapses_to_zero() {
        let (w, h) = fit_within(100_000, 1, 3000);
        assert_eq!(w, 3000);
        assert_eq!(h, 1);
    }

    #[test]
    fn small_image_passes_through() {
        let data = encode(800, 600, ImageFormat::Jpeg);
        assert!(normalize(&data).unwrap().is_none());
    }

    #[test]
    fn image_at_cap_passes_through() {
        let data = encode(3000, 2000, ImageFormat::Jpeg);
        assert!(normalize(&data).unwrap().is_none());
    }

    #[test]
    fn oversized_landscape_resized_to_cap() {
        let data = encode(4000, 2000, ImageFormat::Jpeg);
        let out = normalize(&data).unwrap().expect("resized");
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.dimensions(), (3000, 1500));
    }

    #[test]
    fn oversized_portrait_preserves_aspect() {
        let data = encode(2000, 4000, ImageFormat::Jpeg);
        let out = normalize(&data).unwrap().expect("resized");
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.dimensions(), (1500, 3000));
    }

    #[test]
    fn output_keeps_detected_format() {
        let data = encode(3500, 1000, ImageFormat::Png);
        let out = normalize(&data).unwrap().expect("resized");
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = normalize(b"definitely not an image").unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }
}
