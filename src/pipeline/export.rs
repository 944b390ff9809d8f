//! Export encoding: the restored image → downloadable bytes.
//!
//! The model almost always answers with PNG, so this stage is where the
//! user's quality slider actually takes effect: JPEG output is re-encoded
//! at the configured quality, PNG output passes through losslessly. `Auto`
//! hands back the kind of file the user put in.

use crate::config::OutputFormat;
use crate::error::RestoreError;
use crate::output::MediaType;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decide the concrete output media type from the policy and the source.
pub fn resolve_format(policy: OutputFormat, source_type: MediaType) -> MediaType {
    match policy {
        OutputFormat::Jpeg => MediaType::Jpeg,
        OutputFormat::Png => MediaType::Png,
        OutputFormat::Auto => match source_type {
            MediaType::Jpeg => MediaType::Jpeg,
            // Lossless or already-lossy-once inputs come back as PNG rather
            // than taking a second lossy generation.
            MediaType::Png | MediaType::WebP | MediaType::Gif => MediaType::Png,
        },
    }
}

/// Encode the image as the resolved media type.
///
/// `quality` applies to JPEG only (1–100); PNG ignores it. JPEG carries no
/// alpha channel, so RGBA pixels are flattened to RGB first.
pub fn encode_image(
    img: &DynamicImage,
    target: MediaType,
    quality: u8,
) -> Result<Vec<u8>, RestoreError> {
    let mut buf = Vec::new();
    match target {
        MediaType::Jpeg => {
            let rgb = img.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut Cursor::new(&mut buf), quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| RestoreError::EncodeFailed {
                    detail: e.to_string(),
                })?;
        }
        MediaType::Png => {
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| RestoreError::EncodeFailed {
                    detail: e.to_string(),
                })?;
        }
        other => {
            // Never produced by resolve_format; kept as a typed error rather
            // than a panic in case a caller bypasses it.
            return Err(RestoreError::EncodeFailed {
                detail: format!("unsupported output format {other}"),
            });
        }
    }

    debug!(
        "Encoded {}x{} → {} bytes {}",
        img.width(),
        img.height(),
        buf.len(),
        target.mime()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    #[test]
    fn auto_preserves_jpeg_and_maps_the_rest_to_png() {
        assert_eq!(
            resolve_format(OutputFormat::Auto, MediaType::Jpeg),
            MediaType::Jpeg
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, MediaType::Png),
            MediaType::Png
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, MediaType::WebP),
            MediaType::Png
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, MediaType::Gif),
            MediaType::Png
        );
    }

    #[test]
    fn explicit_policies_override_the_source() {
        assert_eq!(
            resolve_format(OutputFormat::Jpeg, MediaType::Png),
            MediaType::Jpeg
        );
        assert_eq!(
            resolve_format(OutputFormat::Png, MediaType::Jpeg),
            MediaType::Png
        );
    }

    #[test]
    fn jpeg_bytes_carry_jpeg_magic() {
        let bytes = encode_image(&gradient(64, 64), MediaType::Jpeg, 80).unwrap();
        assert_eq!(MediaType::from_magic(&bytes), Some(MediaType::Jpeg));
    }

    #[test]
    fn png_bytes_carry_png_magic() {
        let bytes = encode_image(&gradient(64, 64), MediaType::Png, 80).unwrap();
        assert_eq!(MediaType::from_magic(&bytes), Some(MediaType::Png));
    }

    #[test]
    fn lower_quality_means_smaller_jpeg() {
        let img = gradient(256, 256);
        let high = encode_image(&img, MediaType::Jpeg, 95).unwrap();
        let low = encode_image(&img, MediaType::Jpeg, 10).unwrap();
        assert!(
            low.len() < high.len(),
            "q10 {} bytes !< q95 {} bytes",
            low.len(),
            high.len()
        );
    }

    #[test]
    fn png_ignores_quality() {
        let img = gradient(64, 64);
        let a = encode_image(&img, MediaType::Png, 10).unwrap();
        let b = encode_image(&img, MediaType::Png, 95).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_encodable_target_is_typed() {
        let err = encode_image(&gradient(8, 8), MediaType::WebP, 80).unwrap_err();
        assert!(matches!(err, RestoreError::EncodeFailed { .. }));
    }
}
