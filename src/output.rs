//! Data records that flow through a restoration.
//!
//! Two transient records exist for the lifetime of one attempt: the
//! [`SourceImage`] read from the user's file (consumed once when the model
//! call fires) and the [`RestoredImage`] produced after the model call and
//! watermark succeed (replaced wholesale on every new attempt). Neither is
//! ever persisted; both live exactly as long as the [`crate::restore`] call
//! that created them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media type of an image payload, detected from magic bytes.
///
/// Only formats the generative API accepts as inline data are listed.
/// Detection is byte-based rather than extension-based: files arrive from
/// downloads and user home directories where extensions routinely lie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl MediaType {
    /// Sniff the media type from the first bytes of a payload.
    ///
    /// Returns `None` when the bytes match no supported format.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 12 {
            return None;
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(MediaType::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(MediaType::Png)
        } else if bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(MediaType::WebP)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(MediaType::Gif)
        } else {
            None
        }
    }

    /// Parse an IANA media type string, as returned by the generative API.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            "image/webp" => Some(MediaType::WebP),
            "image/gif" => Some(MediaType::Gif),
            _ => None,
        }
    }

    /// The IANA media type string sent in the API request body.
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::WebP => "image/webp",
            MediaType::Gif => "image/gif",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "jpg",
            MediaType::Png => "png",
            MediaType::WebP => "webp",
            MediaType::Gif => "gif",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// The photo as uploaded: raw bytes plus detected media type.
///
/// Produced by the input stage, consumed once when the restore fires.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
}

impl SourceImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The final restored image: encoded bytes plus media type.
///
/// Produced after the model call, watermark, and re-encode succeed.
#[derive(Debug, Clone)]
pub struct RestoredImage {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
}

impl RestoredImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Everything a completed restoration produced.
#[derive(Debug)]
pub struct RestoreOutput {
    /// The encoded, watermarked image, ready to write to disk.
    pub image: RestoredImage,
    /// Any text the model returned alongside the image (usually a short
    /// description of what it changed; often empty).
    pub model_text: Option<String>,
    /// Timing and size statistics for the attempt.
    pub stats: RestoreStats,
}

/// Statistics for a single restoration attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreStats {
    /// Size of the uploaded image in bytes.
    pub input_bytes: u64,
    /// Size of the encoded output image in bytes.
    pub output_bytes: u64,
    /// Pixel dimensions of the restored image.
    pub output_width: u32,
    pub output_height: u32,
    /// Whether the watermark was actually drawn (false when disabled or no
    /// usable font was found).
    pub watermarked: bool,
    /// Wall-clock time spent in the generative API call.
    pub model_duration_ms: u64,
    /// Wall-clock time spent decoding, watermarking, and re-encoding.
    pub compose_duration_ms: u64,
    /// Total wall-clock time for the whole attempt.
    pub total_duration_ms: u64,
}
