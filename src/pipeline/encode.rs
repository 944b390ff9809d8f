//! Base64 bookkeeping: image bytes ⇄ the inline-data wire form.
//!
//! Generative APIs accept and return images as base64 strings paired with a
//! media type inside the JSON body. Both directions live here so the model
//! stage deals only in structs, never in encoding details.

use crate::error::RestoreError;
use crate::output::{MediaType, SourceImage};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use tracing::debug;

/// An image ready for the request body: base64 data plus media type.
#[derive(Debug, Clone)]
pub struct InlinePayload {
    pub data: String,
    pub mime_type: &'static str,
}

/// Encode the uploaded photo for the inline-data request field.
pub fn to_payload(source: &SourceImage) -> InlinePayload {
    let data = STANDARD.encode(&source.bytes);
    debug!("Encoded upload → {} bytes base64", data.len());
    InlinePayload {
        data,
        mime_type: source.media_type.mime(),
    }
}

/// Decode a returned inline-data part into raw bytes and a media type.
///
/// The declared mime type is trusted only as a fallback: the bytes are
/// sniffed first, since models have been observed labelling PNG output
/// `image/jpeg` and vice versa.
pub fn from_inline(data: &str, declared_mime: &str) -> Result<(Vec<u8>, MediaType), RestoreError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| RestoreError::ResponseDecodeFailed {
            detail: format!("invalid base64: {e}"),
        })?;

    let media_type = MediaType::from_magic(&bytes)
        .or_else(|| MediaType::from_mime(declared_mime))
        .ok_or_else(|| RestoreError::ResponseDecodeFailed {
            detail: format!("unrecognised image data (declared {declared_mime})"),
        })?;

    Ok((bytes, media_type))
}

/// Decode returned image bytes into pixels for the watermark stage.
pub fn decode_pixels(bytes: &[u8]) -> Result<DynamicImage, RestoreError> {
    image::load_from_memory(bytes).map_err(|e| RestoreError::ResponseDecodeFailed {
        detail: e.to_string(),
    })
}
