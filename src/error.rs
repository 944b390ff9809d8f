//! Error types for the photo-revive library.
//!
//! A restoration is a short, strictly sequential flow — read the photo, make
//! one model call, composite the watermark, re-encode — so a single fatal
//! [`RestoreError`] enum covers every failure site. There is no partial
//! success to report: each attempt either produces a restored image or it
//! does not, and nothing is retried. The variants exist so each call site can
//! say precisely *what* failed and what the user should do about it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the photo-revive library.
#[derive(Debug, Error)]
pub enum RestoreError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// The file exists but contains zero bytes.
    #[error("Image file is empty: '{path}'")]
    EmptyInput { path: PathBuf },

    /// The file was read, but its magic bytes match no supported image format.
    #[error("Unsupported image format: '{path}'\nFirst bytes: {magic:02x?}\nSupported: JPEG, PNG, WebP, GIF.")]
    UnsupportedFormat { path: PathBuf, magic: [u8; 4] },

    /// The image exceeds the configured upload cap.
    ///
    /// Generative APIs reject oversized payloads with an opaque 4xx; failing
    /// before any network traffic gives the user a message they can act on.
    #[error("Image is {bytes} bytes, above the {limit}-byte upload limit.\nResize or re-compress it, or raise max_input_bytes.")]
    InputTooLarge { bytes: u64, limit: u64 },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No API key was configured or found in the environment.
    #[error("No API key configured.\nSet GEMINI_API_KEY in the environment, or pass one via RestoreConfig::builder().api_key(...).")]
    ApiKeyMissing,

    /// The generative API returned a non-success HTTP status.
    #[error("Generative API returned HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The model call exceeded the configured timeout.
    #[error("Generative API call timed out after {secs}s\nImage generation is slow; increase --api-timeout.")]
    ApiTimeout { secs: u64 },

    /// The request succeeded but no image part came back.
    ///
    /// Happens when the model responds with text only (a refusal or a
    /// clarifying question) or when safety filtering strips the image. Any
    /// text the model produced is quoted so the user sees why.
    #[error("The model returned no image.{}", .model_text.as_deref().map(|t| format!("\nModel said: {t}")).unwrap_or_default())]
    NoImageInResponse { model_text: Option<String> },

    /// The returned image part could not be decoded.
    #[error("Could not decode the model's image output: {detail}")]
    ResponseDecodeFailed { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Re-encoding the restored image failed.
    #[error("Failed to encode output image: {detail}")]
    EncodeFailed { detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_display() {
        let e = RestoreError::InputTooLarge {
            bytes: 30_000_000,
            limit: 20_971_520,
        };
        let msg = e.to_string();
        assert!(msg.contains("30000000"), "got: {msg}");
        assert!(msg.contains("max_input_bytes"));
    }

    #[test]
    fn api_error_display() {
        let e = RestoreError::ApiError {
            status: 429,
            message: "quota exceeded".into(),
        };
        assert!(e.to_string().contains("429"));
        assert!(e.to_string().contains("quota exceeded"));
    }

    #[test]
    fn no_image_display_with_text() {
        let e = RestoreError::NoImageInResponse {
            model_text: Some("I can't edit this photo.".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("no image"));
        assert!(msg.contains("can't edit"));
    }

    #[test]
    fn no_image_display_without_text() {
        let e = RestoreError::NoImageInResponse { model_text: None };
        assert!(!e.to_string().contains("Model said"));
    }

    #[test]
    fn unsupported_format_display() {
        let e = RestoreError::UnsupportedFormat {
            path: PathBuf::from("notes.txt"),
            magic: *b"hell",
        };
        assert!(e.to_string().contains("notes.txt"));
        assert!(e.to_string().contains("JPEG"));
    }
}
