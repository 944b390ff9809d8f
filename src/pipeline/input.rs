//! Input acquisition: read a user-supplied path or URL into a [`SourceImage`].
//!
//! The whole payload is held in memory — it is about to be base64-encoded
//! into a request body anyway, and the size cap in [`crate::config`] bounds
//! it well below anything worth streaming. Format detection is done on the
//! bytes themselves (not the extension or Content-Type header) so renamed
//! files and sloppy servers still resolve correctly.

use crate::config::RestoreConfig;
use crate::error::RestoreError;
use crate::output::{MediaType, SourceImage};
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a [`SourceImage`].
///
/// If the input is a URL, download it. If it is a local file, read and
/// validate it. Either way the magic bytes must match a supported image
/// format and the payload must fit under the configured upload cap.
pub async fn resolve_input(
    input: &str,
    config: &RestoreConfig,
) -> Result<SourceImage, RestoreError> {
    let (bytes, origin) = if is_url(input) {
        (download_url(input, config.download_timeout_secs).await?, PathBuf::from(input))
    } else {
        (read_local(input).await?, PathBuf::from(input))
    };

    if bytes.is_empty() {
        return Err(RestoreError::EmptyInput { path: origin });
    }

    let media_type = MediaType::from_magic(&bytes).ok_or_else(|| {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        RestoreError::UnsupportedFormat { path: origin, magic }
    })?;

    if bytes.len() as u64 > config.max_input_bytes {
        return Err(RestoreError::InputTooLarge {
            bytes: bytes.len() as u64,
            limit: config.max_input_bytes,
        });
    }

    debug!(
        "Resolved input: {} bytes, {}",
        bytes.len(),
        media_type.mime()
    );

    Ok(SourceImage { bytes, media_type })
}

/// Read a local file, mapping io errors to the typed variants.
async fn read_local(path_str: &str) -> Result<Vec<u8>, RestoreError> {
    let path = PathBuf::from(path_str);

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RestoreError::FileNotFound { path })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(RestoreError::PermissionDenied { path })
        }
        Err(_) => Err(RestoreError::InvalidInput {
            input: path_str.to_string(),
        }),
    }
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, RestoreError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RestoreError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            RestoreError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            RestoreError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(RestoreError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RestoreError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tiny_png() -> Vec<u8> {
        // Magic header padded out; enough for sniffing, not a decodable image.
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(64, 0);
        bytes
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/photo.jpg"));
        assert!(is_url("http://example.com/photo.jpg"));
        assert!(!is_url("/tmp/photo.jpg"));
        assert!(!is_url("photo.jpg"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn resolves_local_png() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&tiny_png()).unwrap();

        let config = RestoreConfig::default();
        let source = resolve_input(f.path().to_str().unwrap(), &config)
            .await
            .unwrap();
        assert_eq!(source.media_type, MediaType::Png);
        assert_eq!(source.len(), 64);
    }

    #[tokio::test]
    async fn missing_file_is_typed() {
        let config = RestoreConfig::default();
        let err = resolve_input("/no/such/photo.jpg", &config).await.unwrap_err();
        assert!(matches!(err, RestoreError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_file_is_typed() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let config = RestoreConfig::default();
        let err = resolve_input(f.path().to_str().unwrap(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, RestoreError::EmptyInput { .. }));
    }

    #[tokio::test]
    async fn text_file_is_rejected_with_magic() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello, world — definitely not an image").unwrap();

        let config = RestoreConfig::default();
        let err = resolve_input(f.path().to_str().unwrap(), &config)
            .await
            .unwrap_err();
        match err {
            RestoreError::UnsupportedFormat { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_upload() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&tiny_png()).unwrap();

        let config = RestoreConfig::builder().max_input_bytes(16).build().unwrap();
        let err = resolve_input(f.path().to_str().unwrap(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, RestoreError::InputTooLarge { bytes: 64, limit: 16 }));
    }
}
