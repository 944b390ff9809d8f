//! Restoration entry points.
//!
//! One attempt is four strictly sequential stages: resolve the input photo,
//! make the single model call, composite the watermark, re-encode for
//! download. There is no pipeline concurrency and at most one network
//! operation in flight; each stage either succeeds or returns the typed
//! error from its call site. A new call replaces the previous attempt's
//! records wholesale — nothing is kept between attempts.

use crate::config::RestoreConfig;
use crate::error::RestoreError;
use crate::output::{MediaType, RestoreOutput, RestoreStats, RestoredImage};
use crate::pipeline::{encode, export, input, model, watermark};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Restore a photo from a local path or HTTP/HTTPS URL.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(RestoreError)` on the first stage that fails: unreadable or
/// unsupported input, a failed or image-less model response, or an encoding
/// failure. Nothing is retried.
pub async fn restore(
    input_str: impl AsRef<str>,
    config: &RestoreConfig,
) -> Result<RestoreOutput, RestoreError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting restoration: {}", input_str);

    // ── Step 1: Read the photo ───────────────────────────────────────────
    let source = input::resolve_input(input_str, config).await?;
    let input_bytes = source.len() as u64;

    // Fail on a missing key before any bytes go out.
    let api_key = resolve_api_key(config)?;

    // ── Step 2: One model call ───────────────────────────────────────────
    let payload = encode::to_payload(&source);
    let reply = model::generate(&payload, &api_key, config).await?;
    let model_duration_ms = reply.duration_ms;
    info!(
        "Model returned {} bytes {} in {}ms",
        reply.image_bytes.len(),
        reply.media_type.mime(),
        model_duration_ms
    );

    // ── Steps 3–4: Watermark and re-encode ───────────────────────────────
    // CPU-bound pixel work; keep it off the async worker threads.
    let compose_start = Instant::now();
    let source_type = source.media_type;
    let model_text = reply.text;
    let image_bytes = reply.image_bytes;
    let cfg = config.clone();
    type Composed = (Vec<u8>, MediaType, u32, u32, bool);
    let (bytes, media_type, width, height, watermarked) =
        tokio::task::spawn_blocking(move || -> Result<Composed, RestoreError> {
            let img = encode::decode_pixels(&image_bytes)?;
            let (img, watermarked) = if cfg.watermark {
                watermark::apply(img, &cfg.watermark_text, cfg.font_path.as_deref())
            } else {
                (img, false)
            };
            let target = export::resolve_format(cfg.output_format, source_type);
            let (width, height) = (img.width(), img.height());
            let bytes = export::encode_image(&img, target, cfg.jpeg_quality)?;
            Ok((bytes, target, width, height, watermarked))
        })
        .await
        .map_err(|e| RestoreError::Internal(format!("Compose task panicked: {e}")))??;
    let compose_duration_ms = compose_start.elapsed().as_millis() as u64;
    debug!("Composed output in {}ms", compose_duration_ms);

    let stats = RestoreStats {
        input_bytes,
        output_bytes: bytes.len() as u64,
        output_width: width,
        output_height: height,
        watermarked,
        model_duration_ms,
        compose_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Restoration complete: {}x{} {} in {}ms",
        width,
        height,
        media_type.mime(),
        stats.total_duration_ms
    );

    Ok(RestoreOutput {
        image: RestoredImage { bytes, media_type },
        model_text,
        stats,
    })
}

/// Restore a photo and write the result directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn restore_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &RestoreConfig,
) -> Result<RestoreStats, RestoreError> {
    let output = restore(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RestoreError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, &output.image.bytes)
        .await
        .map_err(|e| RestoreError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| RestoreError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`restore`].
///
/// Creates a temporary tokio runtime internally.
pub fn restore_sync(
    input_str: impl AsRef<str>,
    config: &RestoreConfig,
) -> Result<RestoreOutput, RestoreError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RestoreError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(restore(input_str, config))
}

/// Resolve the API key: config first, then the environment.
fn resolve_api_key(config: &RestoreConfig) -> Result<String, RestoreError> {
    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(RestoreError::ApiKeyMissing),
    }
}
