//! # photo-revive
//!
//! Restore old photographs using generative image models.
//!
//! ## Why this crate?
//!
//! Classical restoration filters (median denoise, inpainting brushes,
//! unsharp masks) need per-photo hand-tuning and still cannot reconstruct a
//! torn corner or colourise a faded print convincingly. Instead this crate
//! uploads the photo to a generative image model with a restoration prompt
//! and lets the model repaint the damage, then stamps the result with a
//! watermark so AI-retouched copies stay distinguishable from originals.
//!
//! ## Pipeline Overview
//!
//! ```text
//! photo (path or URL)
//!  │
//!  ├─ 1. Input      read bytes, sniff JPEG/PNG/WebP/GIF magic
//!  ├─ 2. Encode     bytes → base64 inline payload
//!  ├─ 3. Model      one generateContent call (image + prompt → image)
//!  ├─ 4. Watermark  fixed overlay, font size scaled to image width
//!  └─ 5. Export     JPEG at the configured quality, or PNG
//! ```
//!
//! The stages run strictly in sequence; there is exactly one outstanding
//! network call per restoration and nothing is retried. See
//! [`error::RestoreError`] for the failure taxonomy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photo_revive::{restore, RestoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY from the environment
//!     let config = RestoreConfig::default();
//!     let output = restore("grandma-1954.jpg", &config).await?;
//!     std::fs::write("grandma-1954-restored.jpg", &output.image.bytes)?;
//!     eprintln!(
//!         "{}x{} in {}ms",
//!         output.stats.output_width,
//!         output.stats.output_height,
//!         output.stats.total_duration_ms
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `revive` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! photo-revive = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod restore;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OutputFormat, RestoreConfig, RestoreConfigBuilder};
pub use error::RestoreError;
pub use output::{MediaType, RestoreOutput, RestoreStats, RestoredImage, SourceImage};
pub use restore::{restore, restore_sync, restore_to_file};
