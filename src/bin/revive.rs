//! CLI binary for photo-revive.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `RestoreConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photo_revive::{restore, OutputFormat, RestoreConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Restore a scanned photo (writes photo-restored.jpg next to it)
  revive photo.jpg

  # Choose the output file and JPEG quality
  revive photo.jpg -o restored.jpg --quality 85

  # Restore straight from a URL, keep the result as PNG
  revive https://example.com/archive/family-1932.png --format png

  # Custom instructions and watermark text
  revive photo.jpg --prompt "Remove the coffee stain, keep the sepia tone" \
                   --watermark-text "Family archive"

  # No watermark, machine-readable stats
  revive photo.jpg --no-watermark --json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        API key for the generative endpoint (required)
  REVIVE_MODEL          Override the model id
  REVIVE_QUALITY        Default JPEG quality
  REVIVE_FONT           Watermark font file (TTF/OTF)

SETUP:
  1. Set API key:     export GEMINI_API_KEY=...
  2. Restore:         revive photo.jpg -o restored.jpg

The watermark needs a TTF/OTF font. Common system locations are probed
automatically; pass --font to use a specific file. Without any font the
image is produced unmarked (a note is logged)."#;

/// Restore old photographs using generative image models.
#[derive(Parser, Debug)]
#[command(
    name = "revive",
    version,
    about = "Restore old photographs using generative image models",
    long_about = "Upload a damaged or faded photograph (local file or URL) to a generative \
image model, receive a restored version, stamp it with a watermark, and save it as a \
quality-adjustable JPEG or a lossless PNG.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local image file path or HTTP/HTTPS URL (JPEG, PNG, WebP, GIF).
    input: String,

    /// Write the restored image to this file. Default: '<input>-restored.<ext>'.
    #[arg(short, long, env = "REVIVE_OUTPUT")]
    output: Option<PathBuf>,

    /// Generative image model id.
    #[arg(long, env = "REVIVE_MODEL")]
    model: Option<String>,

    /// Custom restoration instructions (replaces the built-in prompt).
    #[arg(long, env = "REVIVE_PROMPT")]
    prompt: Option<String>,

    /// JPEG quality, 1–100.
    #[arg(long, env = "REVIVE_QUALITY", default_value_t = 92,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Output format: auto (match the input), jpeg, png.
    #[arg(long, env = "REVIVE_FORMAT", value_enum, default_value = "auto")]
    format: FormatArg,

    /// Skip the watermark entirely.
    #[arg(long, env = "REVIVE_NO_WATERMARK")]
    no_watermark: bool,

    /// Watermark text drawn on the restored image.
    #[arg(long, env = "REVIVE_WATERMARK_TEXT")]
    watermark_text: Option<String>,

    /// TTF/OTF font file for the watermark.
    #[arg(long, env = "REVIVE_FONT")]
    font: Option<PathBuf>,

    /// Output stats as JSON instead of the human summary.
    #[arg(long, env = "REVIVE_JSON")]
    json: bool,

    /// HTTP download timeout in seconds (URL inputs).
    #[arg(long, env = "REVIVE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Model call timeout in seconds.
    #[arg(long, env = "REVIVE_API_TIMEOUT", default_value_t = 180)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REVIVE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "REVIVE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Auto,
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Auto => OutputFormat::Auto,
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the user-facing feedback; keep library logs at error
    // level unless the user asked for more.
    let show_spinner = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = RestoreConfig::builder()
        .jpeg_quality(cli.quality)
        .output_format(cli.format.clone().into())
        .watermark(!cli.no_watermark)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref prompt) = cli.prompt {
        builder = builder.prompt(prompt);
    }
    if let Some(ref text) = cli.watermark_text {
        builder = builder.watermark_text(text);
    }
    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run the restoration ──────────────────────────────────────────────
    // One operation at a time: the spinner runs for exactly as long as the
    // single in-flight request (the CLI equivalent of the disabled button).
    let spinner = if show_spinner {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Restoring");
        bar.set_message(cli.input.clone());
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let result = restore(&cli.input, &config).await;

    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }

    let output = result.context("Restoration failed")?;

    // ── Write the image ──────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, output.image.media_type.extension()));

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    tokio::fs::write(&output_path, &output.image.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        #[derive(serde::Serialize)]
        struct JsonReport<'a> {
            output: &'a Path,
            media_type: &'a str,
            model_text: Option<&'a str>,
            stats: &'a photo_revive::RestoreStats,
        }
        let report = JsonReport {
            output: &output_path,
            media_type: output.image.media_type.mime(),
            model_text: output.model_text.as_deref(),
            stats: &output.stats,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {}x{} {}  {}ms  →  {}",
            green("✔"),
            stats.output_width,
            stats.output_height,
            output.image.media_type.mime(),
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} in  /  {} out{}",
            dim(&format!("{} bytes", stats.input_bytes)),
            dim(&format!("{} bytes", stats.output_bytes)),
            if stats.watermarked {
                String::new()
            } else {
                format!("  {}", dim("(no watermark)"))
            },
        );
        if let Some(ref text) = output.model_text {
            eprintln!("   {}", dim(text));
        }
    }

    Ok(())
}

/// Derive '<stem>-restored.<ext>' next to the input, or in the current
/// directory for URL inputs.
fn default_output_path(input: &str, extension: &str) -> PathBuf {
    let source = Path::new(input);
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("photo");

    let file_name = format!("{stem}-restored.{extension}");
    if photo_revive::pipeline::input::is_url(input) {
        PathBuf::from(file_name)
    } else {
        source.with_file_name(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_sits_next_to_the_input() {
        let p = default_output_path("/scans/grandma.png", "png");
        assert_eq!(p, PathBuf::from("/scans/grandma-restored.png"));
    }

    #[test]
    fn default_path_for_urls_lands_in_cwd() {
        let p = default_output_path("https://example.com/a/family.jpg", "jpg");
        assert_eq!(p, PathBuf::from("family-restored.jpg"));
    }

    #[test]
    fn extension_follows_the_output_format() {
        let p = default_output_path("/scans/grandma.png", "jpg");
        assert_eq!(p, PathBuf::from("/scans/grandma-restored.jpg"));
    }
}
