//! CLI binary for filemorph.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use filemorph::{
    convert, convert_many, formats, BatchOutcome, ConversionConfig, ConversionOutput, Target,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Text file to PDF
  filemorph notes.txt --to pdf

  # Word document to paginated PNG pages
  filemorph report.docx --to png -o ./pages

  # Re-encode an image
  filemorph photo.jpg --to webp

  # Transcode video, bounded to two minutes
  filemorph clip.mp4 --to webm --timeout 120

  # Convert from URL
  filemorph https://example.com/paper.pdf --to txt

  # Batch with JSON report
  filemorph a.txt b.txt c.docx --to pdf --json > report.json

  # Show the full conversion table
  filemorph --list-formats

CONVERSION TABLE:
  Category   Inputs               Targets
  ─────────  ───────────────────  ───────────────
  image      png jpg jpeg webp    pdf png webp
  document   pdf docx txt         pdf txt png
  audio      mp3 wav ogg          mp3 wav ogg
  video      mp4 avi webm         mp4 avi webm

ENVIRONMENT VARIABLES:
  FILEMORPH_OUTPUT_DIR   Output directory (default ./converted)
  FILEMORPH_FONT         TrueType font for PNG rendering
  FILEMORPH_FFMPEG       ffmpeg binary (default: ffmpeg on PATH)

SETUP:
  Audio/video conversions shell out to ffmpeg; install it from your package
  manager. PNG rendering of documents needs a TrueType font — DejaVu and
  Liberation system locations are probed automatically."#;

/// Convert files between formats within their category.
#[derive(Parser, Debug)]
#[command(
    name = "filemorph",
    version,
    about = "Convert images, documents, audio and video between formats",
    long_about = "Convert files (local paths or URLs) between formats within their category: \
images re-encode natively, documents are re-rendered through a paginated layout engine, \
and audio/video transcode through ffmpeg.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input files or HTTP/HTTPS URLs.
    #[arg(required_unless_present = "list_formats")]
    inputs: Vec<String>,

    /// Target format: pdf, png, webp, txt, mp3, wav, ogg, mp4, avi, webm.
    #[arg(short, long, required_unless_present = "list_formats")]
    to: Option<String>,

    /// Directory for output artifacts.
    #[arg(short, long, env = "FILEMORPH_OUTPUT_DIR", default_value = "converted")]
    output_dir: PathBuf,

    /// TrueType font for PNG rendering of documents.
    #[arg(long, env = "FILEMORPH_FONT")]
    font: Option<PathBuf>,

    /// ffmpeg binary for audio/video transcodes.
    #[arg(long, env = "FILEMORPH_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: String,

    /// Per-transcode ffmpeg timeout in seconds.
    #[arg(long, env = "FILEMORPH_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "FILEMORPH_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Number of concurrent conversions in batch mode.
    #[arg(short, long, env = "FILEMORPH_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Output structured JSON instead of human-readable lines.
    #[arg(long, env = "FILEMORPH_JSON")]
    json: bool,

    /// Disable the batch progress spinner.
    #[arg(long, env = "FILEMORPH_NO_PROGRESS")]
    no_progress: bool,

    /// Print the supported conversion table and exit.
    #[arg(long)]
    list_formats: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILEMORPH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FILEMORPH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_formats {
        print!("{}", formats::conversion_table());
        return Ok(());
    }

    let to = cli.to.as_deref().unwrap_or_default();
    let target = Target::parse(to)
        .with_context(|| format!("Unknown target format '{to}' (see --list-formats)"))?;

    let config = build_config(&cli)?;

    if cli.inputs.len() == 1 {
        run_single(&cli, &cli.inputs[0], target, &config).await
    } else {
        run_batch(&cli, target, &config).await
    }
}

async fn run_single(
    cli: &Cli,
    input: &str,
    target: Target,
    config: &ConversionConfig,
) -> Result<()> {
    let output = convert(input, target, config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        print_output_line(&output);
    }
    Ok(())
}

async fn run_batch(cli: &Cli, target: Target, config: &ConversionConfig) -> Result<()> {
    let spinner = if cli.quiet || cli.json || cli.no_progress {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Converting");
        bar.set_message(format!("{} files", cli.inputs.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    };

    let items = convert_many(&cli.inputs, target, config).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let failed = items
        .iter()
        .filter(|i| matches!(i.outcome, BatchOutcome::Failed { .. }))
        .count();

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("Failed to serialise batch report")?
        );
    } else if !cli.quiet {
        for item in &items {
            match &item.outcome {
                BatchOutcome::Converted { output } => print_output_line(output),
                BatchOutcome::Failed { error } => {
                    eprintln!("{} {}  {}", red("✗"), item.input, red(error));
                }
            }
        }
        let ok = items.len() - failed;
        eprintln!(
            "{} {}/{} files converted",
            if failed == 0 { green("✔") } else { red("⚠") },
            bold(&ok.to_string()),
            items.len()
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} conversions failed", items.len());
    }
    Ok(())
}

fn print_output_line(output: &ConversionOutput) {
    eprintln!(
        "{} {}  {}  {}",
        green("✓"),
        bold(&output.path.display().to_string()),
        dim(&format!("{} bytes", output.bytes_written)),
        dim(&format!("{}ms", output.stats.total_duration_ms)),
    );
    for page in &output.extra_pages {
        eprintln!("  {}", dim(&page.display().to_string()));
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .output_dir(&cli.output_dir)
        .ffmpeg_path(&cli.ffmpeg)
        .tool_timeout_secs(cli.timeout)
        .download_timeout_secs(cli.download_timeout)
        .concurrency(cli.concurrency);

    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }

    builder.build().context("Invalid configuration")
}
