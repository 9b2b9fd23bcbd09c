//! CLI binary for pdf-squeeze.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SqueezeConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_squeeze::{
    compress, inspect, CompressionLevel, ProgressCallback, SqueezeConfig, SqueezeProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-image log
/// lines using [indicatif]. Designed to work correctly when images complete
/// out-of-order (concurrent re-encoding).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of images passed over.
    skips: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_scan_complete` (called once the selector has counted candidates).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_scan_complete

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Parsing PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skips: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Squeezing");
    }
}

impl SqueezeProgressCallback for CliProgressCallback {
    fn on_scan_complete(&self, candidates: usize) {
        self.activate_bar(candidates);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{candidates} candidate image streams"))
        ));
    }

    fn on_image_start(&self, index: usize, _total: usize) {
        self.bar.set_message(format!("image {}", index + 1));
    }

    fn on_image_committed(&self, index: usize, total: usize, old_len: usize, new_len: usize) {
        let saved = 100.0 - new_len as f64 * 100.0 / old_len.max(1) as f64;
        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {:>9} → {:>9}  {}",
            green("✓"),
            index + 1,
            total,
            format!("{old_len} B"),
            format!("{new_len} B"),
            dim(&format!("-{saved:.0}%")),
        ));
        self.bar.inc(1);
    }

    fn on_image_skipped(&self, index: usize, total: usize, reason: &str) {
        self.skips.fetch_add(1, Ordering::SeqCst);

        // Truncate very long reasons to keep output tidy.
        let msg = if reason.len() > 80 {
            format!("{}\u{2026}", &reason[..79])
        } else {
            reason.to_string()
        };

        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {}",
            yellow("∅"),
            index + 1,
            total,
            dim(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_complete(&self, optimized: usize, total: usize, rolled_back: bool) {
        self.bar.finish_and_clear();

        if rolled_back {
            eprintln!(
                "{} no net reduction — original returned unchanged",
                yellow("⚠")
            );
        } else if total == 0 {
            eprintln!("{} no compressible images found", yellow("⚠"));
        } else {
            eprintln!(
                "{} {}/{} images optimized",
                green("✔"),
                bold(&optimized.to_string()),
                total
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Recompress with the default level (recommended)
  pdfsqueeze scan.pdf

  # Choose where the output goes
  pdfsqueeze scan.pdf -o scan.small.pdf

  # Smallest possible output
  pdfsqueeze --level extreme thesis.pdf

  # Custom profile: keep dimensions, just drop quality
  pdfsqueeze --quality 30 --max-dimension 4000 brochure.pdf

  # Machine-readable stats
  pdfsqueeze --json report.pdf -o report.small.pdf

  # What would be touched, without touching it
  pdfsqueeze --inspect-only scan.pdf

LEVELS:
  Level        Quality  Max dimension
  ─────────    ───────  ─────────────
  extreme      18       900 px
  recommended  45       1800 px   (default)
  less         75       2800 px

Only baseline-JPEG (DCTDecode) image streams without transparency or stencil
masks are touched. If recompression does not shrink the file, the original
bytes are returned unchanged — output is never larger than input.
"#;

/// Recompress the raster images inside PDF files.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsqueeze",
    version,
    about = "Recompress the raster images inside PDF files",
    long_about = "Shrink PDF files by re-encoding their embedded JPEG images under a \
size/quality profile. Structure, text, and vector content are untouched; streams with \
transparency or stencil masks are left alone; output is never larger than input.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Write the result here instead of `<input>.squeezed.pdf`.
    #[arg(short, long, env = "PDFSQUEEZE_OUTPUT")]
    output: Option<PathBuf>,

    /// Compression level: extreme, recommended, less.
    #[arg(long, env = "PDFSQUEEZE_LEVEL", value_enum, default_value = "recommended")]
    level: LevelArg,

    /// Override the level's JPEG quality (1–100).
    #[arg(long, env = "PDFSQUEEZE_QUALITY",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Override the level's longest-side pixel cap.
    #[arg(long, env = "PDFSQUEEZE_MAX_DIMENSION")]
    max_dimension: Option<u32>,

    /// Minimum raw stream size (bytes) for an image to be considered.
    #[arg(long, env = "PDFSQUEEZE_MIN_BYTES", default_value_t = pdf_squeeze::MIN_CANDIDATE_BYTES)]
    min_bytes: usize,

    /// Number of images re-encoded concurrently.
    #[arg(short, long, env = "PDFSQUEEZE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Output run statistics as JSON on stdout.
    #[arg(long, env = "PDFSQUEEZE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFSQUEEZE_NO_PROGRESS")]
    no_progress: bool,

    /// Print what the selector would touch, change nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSQUEEZE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSQUEEZE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LevelArg {
    Extreme,
    Recommended,
    Less,
}

impl From<LevelArg> for CompressionLevel {
    fn from(v: LevelArg) -> Self {
        match v {
            LevelArg::Extreme => CompressionLevel::Extreme,
            LevelArg::Recommended => CompressionLevel::Recommended,
            LevelArg::Less => CompressionLevel::Less,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input_bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let report = inspect(&input_bytes).await.context("Inspection failed")?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("File:             {}", cli.input.display());
            println!("Size:             {} bytes", input_bytes.len());
            println!("Objects:          {}", report.objects);
            println!("Image streams:    {}", report.image_streams);
            println!("Candidates:       {}", report.candidates);
            println!("Candidate bytes:  {}", report.candidate_bytes);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar starts as a spinner (candidate count unknown);
    // `on_scan_complete` resizes it once the selector has run.
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn SqueezeProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run recompression ────────────────────────────────────────────────
    let outcome = compress(&input_bytes, &config)
        .await
        .context("Recompression failed")?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    write_output(&output_path, &outcome.bytes)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
    } else if !cli.quiet {
        let stats = &outcome.stats;
        eprintln!(
            "{}  {} → {} bytes  {}  →  {}",
            if stats.rolled_back {
                yellow("⚠")
            } else {
                green("✔")
            },
            stats.original_bytes,
            stats.output_bytes,
            dim(&format!("-{:.1}%", stats.savings_percent())),
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} of {} candidate images optimized  —  {}ms total",
            dim(&stats.optimized_images.to_string()),
            dim(&stats.candidates.to_string()),
            stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `SqueezeConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SqueezeConfig> {
    let mut builder = SqueezeConfig::builder()
        .level(cli.level.into())
        .min_candidate_bytes(cli.min_bytes)
        .concurrency(cli.concurrency);

    if let Some(q) = cli.quality {
        builder = builder.quality(q);
    }
    if let Some(d) = cli.max_dimension {
        builder = builder.max_dimension(d);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// `scan.pdf` → `scan.squeezed.pdf`; extensionless inputs get `.squeezed.pdf`.
fn default_output_path(input: &std::path::Path) -> PathBuf {
    input.with_extension("squeezed.pdf")
}

/// Plain write; the library's `compress_file` staging is not needed here
/// because the bytes are already validated in memory.
fn write_output(path: &std::path::Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut f = std::fs::File::create(path)?;
    f.write_all(bytes)?;
    Ok(())
}
