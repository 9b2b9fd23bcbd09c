//! # pdf-squeeze
//!
//! Safe, in-place recompression of the raster images inside a PDF.
//!
//! ## Why this crate?
//!
//! Most of a scanned or photo-heavy PDF's weight sits in its embedded JPEG
//! streams, usually stored at print resolution and generous quality. Naive
//! "PDF compressors" either re-render whole pages (destroying text and
//! vectors) or blindly re-encode every image stream (corrupting stencil
//! masks, transparency pairs, and exotic encodings). This crate walks the
//! document's object graph, re-encodes only the streams that are provably
//! safe to touch, keeps the document structurally valid, and guarantees the
//! output is never larger than the input.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Load      parse the object graph via lopdf (CPU-bound, spawn_blocking)
//!  ├─ 2. Select    filter streams: /Subtype /Image, DCTDecode only,
//!  │               no SMask/Mask/ImageMask, ≥ 5 KB
//!  ├─ 3. Re-encode shrink-only resize + baseline JPEG at the level's
//!  │               quality, concurrent across candidates
//!  ├─ 4. Rewrite   commit winners in place (payload, /Length, dict refresh),
//!  │               serialize once with object-stream packing
//!  └─ 5. Guard     output ≥ input? return the original bytes instead
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_squeeze::{compress, CompressionLevel, SqueezeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = std::fs::read("scan.pdf")?;
//!     let config = SqueezeConfig::builder()
//!         .level(CompressionLevel::Recommended)
//!         .build()?;
//!     let outcome = compress(&input, &config).await?;
//!     std::fs::write("scan.small.pdf", &outcome.bytes)?;
//!     eprintln!(
//!         "{} -> {} bytes, {} images optimized",
//!         outcome.stats.original_bytes,
//!         outcome.stats.output_bytes,
//!         outcome.stats.optimized_images
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Compression levels
//!
//! | Level | Quality | Max dimension | Use for |
//! |-------|---------|---------------|---------|
//! | `extreme` | 18 | 900 px | attachment limits, archival of text scans |
//! | `recommended` | 45 | 1800 px | default — screen-readable at a fraction of the size |
//! | `less` | 75 | 2800 px | near-lossless, mostly shrinks oversized originals |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsqueeze` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf-squeeze = { version = "0.3", default-features = false }
//! ```
//!
//! ## Guarantees
//!
//! * **Non-regression** — `output.len() <= input.len()`, unconditionally.
//! * **Safety** — streams failing any selector criterion come through
//!   byte-identical.
//! * **Isolation** — one broken image never fails the document; only
//!   unparseable input does.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compress;
pub mod config;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compress::{compress, compress_file, compress_sync, inspect};
pub use config::{
    CompressionLevel, CompressionProfile, SqueezeConfig, SqueezeConfigBuilder,
    MAX_COMMIT_RATIO, MIN_CANDIDATE_BYTES,
};
pub use error::{SkipReason, SqueezeError};
pub use outcome::{ScanReport, SqueezeOutcome, SqueezeStats};
pub use progress::{NoopProgressCallback, ProgressCallback, SqueezeProgressCallback};
