//! Recompression entry points.
//!
//! [`compress`] is the primary API: one PDF byte buffer in, one byte buffer
//! plus metrics out, with the non-regression guarantee that the output is
//! never larger than the input. [`compress_file`] and [`compress_sync`] wrap
//! it for file-based and blocking callers; [`inspect`] runs the selector
//! census without touching anything.
//!
//! ## Why async over a CPU-bound pipeline?
//!
//! The engine is invoked per request by async hosts (HTTP handlers, job
//! workers). Parsing, JPEG transforms, and serialization are CPU-bound, so
//! each runs on `tokio::task::spawn_blocking` threads; candidate re-encodes
//! fan out with `buffer_unordered` since every worker owns a private copy of
//! its payload. Only the rewriter mutates the document, and it runs after
//! all workers have finished (apply-after-collect), so document state is
//! strictly single-writer.

use crate::config::{SqueezeConfig, MIN_CANDIDATE_BYTES};
use crate::error::{SkipReason, SqueezeError};
use crate::outcome::{ScanReport, SqueezeOutcome, SqueezeStats};
use crate::pipeline::{guard, reencode, rewrite, select};
use futures::stream::{self, StreamExt};
use lopdf::Document;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Recompress the raster images inside a PDF.
///
/// # Arguments
/// * `bytes`  — the complete PDF file
/// * `config` — level, thresholds, concurrency, optional progress callback
///
/// # Returns
/// `Ok(SqueezeOutcome)` whenever the input loads as a PDF — even when
/// nothing could be optimized (the outcome then carries the original bytes
/// unchanged). `stats.original_bytes` / `stats.output_bytes` always equal
/// the true buffer lengths.
///
/// # Errors
/// [`SqueezeError::LoadFailed`] when the input cannot be parsed as a PDF at
/// all. Per-image problems never surface here; they are counted in
/// `stats.skipped_images`.
pub async fn compress(
    bytes: &[u8],
    config: &SqueezeConfig,
) -> Result<SqueezeOutcome, SqueezeError> {
    let total_start = Instant::now();
    let original = Arc::new(bytes.to_vec());
    let input_len = original.len();
    info!(
        "starting recompression: {} bytes, level {}",
        input_len, config.level
    );

    // ── Step 1: Load the document ────────────────────────────────────────
    let doc = load_document(Arc::clone(&original)).await?;

    // ── Step 2: Select candidate image streams ───────────────────────────
    let candidates = select::scan(&doc, config.min_candidate_bytes);
    let total = candidates.len();
    debug!("selected {} candidate image streams", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(total);
    }

    // ── Step 3: Re-encode candidates concurrently ────────────────────────
    let encode_start = Instant::now();
    let profile = config.effective_profile();
    let mut results: Vec<_> = stream::iter(candidates.into_iter().enumerate().map(
        |(index, candidate)| {
            let cb = config.progress_callback.clone();
            async move {
                if let Some(ref cb) = cb {
                    cb.on_image_start(index, total);
                }
                let id = candidate.id;
                let original_len = candidate.bytes.len();
                let result =
                    tokio::task::spawn_blocking(move || reencode::reencode(&candidate.bytes, &profile))
                        .await
                        // A panicking worker must not take the document down
                        // with it; it only forfeits its own candidate.
                        .unwrap_or_else(|join| {
                            Err(SkipReason::Encode {
                                detail: format!("re-encode worker panicked: {join}"),
                            })
                        });
                (index, id, original_len, result)
            }
        },
    ))
    .buffer_unordered(config.concurrency)
    .collect()
    .await;
    let encode_duration_ms = encode_start.elapsed().as_millis() as u64;

    // buffer_unordered finishes in completion order; restore selector order
    // so commits and logs are deterministic.
    results.sort_by_key(|&(index, ..)| index);

    // ── Step 4: Commit accepted payloads (single-writer) ─────────────────
    let mut doc = doc;
    let mut optimized = 0usize;
    let mut skipped = 0usize;
    for (index, id, original_len, result) in results {
        match result {
            Ok(image)
                if rewrite::worth_committing(
                    original_len,
                    image.bytes.len(),
                    config.max_commit_ratio,
                ) =>
            {
                let new_len = image.bytes.len();
                if rewrite::commit(&mut doc, id, image) {
                    optimized += 1;
                    debug!(
                        "object {:?}: committed {} -> {} bytes",
                        id, original_len, new_len
                    );
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_image_committed(index, total, original_len, new_len);
                    }
                } else {
                    skipped += 1;
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_image_skipped(index, total, "stream vanished before commit");
                    }
                }
            }
            Ok(image) => {
                let reason = SkipReason::NoGain {
                    original: original_len,
                    reencoded: image.bytes.len(),
                };
                debug!("object {:?}: {}", id, reason);
                skipped += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_skipped(index, total, &reason.to_string());
                }
            }
            Err(reason) => {
                debug!("object {:?}: {}", id, reason);
                skipped += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_skipped(index, total, &reason.to_string());
                }
            }
        }
    }

    // ── Step 5: Serialize and guard ──────────────────────────────────────
    let original = Arc::try_unwrap(original).unwrap_or_else(|arc| arc.as_ref().clone());
    let (bytes, rolled_back) = if optimized == 0 {
        // Nothing committed: the document is untouched, so skip
        // serialization entirely and hand back the exact input bytes.
        debug!("no images committed, document left untouched");
        (original, false)
    } else {
        match tokio::task::spawn_blocking(move || rewrite::serialize(doc)).await {
            Ok(Ok(rewritten)) => {
                let verdict = guard::choose(original, rewritten);
                (verdict.bytes, verdict.rolled_back)
            }
            Ok(Err(e)) => {
                // Only load failure is fatal; a broken save falls back to
                // the original bytes like any other non-improvement.
                warn!("serialization failed, returning original bytes: {e}");
                (original, true)
            }
            Err(join) => {
                warn!("serialization task panicked, returning original bytes: {join}");
                (original, true)
            }
        }
    };

    // ── Step 6: Assemble stats ───────────────────────────────────────────
    let stats = SqueezeStats {
        original_bytes: input_len as u64,
        output_bytes: bytes.len() as u64,
        candidates: total,
        optimized_images: optimized,
        skipped_images: skipped,
        rolled_back,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        encode_duration_ms,
    };

    info!(
        "recompression complete: {} -> {} bytes ({:.1}% saved), {}/{} images optimized, {}ms",
        stats.original_bytes,
        stats.output_bytes,
        stats.savings_percent(),
        optimized,
        total,
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_complete(optimized, total, rolled_back);
    }

    Ok(SqueezeOutcome { bytes, stats })
}

/// Synchronous wrapper around [`compress`].
///
/// Creates a temporary tokio runtime internally.
pub fn compress_sync(
    bytes: &[u8],
    config: &SqueezeConfig,
) -> Result<SqueezeOutcome, SqueezeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SqueezeError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(compress(bytes, config))
}

/// Recompress a PDF file on disk and write the result atomically.
///
/// The output is staged in a temp file next to the destination and renamed
/// into place, so a crash mid-write never leaves a truncated PDF behind.
pub async fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &SqueezeConfig,
) -> Result<SqueezeStats, SqueezeError> {
    let input = input.as_ref();
    let bytes = tokio::fs::read(input)
        .await
        .map_err(|e| SqueezeError::InputRead {
            path: input.to_path_buf(),
            source: e,
        })?;

    let outcome = compress(&bytes, config).await?;

    let output = output.as_ref().to_path_buf();
    let stats = outcome.stats.clone();
    tokio::task::spawn_blocking(move || write_atomic(&output, &outcome.bytes))
        .await
        .map_err(|e| SqueezeError::Internal(format!("write task panicked: {e}")))??;

    Ok(stats)
}

/// Load a PDF and report what the selector would do, without mutating
/// anything. Uses the default [`MIN_CANDIDATE_BYTES`] threshold.
pub async fn inspect(bytes: &[u8]) -> Result<ScanReport, SqueezeError> {
    let doc = load_document(Arc::new(bytes.to_vec())).await?;
    Ok(select::census(&doc, MIN_CANDIDATE_BYTES))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Parse the input on a blocking thread; the only fatal content error.
async fn load_document(bytes: Arc<Vec<u8>>) -> Result<Document, SqueezeError> {
    tokio::task::spawn_blocking(move || Document::load_mem(&bytes))
        .await
        .map_err(|e| SqueezeError::Internal(format!("load task panicked: {e}")))?
        .map_err(|e| SqueezeError::LoadFailed {
            detail: e.to_string(),
        })
}

/// Stage into a sibling temp file, then rename over the destination.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SqueezeError> {
    use std::io::Write;

    let io_err = |source: std::io::Error| SqueezeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            std::fs::create_dir_all(p).map_err(io_err)?;
            p
        }
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.persist(path)
        .map_err(|e| io_err(e.error))?;
    Ok(())
}
