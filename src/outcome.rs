//! Result types returned by the recompression entry points.

use serde::{Deserialize, Serialize};

/// The result of one recompression run.
///
/// `bytes` is always a complete, valid PDF: either the rewritten document,
/// or the untouched input when nothing improved (see
/// [`SqueezeStats::rolled_back`]).
#[derive(Debug, Clone)]
pub struct SqueezeOutcome {
    /// The output document.
    pub bytes: Vec<u8>,
    /// Size metrics and per-run counters.
    pub stats: SqueezeStats,
}

impl SqueezeOutcome {
    /// Bytes saved relative to the input. Zero when rolled back.
    pub fn saved_bytes(&self) -> u64 {
        self.stats.original_bytes.saturating_sub(self.stats.output_bytes)
    }
}

/// Counters and metrics for one run.
///
/// `original_bytes` and `output_bytes` always equal the true lengths of the
/// input buffer and of [`SqueezeOutcome::bytes`] — callers surface them
/// directly (e.g. as HTTP response headers) without re-measuring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqueezeStats {
    /// Length of the input buffer.
    pub original_bytes: u64,
    /// Length of the returned buffer.
    pub output_bytes: u64,
    /// Image streams that passed every selector criterion.
    pub candidates: usize,
    /// Candidates whose re-encoded bytes were committed into the document.
    /// When `rolled_back` is true the returned buffer contains none of
    /// these commits.
    pub optimized_images: usize,
    /// Candidates passed over (decode/encode failure or no worthwhile gain).
    pub skipped_images: usize,
    /// True when a rewritten document was discarded and the original bytes
    /// returned instead — serialization overhead outweighed the per-image
    /// savings, or serialization itself failed. Stays false when nothing
    /// was committed and the input passed through untouched.
    pub rolled_back: bool,
    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
    /// Wall-clock duration of the concurrent re-encode stage in milliseconds.
    pub encode_duration_ms: u64,
}

impl SqueezeStats {
    /// Size reduction as a percentage of the input (0.0 when rolled back).
    pub fn savings_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        let saved = self.original_bytes.saturating_sub(self.output_bytes);
        saved as f64 * 100.0 / self.original_bytes as f64
    }
}

/// What [`crate::compress::inspect`] found, without touching anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Total indirect objects in the document.
    pub objects: usize,
    /// Stream objects with `/Subtype /Image`, qualifying or not.
    pub image_streams: usize,
    /// Image streams passing every selector criterion.
    pub candidates: usize,
    /// Combined raw payload length of the candidates.
    pub candidate_bytes: u64,
}
