//! Regression Guard: the output is never larger than the input.
//!
//! The check is unconditional. Even when individual images shrank, the
//! serialized document can come out bigger than the original — object-stream
//! repacking has fixed overhead that per-image savings do not always cover
//! on documents with few or small images. From the caller's point of view
//! recompression is a strict non-regression transform, so the guard compares
//! whole buffers and falls back to the untouched input when the rewrite did
//! not pay off.

use tracing::info;

/// What the guard decided.
#[derive(Debug)]
pub struct GuardResult {
    /// The buffer to hand back to the caller.
    pub bytes: Vec<u8>,
    /// True when `bytes` is the original input rather than the rewrite.
    pub rolled_back: bool,
}

/// Keep the rewritten buffer only if it is strictly smaller than the
/// original; otherwise return the original unchanged.
pub fn choose(original: Vec<u8>, rewritten: Vec<u8>) -> GuardResult {
    if rewritten.len() >= original.len() {
        info!(
            original = original.len(),
            rewritten = rewritten.len(),
            "no net reduction, returning original bytes"
        );
        GuardResult {
            bytes: original,
            rolled_back: true,
        }
    } else {
        GuardResult {
            bytes: rewritten,
            rolled_back: false,
        }
    }
}
