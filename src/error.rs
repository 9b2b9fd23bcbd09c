//! Error types for the pdf-squeeze library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SqueezeError`] — **Fatal**: the operation cannot proceed at all
//!   (the input bytes are not a parseable PDF, a file could not be read or
//!   written, the configuration is invalid). Returned as
//!   `Err(SqueezeError)` from the top-level `compress*` functions.
//!
//! * [`SkipReason`] — **Non-fatal**: a single candidate image could not be
//!   re-encoded (corrupt stream, unsupported colorspace) or re-encoding
//!   produced no worthwhile gain. The candidate is left untouched, the
//!   reason is counted in [`crate::outcome::SqueezeStats`], and the rest of
//!   the document is processed normally.
//!
//! The separation keeps the skip policy explicit: per-image outcomes flow
//! through the pipeline as `Result<EncodedImage, SkipReason>` values instead
//! of being swallowed by control flow, so tests can assert exactly why a
//! stream was passed over.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-squeeze library.
///
/// Per-image failures use [`SkipReason`] and are absorbed internally rather
/// than propagated here. The only content-level fatal error is
/// [`SqueezeError::LoadFailed`]; everything else concerns the surrounding
/// surface (files, configuration, runtime plumbing).
#[derive(Debug, Error)]
pub enum SqueezeError {
    /// The input bytes could not be parsed as a PDF document at all.
    #[error("input is not a loadable PDF: {detail}")]
    LoadFailed { detail: String },

    /// Could not read the input file.
    #[error("failed to read input file '{path}': {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (runtime construction, task plumbing).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a single candidate image was left untouched.
///
/// Stored nowhere in the document; surfaced through logs, progress
/// callbacks, and the skip counter in [`crate::outcome::SqueezeStats`].
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum SkipReason {
    /// The raw stream bytes did not decode as a JPEG image.
    #[error("image decode failed: {detail}")]
    Decode { detail: String },

    /// Decoding succeeded but re-encoding failed.
    #[error("JPEG re-encode failed: {detail}")]
    Encode { detail: String },

    /// Re-encoding succeeded but the result was not smaller than the
    /// commit margin requires.
    #[error("no gain: re-encoded to {reencoded} bytes from {original} bytes")]
    NoGain { original: usize, reencoded: usize },
}
