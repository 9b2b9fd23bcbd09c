//! Progress-callback trait for per-image recompression events.
//!
//! Inject an [`Arc<dyn SqueezeProgressCallback>`] via
//! [`crate::config::SqueezeConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through each candidate image.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, a database
//! record, or a terminal progress bar — without the library knowing anything
//! about how the host application communicates. The trait is `Send + Sync`
//! so it works correctly when images are re-encoded concurrently.
//!
//! # Example
//!
//! ```rust
//! use pdf_squeeze::{SqueezeConfig, SqueezeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     committed: Arc<AtomicUsize>,
//! }
//!
//! impl SqueezeProgressCallback for CountingCallback {
//!     fn on_image_committed(&self, index: usize, total: usize, old_len: usize, new_len: usize) {
//!         self.committed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("image {}/{}: {} -> {} bytes", index + 1, total, old_len, new_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     committed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = SqueezeConfig::builder()
//!     .progress_callback(counter as Arc<dyn SqueezeProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the recompression pipeline as it processes each candidate.
///
/// Implementations must be `Send + Sync` (candidates are re-encoded
/// concurrently on blocking worker threads). All methods have default no-op
/// implementations so callers only override what they care about.
///
/// # Thread safety
///
/// `on_image_start`, `on_image_committed`, and `on_image_skipped` may be
/// called concurrently and out of candidate order. Implementations must
/// protect shared mutable state with appropriate synchronisation primitives
/// (e.g. `Mutex`, `AtomicUsize`).
pub trait SqueezeProgressCallback: Send + Sync {
    /// Called once after the selector pass, before any image is touched.
    ///
    /// # Arguments
    /// * `candidates` — number of image streams that qualified for
    ///   recompression
    fn on_scan_complete(&self, candidates: usize) {
        let _ = candidates;
    }

    /// Called just before a candidate is handed to the re-encoder.
    ///
    /// # Arguments
    /// * `index` — 0-indexed candidate number (selector order)
    /// * `total` — total candidates
    fn on_image_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a re-encoded image is accepted into the document.
    ///
    /// # Arguments
    /// * `index`   — 0-indexed candidate number
    /// * `total`   — total candidates
    /// * `old_len` — original raw stream length in bytes
    /// * `new_len` — committed replacement length in bytes
    fn on_image_committed(&self, index: usize, total: usize, old_len: usize, new_len: usize) {
        let _ = (index, total, old_len, new_len);
    }

    /// Called when a candidate is passed over.
    ///
    /// # Arguments
    /// * `index`  — 0-indexed candidate number
    /// * `total`  — total candidates
    /// * `reason` — human-readable skip description
    fn on_image_skipped(&self, index: usize, total: usize, reason: &str) {
        let _ = (index, total, reason);
    }

    /// Called once after the guard decided the final output.
    ///
    /// # Arguments
    /// * `optimized`   — images actually committed
    /// * `total`       — total candidates
    /// * `rolled_back` — whether the rewritten document was discarded in
    ///   favour of the original bytes
    fn on_complete(&self, optimized: usize, total: usize, rolled_back: bool) {
        let _ = (optimized, total, rolled_back);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl SqueezeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SqueezeConfig`].
pub type ProgressCallback = Arc<dyn SqueezeProgressCallback>;
