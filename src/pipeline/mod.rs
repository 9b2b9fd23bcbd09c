//! Pipeline stages for PDF image recompression.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and keeps the unsafe
//! decisions (what to touch, what to keep) out of the code that does the
//! touching.
//!
//! ## Data Flow
//!
//! ```text
//! select ──▶ reencode ──▶ rewrite ──▶ guard
//! (filter)   (JPEG xform) (commit+save) (size check)
//! ```
//!
//! 1. [`select`]   — walk the indirect-object table and keep only streams
//!    that are provably safe to recompress
//! 2. [`reencode`] — per candidate: decode, shrink-only resize, re-encode as
//!    baseline JPEG; runs on `spawn_blocking` workers, fanned out by
//!    [`crate::compress`]
//! 3. [`rewrite`]  — single-writer pass committing accepted payloads into
//!    the document, then one object-stream serialization
//! 4. [`guard`]    — compare whole buffers; fall back to the original when
//!    the rewrite did not pay off

pub mod guard;
pub mod reencode;
pub mod rewrite;
pub mod select;
