//! Stream Selector: find the image streams that are safe to recompress.
//!
//! The selector is a pure filter over the document's indirect-object table.
//! An object qualifies only when **all** of the following hold:
//!
//! 1. it is a stream object;
//! 2. its `/Subtype` is exactly `Image`;
//! 3. it is not an `/ImageMask` (1-bit stencil data);
//! 4. it carries no `/SMask` or `/Mask` entry — transparency and stencil
//!    masks are paired with the image's pixel grid, and recompressing one
//!    side of the pair corrupts rendering;
//! 5. its filter chain is exactly `DCTDecode` — JPEG2000, Flate bitmaps,
//!    CCITT fax and friends need different re-encode logic than this engine
//!    provides, so they are left alone;
//! 6. its raw payload is at least `min_candidate_bytes` long.
//!
//! Anything the selector rejects must come out of the rewriter byte-identical
//! to how it went in.

use crate::outcome::ScanReport;
use lopdf::{Document, Object, ObjectId, Stream};

/// A qualifying image stream, detached from the document.
///
/// `bytes` is a private copy of the raw DCT payload so re-encoding can run
/// on worker threads without borrowing the `Document`; the rewriter finds
/// the stream again by `id`.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: ObjectId,
    pub bytes: Vec<u8>,
}

/// Lazily yield `(id, stream)` for every qualifying image stream, in the
/// document's native object order (ascending object id, not page order).
pub fn candidates(
    doc: &Document,
    min_candidate_bytes: usize,
) -> impl Iterator<Item = (ObjectId, &Stream)> + '_ {
    doc.objects.iter().filter_map(move |(&id, object)| match object {
        Object::Stream(stream) if is_candidate(stream, min_candidate_bytes) => Some((id, stream)),
        _ => None,
    })
}

/// Materialize the candidate list with payload copies (apply-after-collect:
/// the copies feed the concurrent re-encoders while the document itself
/// stays untouched until the rewriter pass).
pub fn scan(doc: &Document, min_candidate_bytes: usize) -> Vec<Candidate> {
    candidates(doc, min_candidate_bytes)
        .map(|(id, stream)| Candidate {
            id,
            bytes: stream.content.clone(),
        })
        .collect()
}

/// Count objects, image streams, and candidates without copying payloads.
pub fn census(doc: &Document, min_candidate_bytes: usize) -> ScanReport {
    let mut image_streams = 0usize;
    let mut candidate_count = 0usize;
    let mut candidate_bytes = 0u64;

    for object in doc.objects.values() {
        if let Object::Stream(stream) = object {
            if subtype_is_image(stream) {
                image_streams += 1;
            }
            if is_candidate(stream, min_candidate_bytes) {
                candidate_count += 1;
                candidate_bytes += stream.content.len() as u64;
            }
        }
    }

    ScanReport {
        objects: doc.objects.len(),
        image_streams,
        candidates: candidate_count,
        candidate_bytes,
    }
}

/// The full safety-filter chain for one stream.
pub fn is_candidate(stream: &Stream, min_candidate_bytes: usize) -> bool {
    subtype_is_image(stream)
        && !is_image_mask(stream)
        && !has_mask_entry(stream)
        && filter_is_baseline_jpeg(stream)
        && stream.content.len() >= min_candidate_bytes
}

fn subtype_is_image(stream: &Stream) -> bool {
    stream
        .dict
        .get(b"Subtype")
        .and_then(|o| o.as_name())
        .is_ok_and(|name| name == b"Image")
}

fn is_image_mask(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"ImageMask"), Ok(Object::Boolean(true)))
}

fn has_mask_entry(stream: &Stream) -> bool {
    stream.dict.has(b"SMask") || stream.dict.has(b"Mask")
}

/// True when the decode chain is exactly `DCTDecode` — either the name form
/// `/Filter /DCTDecode` or the equivalent one-element array form.
fn filter_is_baseline_jpeg(stream: &Stream) -> bool {
    stream
        .filters()
        .is_ok_and(|chain| chain.len() == 1 && chain[0] == b"DCTDecode")
}
