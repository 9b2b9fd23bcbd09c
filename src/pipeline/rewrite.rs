//! Document Rewriter: commit accepted payloads and serialize the document.
//!
//! The rewriter is the only stage that mutates the `Document`, and it runs
//! single-writer after all re-encoding has finished. Committing a payload
//! keeps the stream's reference identity — page content streams elsewhere in
//! the document keep pointing at the same object id, so nothing else needs
//! rewriting.
//!
//! Invariant: after `commit`, the stream's `/Length` equals the payload
//! length (maintained by `Stream::set_content`) and the dictionary describes
//! the new encoding — stale `/DecodeParms` removed, `/Width`, `/Height`,
//! `/ColorSpace` and `/BitsPerComponent` matching what the re-encoder
//! actually produced.

use crate::pipeline::reencode::{EncodedImage, JpegColor};
use lopdf::{Document, Object, ObjectId, SaveOptions};
use tracing::warn;

/// The commit gate: accept a replacement only when it is strictly smaller
/// than `max_commit_ratio` of the original (default: 98%, i.e. savings must
/// beat a 2% margin). Marginal wins are not worth touching the stream for.
pub fn worth_committing(original_len: usize, reencoded_len: usize, max_commit_ratio: f64) -> bool {
    (reencoded_len as f64) < original_len as f64 * max_commit_ratio
}

/// Replace the stream's payload and refresh its dictionary in place.
///
/// Returns `false` (and leaves the document untouched) if `id` no longer
/// resolves to a stream — which can only happen if the caller passes an id
/// that did not come from the selector.
pub fn commit(doc: &mut Document, id: ObjectId, image: EncodedImage) -> bool {
    let stream = match doc.get_object_mut(id).and_then(Object::as_stream_mut) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("object {:?} disappeared before commit: {}", id, e);
            return false;
        }
    };

    stream.dict.remove(b"DecodeParms");
    stream.dict.remove(b"DecodeParams");
    stream.dict.set("Width", image.width as i64);
    stream.dict.set("Height", image.height as i64);
    stream.dict.set(
        "ColorSpace",
        match image.color {
            JpegColor::Gray => "DeviceGray",
            JpegColor::Rgb => "DeviceRGB",
        },
    );
    stream.dict.set("BitsPerComponent", 8);
    // set_content also rewrites /Length; the declared length must always
    // match the payload or strict parsers reject the file.
    stream.set_content(image.bytes);
    true
}

/// Serialize the whole document with object-stream packing.
///
/// Object streams + xref streams group the document's small non-stream
/// objects into compressed containers, which is where the structural half
/// of the savings comes from on object-heavy files.
pub fn serialize(mut doc: Document) -> Result<Vec<u8>, lopdf::Error> {
    let options = SaveOptions::builder()
        .use_object_streams(true)
        .use_xref_streams(true)
        .build();
    let mut bytes = Vec::new();
    doc.save_with_options(&mut bytes, options)?;
    Ok(bytes)
}
