//! End-to-end tests for pdf-squeeze.
//!
//! Every test builds its input PDF in memory — synthetic JPEG payloads via
//! the `image` crate, document structure via `lopdf` — so the suite is fully
//! hermetic: no fixtures, no network, no environment gating.

use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, ImageFormat, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use pdf_squeeze::{
    compress, inspect, CompressionLevel, SqueezeConfig, SqueezeError, MIN_CANDIDATE_BYTES,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A patterned RGB JPEG (checkerboard + gradients) so encoded sizes behave
/// like real photographs rather than flat fills.
fn rgb_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let checker = if (x / 8 + y / 8) % 2 == 0 { 40 } else { 210 };
        image::Rgb([(x % 256) as u8, (y % 256) as u8, checker])
    });
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&img)
        .unwrap();
    bytes
}

fn gray_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| image::Luma([((x * y) % 256) as u8]));
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&img)
        .unwrap();
    bytes
}

/// An image XObject stream wrapping an already-encoded JPEG payload.
fn jpeg_stream(width: u32, height: u32, payload: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        payload,
    )
}

/// Assemble a single-page document whose page draws every given image.
fn pdf_with_images(images: Vec<Stream>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let mut xobjects = Dictionary::new();
    let mut content = String::new();
    for (i, stream) in images.into_iter().enumerate() {
        let id = doc.add_object(stream);
        xobjects.set(format!("Im{i}"), id);
        content.push_str(&format!("q 200 0 0 200 {} 40 cm /Im{i} Do Q\n", 40 + i * 210));
    }

    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.into_bytes(),
    ));
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 1200.into(), 400.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "XObject" => xobjects },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn config(level: CompressionLevel) -> SqueezeConfig {
    SqueezeConfig::builder().level(level).build().unwrap()
}

/// Collect the decoded dimensions of every DCT image stream in a document.
fn dct_image_dimensions(bytes: &[u8]) -> Vec<(u32, u32)> {
    let doc = Document::load_mem(bytes).unwrap();
    let mut dims = Vec::new();
    for object in doc.objects.values() {
        if let Object::Stream(stream) = object {
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(|o| o.as_name())
                .is_ok_and(|n| n == b"Image");
            let is_dct = stream
                .filters()
                .is_ok_and(|chain| chain == vec![b"DCTDecode".as_slice()]);
            if is_image && is_dct {
                let img =
                    image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                        .unwrap();
                dims.push((img.width(), img.height()));
            }
        }
    }
    dims
}

fn assert_metrics_consistent(input: &[u8], outcome: &pdf_squeeze::SqueezeOutcome) {
    assert_eq!(outcome.stats.original_bytes, input.len() as u64);
    assert_eq!(outcome.stats.output_bytes, outcome.bytes.len() as u64);
    // Non-regression invariant holds for every input and level.
    assert!(outcome.bytes.len() <= input.len());
}

// ── Scenario 1: qualifying image shrinks ─────────────────────────────────────

#[tokio::test]
async fn qualifying_image_is_recompressed() {
    let payload = rgb_jpeg(600, 600, 95);
    assert!(
        payload.len() > 4 * MIN_CANDIDATE_BYTES,
        "fixture too small: {}",
        payload.len()
    );
    let input = pdf_with_images(vec![jpeg_stream(600, 600, payload)]);

    let outcome = compress(&input, &config(CompressionLevel::Recommended))
        .await
        .unwrap();

    assert!(outcome.bytes.len() < input.len());
    assert_eq!(outcome.stats.candidates, 1);
    assert_eq!(outcome.stats.optimized_images, 1);
    assert_eq!(outcome.stats.skipped_images, 0);
    assert!(!outcome.stats.rolled_back);
    assert_metrics_consistent(&input, &outcome);

    // The output is still a loadable document with one DCT image, and the
    // image kept its geometry (600 px fits inside the 1800 px cap).
    let dims = dct_image_dimensions(&outcome.bytes);
    assert_eq!(dims, vec![(600, 600)]);
}

// ── Scenario 2: below the size threshold ─────────────────────────────────────

#[tokio::test]
async fn tiny_image_leaves_document_untouched() {
    let payload = rgb_jpeg(40, 40, 50);
    assert!(
        payload.len() < MIN_CANDIDATE_BYTES,
        "fixture unexpectedly large: {}",
        payload.len()
    );
    let input = pdf_with_images(vec![jpeg_stream(40, 40, payload)]);

    let outcome = compress(&input, &config(CompressionLevel::Recommended))
        .await
        .unwrap();

    assert_eq!(outcome.bytes, input, "output must be byte-identical");
    assert_eq!(outcome.stats.candidates, 0);
    assert_eq!(outcome.stats.optimized_images, 0);
    assert!(!outcome.stats.rolled_back);
    assert_metrics_consistent(&input, &outcome);
}

// ── Scenario 3: transparency mask disqualifies ───────────────────────────────

#[tokio::test]
async fn smask_image_is_left_alone() {
    let mask_payload = gray_jpeg(40, 40, 50);
    let mask = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 40,
            "Height" => 40,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        mask_payload,
    );

    let mut doc_streams = Vec::new();
    let payload = rgb_jpeg(600, 600, 95);
    let mut main = jpeg_stream(600, 600, payload);
    // Reference id is irrelevant for the selector; the key's presence is.
    main.dict.set("SMask", Object::Reference((999, 0)));
    doc_streams.push(main);
    doc_streams.push(mask);

    let input = pdf_with_images(doc_streams);
    let outcome = compress(&input, &config(CompressionLevel::Recommended))
        .await
        .unwrap();

    assert_eq!(outcome.bytes, input, "output must be byte-identical");
    assert_eq!(outcome.stats.candidates, 0);
    assert_eq!(outcome.stats.optimized_images, 0);
    assert_metrics_consistent(&input, &outcome);
}

// ── Scenario 4: unparseable input ────────────────────────────────────────────

#[tokio::test]
async fn corrupt_buffer_fails_with_load_error() {
    let result = compress(&[0x42; 2048], &config(CompressionLevel::Recommended)).await;
    assert!(matches!(result, Err(SqueezeError::LoadFailed { .. })));
}

// ── Scenario 5: mixed documents commit only the safe winners ─────────────────

#[tokio::test]
async fn mixed_document_commits_only_qualifying_streams() {
    let smask_jpeg = rgb_jpeg(400, 400, 95);
    let smask_jpeg_copy = smask_jpeg.clone();

    let mut masked = jpeg_stream(400, 400, smask_jpeg);
    masked.dict.set("SMask", Object::Reference((999, 0)));

    let mut flate = jpeg_stream(400, 400, vec![0x5A; 20_000]);
    flate.dict.set("Filter", "FlateDecode");
    let flate_payload = vec![0x5A; 20_000];

    let input = pdf_with_images(vec![
        jpeg_stream(600, 600, rgb_jpeg(600, 600, 95)),
        jpeg_stream(500, 500, rgb_jpeg(500, 500, 95)),
        jpeg_stream(400, 400, rgb_jpeg(400, 400, 95)),
        masked,
        flate,
    ]);

    let outcome = compress(&input, &config(CompressionLevel::Recommended))
        .await
        .unwrap();

    assert_eq!(outcome.stats.candidates, 3);
    assert_eq!(outcome.stats.optimized_images, 3);
    assert!(!outcome.stats.rolled_back);
    assert!(outcome.bytes.len() < input.len());
    assert_metrics_consistent(&input, &outcome);

    // Safety invariant: the disqualified streams survive byte-identical
    // inside the rewritten document.
    let out_doc = Document::load_mem(&outcome.bytes).unwrap();
    let mut found_masked = false;
    let mut found_flate = false;
    for object in out_doc.objects.values() {
        if let Object::Stream(stream) = object {
            if stream.dict.has(b"SMask") {
                assert_eq!(stream.content, smask_jpeg_copy);
                found_masked = true;
            }
            if stream
                .filters()
                .is_ok_and(|chain| chain == vec![b"FlateDecode".as_slice()])
                && stream.dict.has(b"Subtype")
            {
                assert_eq!(stream.content, flate_payload);
                found_flate = true;
            }
        }
    }
    assert!(found_masked, "SMask stream missing from output");
    assert!(found_flate, "FlateDecode stream missing from output");
}

// ── Profile correctness ──────────────────────────────────────────────────────

#[tokio::test]
async fn extreme_level_caps_dimensions() {
    let input = pdf_with_images(vec![jpeg_stream(
        1600,
        800,
        rgb_jpeg(1600, 800, 95),
    )]);

    let outcome = compress(&input, &config(CompressionLevel::Extreme))
        .await
        .unwrap();

    assert_eq!(outcome.stats.optimized_images, 1);
    // Fit-inside: 1600×800 under a 900 px cap → 900×450.
    let dims = dct_image_dimensions(&outcome.bytes);
    assert_eq!(dims, vec![(900, 450)]);

    // The stream dictionary must agree with the payload.
    let out_doc = Document::load_mem(&outcome.bytes).unwrap();
    for object in out_doc.objects.values() {
        if let Object::Stream(stream) = object {
            if stream
                .dict
                .get(b"Subtype")
                .and_then(|o| o.as_name())
                .is_ok_and(|n| n == b"Image")
            {
                assert_eq!(
                    stream.dict.get(b"Width").and_then(Object::as_i64).unwrap(),
                    900
                );
                assert_eq!(
                    stream.dict.get(b"Height").and_then(Object::as_i64).unwrap(),
                    450
                );
                assert_eq!(
                    stream.dict.get(b"Length").and_then(Object::as_i64).unwrap(),
                    stream.content.len() as i64
                );
            }
        }
    }
}

#[tokio::test]
async fn extreme_is_smaller_than_less() {
    let input = pdf_with_images(vec![jpeg_stream(
        1200,
        1200,
        rgb_jpeg(1200, 1200, 95),
    )]);

    let extreme = compress(&input, &config(CompressionLevel::Extreme))
        .await
        .unwrap();
    let less = compress(&input, &config(CompressionLevel::Less))
        .await
        .unwrap();

    assert!(extreme.bytes.len() <= less.bytes.len());
}

// ── Idempotence-adjacent property ────────────────────────────────────────────

#[tokio::test]
async fn second_run_never_grows_the_output() {
    let input = pdf_with_images(vec![jpeg_stream(800, 800, rgb_jpeg(800, 800, 95))]);
    let cfg = config(CompressionLevel::Recommended);

    let first = compress(&input, &cfg).await.unwrap();
    assert!(first.bytes.len() < input.len());

    let second = compress(&first.bytes, &cfg).await.unwrap();
    assert!(second.bytes.len() <= first.bytes.len());
    assert_metrics_consistent(&first.bytes, &second);
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn inspect_census_matches_selector() {
    let mut masked = jpeg_stream(400, 400, rgb_jpeg(400, 400, 95));
    masked.dict.set("SMask", Object::Reference((999, 0)));

    let big = rgb_jpeg(600, 600, 95);
    let big_len = big.len();
    let input = pdf_with_images(vec![
        jpeg_stream(600, 600, big),
        jpeg_stream(40, 40, rgb_jpeg(40, 40, 50)),
        masked,
    ]);

    let report = inspect(&input).await.unwrap();
    assert_eq!(report.image_streams, 3);
    assert_eq!(report.candidates, 1);
    assert_eq!(report.candidate_bytes, big_len as u64);
}

#[tokio::test]
async fn inspect_on_garbage_is_load_error() {
    assert!(matches!(
        inspect(b"not a pdf").await,
        Err(SqueezeError::LoadFailed { .. })
    ));
}

// ── Gray images keep their colorspace ────────────────────────────────────────

#[tokio::test]
async fn gray_image_stays_devicegray() {
    let gray = gray_jpeg(700, 700, 95);
    assert!(gray.len() > MIN_CANDIDATE_BYTES);
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 700,
            "Height" => 700,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        gray,
    );
    let input = pdf_with_images(vec![stream]);

    let outcome = compress(&input, &config(CompressionLevel::Recommended))
        .await
        .unwrap();
    assert_eq!(outcome.stats.optimized_images, 1);

    let out_doc = Document::load_mem(&outcome.bytes).unwrap();
    let gray_streams = out_doc
        .objects
        .values()
        .filter_map(|o| o.as_stream().ok())
        .filter(|s| {
            s.dict
                .get(b"ColorSpace")
                .and_then(|o| o.as_name())
                .is_ok_and(|n| n == b"DeviceGray")
        })
        .count();
    assert_eq!(gray_streams, 1);
}
