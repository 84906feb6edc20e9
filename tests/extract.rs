mod common;

use common::PngBuilder;
use prompt_meta::{extract, scan, Dialect, ScanError};

const A1111_PARAMETERS: &str = "A cat\nNegative prompt: blurry\nSteps: 20, Sampler: Euler";

#[test]
fn no_text_chunks_is_none() {
    let png = PngBuilder::new().idat().finish();
    assert_eq!(extract(&png), None);
}

#[test]
fn unrelated_text_chunks_is_none() {
    let png = PngBuilder::new()
        .text("Software", "paint.net")
        .text("Author", "someone")
        .idat()
        .finish();
    assert_eq!(extract(&png), None);
}

#[test]
fn prompt_record_is_verbatim() {
    let workflow = r#"{"3": {"class_type": "KSampler", "inputs": {"seed": 42}}}"#;
    let png = PngBuilder::new().text("prompt", workflow).idat().finish();

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, workflow);
    assert_eq!(meta.negative_prompt, None);
    assert_eq!(meta.dialect, Dialect::Prompt);
}

#[test]
fn parameters_record_is_split() {
    let png = PngBuilder::new()
        .text("parameters", A1111_PARAMETERS)
        .idat()
        .finish();

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, "A cat");
    assert_eq!(meta.negative_prompt.as_deref(), Some("blurry"));
    assert_eq!(meta.parameters.as_deref(), Some("Steps: 20, Sampler: Euler"));
    assert_eq!(meta.dialect, Dialect::Parameters);
}

#[test]
fn parameters_wins_regardless_of_order() {
    let before = PngBuilder::new()
        .text("parameters", A1111_PARAMETERS)
        .text("prompt", "{}")
        .finish();
    let after = PngBuilder::new()
        .text("prompt", "{}")
        .idat()
        .text("parameters", A1111_PARAMETERS)
        .finish();

    let before = extract(&before).unwrap();
    let after = extract(&after).unwrap();
    assert_eq!(before.prompt, "A cat");
    assert_eq!(before, after);
}

#[test]
fn parameters_without_prompt_blocks_prompt_record() {
    let first = PngBuilder::new()
        .text("parameters", "Steps: 20, Sampler: Euler")
        .text("prompt", "a dog")
        .finish();
    let last = PngBuilder::new()
        .text("prompt", "a dog")
        .text("parameters", "Negative prompt: blurry\nSteps: 20")
        .finish();

    assert_eq!(extract(&first), None);
    assert_eq!(extract(&last), None);
}

#[test]
fn truncated_file_keeps_earlier_records() {
    let mut png = PngBuilder::new()
        .text("prompt", "a lighthouse at night")
        .idat()
        .finish();
    // Cut into the IDAT payload.
    png.truncate(png.len() - 20);

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, "a lighthouse at night");

    let report = scan(&png);
    assert!(report.truncated());
}

#[test]
fn truncated_length_field_does_not_panic() {
    let mut png = PngBuilder::new().text("prompt", "a fox").into_bytes();
    png.extend_from_slice(&0x7FFF_FFFFu32.to_be_bytes());
    png.extend_from_slice(b"tEXt");
    png.extend_from_slice(b"parameters\0only part");

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, "a fox");
    assert_eq!(meta.dialect, Dialect::Prompt);
}

#[test]
fn every_prefix_of_a_file_is_safe() {
    let png = PngBuilder::new()
        .text("parameters", A1111_PARAMETERS)
        .itxt("prompt", "", "", "{}")
        .idat()
        .finish();

    for len in 0..=png.len() {
        let _ = extract(&png[..len]);
        let _ = scan(&png[..len]);
    }
}

#[test]
fn wrong_signature_is_none() {
    let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    assert_eq!(extract(&jpeg), None);
    assert_eq!(extract(&[]), None);
    assert_eq!(extract(b"parameters\0A cat"), None);

    let report = scan(&jpeg);
    assert_eq!(report.errors, vec![ScanError::FormatMismatch]);
}

#[test]
fn records_after_iend_are_ignored() {
    let mut png = PngBuilder::new().idat().finish();
    let tail = PngBuilder::new().text("parameters", A1111_PARAMETERS).into_bytes();
    // Skip the signature and IHDR of the second stream.
    png.extend_from_slice(&tail[8 + 25..]);

    assert_eq!(extract(&png), None);
}

#[test]
fn round_trip_multiline_parameters() {
    let value = "portrait of a knight,\ndramatic lighting\n\
                 Negative prompt: lowres,\nbad anatomy\n\
                 Steps: 30, Sampler: DPM++ 2M Karras, CFG scale: 6.5, Seed: 1234\n\
                 Model: sd_xl_base_1.0";
    let png = PngBuilder::new().text("parameters", value).idat().finish();

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, "portrait of a knight,\ndramatic lighting");
    assert_eq!(meta.negative_prompt.as_deref(), Some("lowres,\nbad anatomy"));
    assert_eq!(
        meta.parameters.as_deref(),
        Some("Steps: 30, Sampler: DPM++ 2M Karras, CFG scale: 6.5, Seed: 1234\nModel: sd_xl_base_1.0")
    );
}

#[test]
fn parameters_without_markers_is_whole_prompt() {
    let png = PngBuilder::new()
        .text("parameters", "\n  a watercolor city skyline, evening  \n")
        .finish();

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, "a watercolor city skyline, evening");
    assert_eq!(meta.negative_prompt, None);
    assert_eq!(meta.parameters, None);
}

#[test]
fn itxt_and_text_normalize_identically() {
    let text = PngBuilder::new().text("parameters", A1111_PARAMETERS).finish();
    let itxt = PngBuilder::new()
        .itxt("parameters", "en-US", "Parameters", A1111_PARAMETERS)
        .finish();

    assert_eq!(extract(&text), extract(&itxt));
    assert!(extract(&itxt).is_some());
}

#[test]
fn itxt_utf8_prompt() {
    let png = PngBuilder::new().itxt("prompt", "zh", "", "夜晚的燈塔, 海浪").finish();
    assert_eq!(extract(&png).unwrap().prompt, "夜晚的燈塔, 海浪");
}

#[test]
fn malformed_text_chunk_is_skipped() {
    let png = PngBuilder::new()
        .chunk(b"tEXt", b"parameters without separator")
        .text("prompt", "a dog")
        .finish();

    let meta = extract(&png).unwrap();
    assert_eq!(meta.prompt, "a dog");

    let report = scan(&png);
    assert_eq!(report.records.len(), 1);
    assert!(matches!(
        report.errors.as_slice(),
        [ScanError::UndecodableText { .. }]
    ));
}
