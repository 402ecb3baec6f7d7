mod common;

use common::SwfBuilder;
use swftriage_core::model::{codes, TagRecord};
use swftriage_core::swf::{decode_tag, parse_swf, FrameRect, SwfCompression, SwfError};

#[test]
fn parses_uncompressed_header_and_tags() {
    let bytes = SwfBuilder::new().name_character(3, "logo").symbol_class(&[(0, "Main")]).fws();
    let swf = parse_swf(&bytes).expect("parse");

    assert_eq!(swf.header.signature, "FWS");
    assert_eq!(swf.header.compression, SwfCompression::None);
    assert_eq!(swf.header.version, 10);
    assert_eq!(swf.header.file_length as usize, bytes.len());
    assert_eq!(
        swf.header.frame_size,
        FrameRect { x_min: 0, x_max: 11000, y_min: 0, y_max: 8000 }
    );
    assert_eq!(swf.header.frame_rate, 24.0);
    assert_eq!(swf.header.frame_count, 1);

    let codes: Vec<u16> = swf.tags.iter().map(|t| t.code).collect();
    assert_eq!(codes, vec![codes::NAME_CHARACTER, codes::SYMBOL_CLASS, codes::END]);
}

#[test]
fn zlib_body_is_expanded() {
    let builder = SwfBuilder::new().define_binary_data(4, &[0xAB; 200]);
    let swf = parse_swf(&builder.cws()).expect("parse");
    assert_eq!(swf.header.compression, SwfCompression::Zlib);
    assert_eq!(swf.tags, parse_swf(&builder.fws()).unwrap().tags);

    match decode_tag(&swf.tags[0]).unwrap() {
        TagRecord::DefineBinaryData { character_id, data } => {
            assert_eq!(character_id, 4);
            assert_eq!(data, vec![0xAB; 200]);
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn lzma_body_is_expanded() {
    let zws = include_bytes!("fixtures/lzma_movie.swf");
    let swf = parse_swf(zws).expect("parse");
    assert_eq!(swf.header.compression, SwfCompression::Lzma);
    assert_eq!(swf.header.version, 13);
    assert_eq!(swf.header.frame_count, 1);

    let twin = SwfBuilder::new()
        .symbol_class(&[(0, "Main")])
        .define_binary_data(1, &b"embedded via lzma ".repeat(8))
        .fws();
    assert_eq!(swf.tags, parse_swf(&twin).unwrap().tags);
}

#[test]
fn lzma_header_without_properties_is_too_short() {
    assert!(matches!(parse_swf(b"ZWS\x0d\x20\x00\x00\x00\x01\x00"), Err(SwfError::TooShort(10))));
}

#[test]
fn rejects_unknown_signature_and_short_input() {
    assert!(matches!(parse_swf(b"GIF89a\x01\x00\x01\x00"), Err(SwfError::BadSignature(sig)) if sig == "GIF"));
    assert!(matches!(parse_swf(b"FWS"), Err(SwfError::TooShort(3))));
}

#[test]
fn corrupt_zlib_body_is_a_decompression_error() {
    let mut bytes = b"CWS\x0a\x00\x01\x00\x00".to_vec();
    bytes.extend_from_slice(b"this is not deflate");
    assert!(matches!(
        parse_swf(&bytes),
        Err(SwfError::Decompress { compression: SwfCompression::Zlib, .. })
    ));
}

#[test]
fn truncated_tag_stream_keeps_leading_records() {
    let mut bytes = SwfBuilder::new().name_character(1, "a").fws();
    // Drop the End tag and append a record header promising more than remains.
    bytes.truncate(bytes.len() - 2);
    bytes.extend_from_slice(&[0xC5, 0x15, 0x00]);
    let swf = parse_swf(&bytes).expect("parse");
    assert_eq!(swf.tags.len(), 1);
    assert_eq!(swf.tags[0].code, codes::NAME_CHARACTER);
}
