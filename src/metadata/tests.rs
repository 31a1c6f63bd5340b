//! Unit tests for composite metadata encoding.

use rstest::rstest;

use super::*;
use crate::frame::FrameError;

#[rstest]
#[case::cbor("application/cbor", WellKnownMimeType::ApplicationCbor)]
#[case::routing("message/x.rsocket.routing.v0", WellKnownMimeType::Routing)]
#[case::composite(
    "message/x.rsocket.composite-metadata.v0",
    WellKnownMimeType::CompositeMetadata
)]
fn well_known_mime_types_resolve(#[case] text: &str, #[case] expected: WellKnownMimeType) {
    assert_eq!(MimeType::parse(text), Ok(MimeType::WellKnown(expected)));
    assert_eq!(WellKnownMimeType::from_id(expected.id()), Some(expected));
}

#[test]
fn unknown_mime_type_is_custom() {
    assert_eq!(
        MimeType::parse("application/x.flowprobe"),
        Ok(MimeType::Custom("application/x.flowprobe".into()))
    );
}

#[rstest]
#[case::empty(String::new())]
#[case::non_ascii("application/sn\u{f6}".to_owned())]
#[case::too_long("a".repeat(MAX_CUSTOM_MIME_LENGTH + 1))]
fn invalid_custom_mime_types_are_rejected(#[case] mime: String) {
    assert!(matches!(
        MimeType::parse(&mime),
        Err(FrameError::InvalidMime { .. })
    ));
}

#[test]
fn routing_tags_are_length_prefixed_in_order() {
    let tags = RoutingTags::new(["a", "bc"]).expect("valid tags");
    assert_eq!(&tags.encode()[..], b"\x01a\x02bc");
}

#[rstest]
#[case::empty(String::new(), 0)]
#[case::too_long("x".repeat(MAX_TAG_LENGTH + 1), MAX_TAG_LENGTH + 1)]
fn routing_tag_length_is_bounded(#[case] tag: String, #[case] len: usize) {
    assert_eq!(RoutingTags::new([tag]), Err(FrameError::InvalidTag { len }));
}

#[test]
fn longest_routing_tag_is_accepted() {
    let tag = "x".repeat(MAX_TAG_LENGTH);
    let encoded = RoutingTags::new([tag]).expect("valid tag").encode();
    assert_eq!(encoded[0], 0xFF);
    assert_eq!(encoded.len(), MAX_TAG_LENGTH + 1);
}

#[test]
fn custom_entry_carries_mime_string() {
    let mut metadata = CompositeMetadata::new();
    metadata
        .push(&MimeType::Custom("x/y".into()), b"hi")
        .expect("entry fits");
    assert_eq!(&metadata.freeze()[..], b"\x02x/y\x00\x00\x02hi");
}

#[test]
fn entries_are_concatenated() {
    let mut metadata = CompositeMetadata::new();
    metadata
        .push(&WellKnownMimeType::TextPlain.into(), b"a")
        .expect("entry fits")
        .push(&WellKnownMimeType::ApplicationJson.into(), b"")
        .expect("entry fits");
    assert_eq!(metadata.len(), 5 + 4);
    assert_eq!(&metadata.freeze()[..], b"\xA1\x00\x00\x01a\x85\x00\x00\x00");
}

#[test]
fn routing_entry_uses_well_known_id() {
    let tags = RoutingTags::new(["channel"]).expect("valid tag");
    let metadata = CompositeMetadata::routing(&tags).expect("entry fits");
    assert!(!metadata.is_empty());
    let bytes = metadata.freeze();
    assert_eq!(bytes[0], 0x80 | 0x7E);
    assert_eq!(&bytes[1..4], &[0, 0, 8]);
    assert_eq!(&bytes[4..], b"\x07channel");
}

#[rstest]
#[case::empty(String::new())]
#[case::too_long("a".repeat(300))]
#[case::non_ascii("text/\u{e9}".to_owned())]
fn unvalidated_custom_mime_is_rejected_on_push(#[case] mime: String) {
    let mut metadata = CompositeMetadata::new();
    let result = metadata.push(&MimeType::Custom(mime), b"content");
    assert!(matches!(result, Err(FrameError::InvalidMime { .. })));
    assert!(metadata.is_empty());
}

#[test]
fn longest_custom_mime_encodes_its_length_minus_one() {
    let mime = "a".repeat(MAX_CUSTOM_MIME_LENGTH);
    let mut metadata = CompositeMetadata::new();
    metadata
        .push(&MimeType::Custom(mime), b"")
        .expect("valid custom mime");
    let encoded = metadata.freeze();
    assert_eq!(encoded[0], 127);
    assert_eq!(encoded.len(), 1 + MAX_CUSTOM_MIME_LENGTH + 3);
}
