// src/tests/text_tests.rs

//! tests for `text.rs`

#![allow(non_snake_case)]

use ::test_case::test_case;

use crate::common::Bytes;
use crate::data::text::{
    collapse_whitespace,
    decode_text_span,
    harvest_utf16_strings,
    scan_organizer_email,
    strip_trailing_noise,
};
use crate::tests::common::{splice, utf16le_bytes};

#[test_case("Weekly Sync"; "ascii")]
#[test_case("週會"; "cjk")]
#[test_case("Q3 規劃 review"; "mixed")]
fn test_decode_text_span_plain(subject: &str) {
    let bytes: Bytes = utf16le_bytes(subject);
    assert_eq!(decode_text_span(&bytes), Some(subject.to_string()));
}

#[test]
fn test_decode_text_span_truncates_at_control() {
    // a control code unit is a field boundary, not content
    let mut bytes: Bytes = utf16le_bytes("Budget");
    bytes.extend_from_slice(&[0x01, 0x00]);
    bytes.extend_from_slice(&utf16le_bytes("Trailing"));
    assert_eq!(decode_text_span(&bytes), Some("Budget".to_string()));
}

#[test]
fn test_decode_text_span_maps_line_breaks() {
    let bytes: Bytes = utf16le_bytes("A\r\nB");
    assert_eq!(decode_text_span(&bytes), Some("A  B".to_string()));
    let bytes: Bytes = utf16le_bytes("A\tB");
    assert_eq!(decode_text_span(&bytes), Some("A B".to_string()));
}

#[test]
fn test_decode_text_span_drops_lone_surrogate() {
    // 0xd800 is an unpaired high surrogate; dropped, not a boundary
    let mut bytes: Bytes = utf16le_bytes("AB");
    bytes.extend_from_slice(&[0x00, 0xd8]);
    bytes.extend_from_slice(&utf16le_bytes("CD"));
    assert_eq!(decode_text_span(&bytes), Some("ABCD".to_string()));
}

#[test_case(&[] ; "empty")]
#[test_case(&[0x41] ; "one byte")]
#[test_case(&[0x00, 0x00] ; "nul")]
#[test_case(&[0x20, 0x00, 0x20, 0x00] ; "only whitespace")]
fn test_decode_text_span_no_text(bytes: &[u8]) {
    assert_eq!(decode_text_span(bytes), None);
}

#[test]
fn test_trailing_noise_run_of_three_stripped() {
    let mut bytes: Bytes = utf16le_bytes("Team Sync");
    bytes.extend_from_slice(&utf16le_bytes("\u{0301}\u{0301}\u{0301}"));
    assert_eq!(decode_text_span(&bytes), Some("Team Sync".to_string()));
}

#[test]
fn test_trailing_noise_run_of_two_kept() {
    let bytes: Bytes = utf16le_bytes("ab\u{0301}\u{0301}");
    assert_eq!(decode_text_span(&bytes), Some("ab\u{0301}\u{0301}".to_string()));
}

#[test_case("abc\u{0101}\u{0102}\u{0103}", "abc"; "latin extended run")]
#[test_case("abc∞∞∞", "abc"; "junk run")]
#[test_case("abc∞∞", "abc∞∞"; "junk run too short")]
#[test_case("中文會議", "中文會議"; "cjk untouched")]
fn test_strip_trailing_noise(
    input: &str,
    expect: &str,
) {
    assert_eq!(strip_trailing_noise(input), expect);
}

#[test_case("a  b\t c", "a b c")]
#[test_case("  lead and trail  ", "lead and trail")]
fn test_collapse_whitespace(
    input: &str,
    expect: &str,
) {
    assert_eq!(collapse_whitespace(input), expect);
}

#[test]
fn test_harvest_finds_separated_runs() {
    let mut buffer: Bytes = vec![0u8; 0x100];
    splice(&mut buffer, 0x10, &utf16le_bytes("Project Review"));
    splice(&mut buffer, 0x60, &utf16le_bytes("Room 401"));
    let candidates = harvest_utf16_strings(&buffer);
    assert!(candidates.contains(&"Project Review".to_string()), "candidates: {:?}", candidates);
    assert!(candidates.contains(&"Room 401".to_string()), "candidates: {:?}", candidates);
    // buffer order
    let first = candidates
        .iter()
        .position(|c| c == "Project Review")
        .unwrap();
    let second = candidates
        .iter()
        .position(|c| c == "Room 401")
        .unwrap();
    assert!(first < second);
}

#[test]
fn test_harvest_deduplicates() {
    let mut buffer: Bytes = vec![0u8; 0x100];
    splice(&mut buffer, 0x10, &utf16le_bytes("Standup"));
    splice(&mut buffer, 0x60, &utf16le_bytes("Standup"));
    let candidates = harvest_utf16_strings(&buffer);
    let count = candidates
        .iter()
        .filter(|c| c.as_str() == "Standup")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_harvest_skips_short_runs() {
    let mut buffer: Bytes = vec![0u8; 0x40];
    splice(&mut buffer, 0x10, &utf16le_bytes("ab"));
    let candidates = harvest_utf16_strings(&buffer);
    assert!(candidates.is_empty(), "candidates: {:?}", candidates);
}

#[test]
fn test_harvest_empty_buffer() {
    assert!(harvest_utf16_strings(&[]).is_empty());
}

#[test]
fn test_organizer_email_first_match() {
    let buffer = b"junk alice@example.com more bob@example.org";
    assert_eq!(
        scan_organizer_email(buffer),
        Some("alice@example.com".to_string())
    );
}

#[test]
fn test_organizer_email_skips_no_reply() {
    let buffer = b"no-reply@calendar.example.com then carol@example.com";
    assert_eq!(
        scan_organizer_email(buffer),
        Some("carol@example.com".to_string())
    );
}

#[test]
fn test_organizer_email_none() {
    assert_eq!(scan_organizer_email(b"nothing to see here"), None);
}
