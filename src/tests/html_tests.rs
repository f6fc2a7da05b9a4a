// src/tests/html_tests.rs

//! tests for `html.rs`

#![allow(non_snake_case)]

use ::test_case::test_case;

use crate::common::Bytes;
use crate::data::html::{
    extract_html_block,
    html_body_text,
    html_location_candidate,
    html_subject_candidate,
};
use crate::tests::common::{splice, utf16le_bytes};

#[test]
fn test_extract_html_block() {
    let mut buffer: Bytes = vec![0u8; 0x200];
    splice(&mut buffer, 0x40, &utf16le_bytes("<html><body>Hello there</body></html>"));
    let html: String = extract_html_block(&buffer).unwrap();
    assert_eq!(html, "<html><body>Hello there</body></html>");
}

#[test]
fn test_extract_html_block_cut_at_first_closer() {
    let mut buffer: Bytes = vec![0u8; 0x200];
    splice(
        &mut buffer,
        0x40,
        &utf16le_bytes("<html>first</html>residue</html>"),
    );
    let html: String = extract_html_block(&buffer).unwrap();
    assert_eq!(html, "<html>first</html>");
}

#[test]
fn test_extract_html_block_absent() {
    assert_eq!(extract_html_block(&[0u8; 0x80]), None);
    // an opener without a closer is not a block
    let mut buffer: Bytes = vec![0u8; 0x80];
    splice(&mut buffer, 0x10, &utf16le_bytes("<html><body>unterminated"));
    assert_eq!(extract_html_block(&buffer), None);
}

#[test_case(
    r#"<html><span class="x" itemprop="name">Board Meeting</span></html>"#,
    Some("Board Meeting");
    "itemprop name span"
)]
#[test_case(
    "<html><head><title>Budget Review</title></head></html>",
    Some("Budget Review");
    "title fallback"
)]
#[test_case(
    r#"<html><span itemprop="name">ab</span><title>Planning Session</title></html>"#,
    Some("Planning Session");
    "short span skipped for title"
)]
#[test_case("<html><body>nothing tagged</body></html>", None; "no metadata")]
fn test_html_subject_candidate(
    html: &str,
    expect: Option<&str>,
) {
    assert_eq!(html_subject_candidate(html).as_deref(), expect);
}

#[test]
fn test_html_location_candidate_span_only() {
    // a title never supplies the location tier
    let html = "<html><title>Budget Review</title></html>";
    assert_eq!(html_location_candidate(html), None);
    let html = r#"<html><span itemprop="name">B1</span></html>"#;
    assert_eq!(html_location_candidate(html).as_deref(), Some("B1"));
}

#[test]
fn test_html_body_text_strips_and_collapses() {
    let html = "<html><body><p>Please  join the\r\nquarterly   review.</p></body></html>";
    assert_eq!(
        html_body_text(html).as_deref(),
        Some("Please join the\nquarterly review.")
    );
}

#[test]
fn test_html_body_text_unescapes_entities() {
    let html = "<html><body>Q&amp;A session results &gt; expectations&nbsp;overall</body></html>";
    assert_eq!(
        html_body_text(html).as_deref(),
        Some("Q&A session results > expectations overall")
    );
}

#[test_case("<html><p>Hi</p></html>"; "too short")]
#[test_case("<html><br/><br/></html>"; "tags only")]
fn test_html_body_text_discards_short(html: &str) {
    assert_eq!(html_body_text(html), None);
}

#[test]
fn test_html_body_text_drops_comment_prefix() {
    let html = "<html>/* css residue */Meeting notes will be shared afterwards.</html>";
    assert_eq!(
        html_body_text(html).as_deref(),
        Some("Meeting notes will be shared afterwards.")
    );
}
