// src/data/html.rs

//! Locate and mine the UTF-16LE HTML block embedded in an event file.
//!
//! Most event files carry an HTML rendering of the invitation body. It is
//! mined three ways: a `itemprop="name"` span or `<title>` element as a
//! subject/location fallback, and the tag-stripped text as the body.

use ::lazy_static::lazy_static;
use ::memchr::memmem;
use ::quick_xml::escape::unescape_with;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

use crate::common::BufOffset;
use crate::data::text::{collapse_whitespace, is_cjk};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// block location
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `<html` encoded UTF-16LE.
pub const HTML_OPEN_UTF16LE: &[u8] = &[
    0x3c, 0x00, 0x68, 0x00, 0x74, 0x00, 0x6d, 0x00, 0x6c, 0x00,
];
/// `</html>` encoded UTF-16LE.
pub const HTML_CLOSE_UTF16LE: &[u8] = &[
    0x3c, 0x00, 0x2f, 0x00, 0x68, 0x00, 0x74, 0x00, 0x6d, 0x00, 0x6c, 0x00, 0x3e, 0x00,
];

/// Decode the embedded `<html` … `</html>` region, if any.
///
/// The decoded string is cut just past the first `</html>`; bytes after
/// the closer belong to other fields.
pub fn extract_html_block(buffer: &[u8]) -> Option<String> {
    defn!("(buffer len {})", buffer.len());
    let open: BufOffset = memmem::find(buffer, HTML_OPEN_UTF16LE)?;
    let close_rel: BufOffset = memmem::find(&buffer[open..], HTML_CLOSE_UTF16LE)?;
    let end: BufOffset = open + close_rel + HTML_CLOSE_UTF16LE.len();
    let (decoded, _had_errors) =
        ::encoding_rs::UTF_16LE.decode_without_bom_handling(&buffer[open..end]);
    let mut html: String = decoded.into_owned();
    if let Some(pos) = html.find("</html>") {
        html.truncate(pos + "</html>".len());
    }
    defx!("return html block of {} chars (bytes 0x{:x}..0x{:x})", html.len(), open, end);

    Some(html)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// metadata candidates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

lazy_static! {
    /// Calendar invitations from standard producers carry the event name
    /// in a schema.org `itemprop="name"` span.
    static ref RE_META_NAME: Regex =
        Regex::new(r#"(?i)<span[^>]*itemprop="name"[^>]*>([^<]+)</span>"#).unwrap();
    static ref RE_TITLE: Regex = Regex::new(r"(?i)<title>([^<]+)</title>").unwrap();
    static ref RE_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref RE_BLANK_LINES: Regex = Regex::new(r"\n\s*\n").unwrap();
    static ref RE_HORIZONTAL_WS: Regex = Regex::new(r"[ \t]+").unwrap();
    /// Junk prefixes seen in real bodies: a leading CSS comment block or a
    /// `BM_BEGIN`…`BM_END` bookmark wrapper.
    static ref RE_PREFIX_COMMENT: Regex = Regex::new(r"(?s)^/\*.*?\*/").unwrap();
    static ref RE_PREFIX_BOOKMARK: Regex = Regex::new(r"(?s)^BM_BEGIN.*?BM_END").unwrap();
}

/// Minimum character count for a subject-tier metadata candidate.
const META_SUBJECT_MIN_CHARS: usize = 3;
/// Minimum character count for a location-tier metadata candidate.
const META_LOCATION_MIN_CHARS: usize = 2;

/// Keep printable and CJK characters of an already-decoded markup
/// fragment; CR/LF/TAB become spaces, anything else is dropped.
fn clean_fragment(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter_map(|c| match c {
            '\r' | '\n' | '\t' => Some(' '),
            _ if is_cjk(c) => Some(c),
            _ if !c.is_control() && c != '\u{fffd}' && c != '\u{feff}' => Some(c),
            _ => None,
        })
        .collect();

    collapse_whitespace(&kept)
}

/// Subject candidate from markup metadata: the first cleaned
/// `itemprop="name"` span, else the first cleaned `<title>`, of at least
/// [`META_SUBJECT_MIN_CHARS`] characters.
pub fn html_subject_candidate(html: &str) -> Option<String> {
    defñ!();
    for re in [&*RE_META_NAME, &*RE_TITLE] {
        for caps in re.captures_iter(html) {
            let cleaned: String = clean_fragment(&caps[1]);
            if cleaned.chars().count() >= META_SUBJECT_MIN_CHARS {
                return Some(cleaned);
            }
        }
    }

    None
}

/// Location candidate from markup metadata: the first cleaned
/// `itemprop="name"` span of at least [`META_LOCATION_MIN_CHARS`]
/// characters.
pub fn html_location_candidate(html: &str) -> Option<String> {
    defñ!();
    for caps in RE_META_NAME.captures_iter(html) {
        let cleaned: String = clean_fragment(&caps[1]);
        if cleaned.chars().count() >= META_LOCATION_MIN_CHARS {
            return Some(cleaned);
        }
    }

    None
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// body text
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Minimum character count for a body; shorter results are markup residue.
const BODY_MIN_CHARS: usize = 10;

/// Named entities beyond the XML predefined five that show up in
/// real-world invitation bodies.
fn resolve_body_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some(" "),
        _ => None,
    }
}

/// Derive body text from a decoded HTML block: strip tags, unescape
/// entities, normalize line endings, collapse whitespace, drop junk
/// prefixes. Returns `None` when fewer than [`BODY_MIN_CHARS`] characters
/// remain.
pub fn html_body_text(html: &str) -> Option<String> {
    defn!("({} chars of html)", html.len());
    let stripped: String = RE_TAG
        .replace_all(html, "")
        .into_owned();
    // best-effort: a malformed entity leaves the text as-is
    let unescaped: String = match unescape_with(&stripped, resolve_body_entity) {
        Ok(cow) => cow.into_owned(),
        Err(_err) => stripped,
    };
    let text: String = unescaped
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let text: String = RE_BLANK_LINES
        .replace_all(&text, "\n\n")
        .into_owned();
    let text: String = RE_HORIZONTAL_WS
        .replace_all(&text, " ")
        .into_owned();
    let text: &str = text.trim();
    if text.chars().count() < BODY_MIN_CHARS {
        defx!("return None; {} chars after cleanup", text.chars().count());
        return None;
    }
    let text: String = RE_PREFIX_COMMENT
        .replace(text, "")
        .into_owned();
    let text: String = RE_PREFIX_BOOKMARK
        .replace(&text, "")
        .into_owned();
    let text: &str = text.trim();
    if text.chars().count() < BODY_MIN_CHARS {
        defx!("return None; {} chars after prefix strip", text.chars().count());
        return None;
    }
    defx!("return body of {} chars", text.chars().count());

    Some(text.to_string())
}
