// src/data/text.rs

//! Decode and clean UTF-16LE text spans carved from event-file buffers,
//! and harvest candidate strings when no structural marker is available.
//!
//! The proprietary format stores its text fields as UTF-16LE with no
//! terminators; field boundaries are implied by length prefixes or by the
//! first disallowed character. Decoding here is therefore lossy and
//! truncating: [`decode_text_span`] stops at the first character that is
//! neither printable nor CJK, treating it as the end of the field.
//!
//! [`decode_text_span`]: self::decode_text_span

use ::encoding_rs::UTF_16LE;
use ::lazy_static::lazy_static;
#[allow(unused_imports)]
use ::more_asserts::{
    assert_ge,
    assert_le,
    debug_assert_ge,
    debug_assert_le,
    debug_assert_lt,
};
use ::regex::bytes::Regex as BytesRegex;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

use crate::common::BufOffset;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// character classes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Is `c` within CJK Unified Ideographs or CJK Extension-A?
pub const fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}

/// Is `c` printable text, as far as field content is concerned?
///
/// Control codes end a field. A few zero-width/format characters are
/// excluded with them; they appear as padding between fields.
fn is_keepable_char(c: char) -> bool {
    !c.is_control()
        && !matches!(
            c,
            '\u{200b}'..='\u{200f}' | '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffd}'
        )
}

lazy_static! {
    /// Trailing run (length >= 3) of combining-diacritic or Latin-Extended
    /// codepoints; decode residue at span ends.
    static ref RE_TRAIL_COMBINING: Regex =
        Regex::new(r"[\x{0100}-\x{017f}\x{0300}-\x{036f}]{3,}$").unwrap();
    /// Trailing run (length >= 3) of anything that is not a word
    /// character, whitespace, CJK, or common punctuation.
    static ref RE_TRAIL_JUNK: Regex = Regex::new(
        r#"[^\w\s\x{4e00}-\x{9fff}\[\]()（）【】《》「」『』〈〉“”‘’.,!?;:：；，。！？-]{3,}$"#
    )
    .unwrap();
    /// Any run of whitespace.
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    /// A conventional email address, matched over raw bytes.
    static ref RE_EMAIL: BytesRegex =
        BytesRegex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
}

/// Organizer addresses with this prefix are automated senders, not people.
const NO_REPLY_PREFIX: &str = "no-reply";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UTF-16LE span decoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Decode `bytes` as UTF-16LE, dropping undecodable code units and any
/// byte-order-mark.
fn decode_utf16le_lossy(bytes: &[u8]) -> String {
    let (decoded, _had_errors) = UTF_16LE.decode_without_bom_handling(bytes);

    decoded
        .chars()
        .filter(|c| !matches!(c, '\u{fffd}' | '\u{feff}'))
        .collect()
}

/// Decode a carved byte span into cleaned field text.
///
/// Decoding truncates at the first character that is neither printable nor
/// CJK; such a character is a field boundary, not content. Carriage
/// return, line feed, and tab become a single space. After truncation,
/// trailing noise runs are stripped (see [`strip_trailing_noise`]).
///
/// Returns `None` when fewer than one character survives; "no text" is an
/// expected outcome for a misidentified span, not an error.
pub fn decode_text_span(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 2 {
        return None;
    }
    let decoded: String = decode_utf16le_lossy(bytes);
    let mut kept = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        match c {
            '\r' | '\n' | '\t' => kept.push(' '),
            _ if is_keepable_char(c) || is_cjk(c) => kept.push(c),
            // field boundary
            _ => break,
        }
    }
    let cleaned: String = strip_trailing_noise(kept.trim());
    let cleaned: &str = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    Some(cleaned.to_string())
}

/// Strip trailing noise runs: length >= 3 of combining/Latin-Extended
/// codepoints, or length >= 3 of characters outside word/whitespace/CJK/
/// common punctuation. Runs of length <= 2 are left untouched.
pub fn strip_trailing_noise(text: &str) -> String {
    let text: String = RE_TRAIL_COMBINING
        .replace(text, "")
        .into_owned();
    let text: String = RE_TRAIL_JUNK
        .replace(&text, "")
        .into_owned();

    text.trim().to_string()
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE
        .replace_all(text, " ")
        .trim()
        .to_string()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// fallback string harvesting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cap on candidates collected by the loose harvesting pass.
const HARVEST_CAP_LOOSE: usize = 15;
/// Cap on total collected candidates across both passes; bounds scan cost.
const HARVEST_CAP: usize = 20;
/// Minimum character count for a harvested candidate.
const HARVEST_MIN_CHARS: usize = 3;

/// Scan the whole buffer for runs that look like UTF-16LE text and return
/// cleaned candidate strings, in buffer order, deduplicated, capped at
/// [`HARVEST_CAP`].
///
/// Two passes. The first accepts any 2-byte-aligned run whose even bytes
/// are non-zero and odd bytes zero, ending at the first even byte of zero.
/// The second is stricter, rejecting a run outright when a non-zero odd
/// byte appears before the terminating double-zero; this recovers runs the
/// loose pass mis-segments. Candidate ordering is best-effort; there is no
/// guarantee the first candidate is the most subject-like.
pub fn harvest_utf16_strings(buffer: &[u8]) -> Vec<String> {
    defn!("(buffer len {})", buffer.len());
    let mut candidates: Vec<String> = Vec::new();

    // pass 1: loose alternation
    let mut pos: BufOffset = 0;
    while pos + 4 <= buffer.len() && candidates.len() < HARVEST_CAP_LOOSE {
        if looks_like_utf16_start(buffer, pos) {
            let start: BufOffset = pos;
            while pos + 2 <= buffer.len() && buffer[pos] != 0 && buffer[pos + 1] == 0 {
                pos += 2;
            }
            if pos - start >= HARVEST_MIN_CHARS * 2 {
                push_candidate(&mut candidates, &buffer[start..pos], false);
            }
            while pos < buffer.len() && buffer[pos] == 0 {
                pos += 1;
            }
        } else {
            pos += 1;
        }
    }
    defo!("pass 1 collected {} candidates", candidates.len());

    // pass 2: strict alternation over the whole buffer
    let mut pos: BufOffset = 0;
    while pos + 4 <= buffer.len() && candidates.len() < HARVEST_CAP {
        if !looks_like_utf16_start(buffer, pos) {
            pos += 1;
            continue;
        }
        let start: BufOffset = pos;
        let mut cur: BufOffset = pos;
        let mut valid: bool = true;
        while cur + 2 <= buffer.len() {
            if buffer[cur] == 0 && buffer[cur + 1] == 0 {
                break;
            }
            if buffer[cur + 1] != 0 {
                valid = false;
                break;
            }
            cur += 2;
        }
        if valid && cur > start {
            push_candidate(&mut candidates, &buffer[start..cur], true);
        }
        pos = if cur > start { cur + 2 } else { pos + 2 };
    }
    defx!("return {} candidates", candidates.len());

    candidates
}

/// Does a 2-byte-aligned UTF-16LE run plausibly begin at `pos`?
fn looks_like_utf16_start(
    buffer: &[u8],
    pos: BufOffset,
) -> bool {
    buffer[pos] != 0 && buffer[pos + 1] == 0 && buffer[pos + 2] != 0 && buffer[pos + 3] == 0
}

/// Decode, clean, and append one harvested run, discarding short,
/// URL-like, and duplicate results.
fn push_candidate(
    candidates: &mut Vec<String>,
    run: &[u8],
    skip_urls: bool,
) {
    let text: String = match decode_text_span(run) {
        Some(text) => collapse_whitespace(&text),
        None => return,
    };
    if text.chars().count() < HARVEST_MIN_CHARS {
        return;
    }
    if skip_urls && text.starts_with("http") {
        return;
    }
    if candidates.contains(&text) {
        return;
    }
    defo!("harvested candidate {:?}", text);
    candidates.push(text);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// organizer email scan
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// First email address in the buffer that is not an automated no-reply
/// sender. Event files embed the organizer address as plain ASCII.
pub fn scan_organizer_email(buffer: &[u8]) -> Option<String> {
    defñ!("(buffer len {})", buffer.len());
    for found in RE_EMAIL.find_iter(buffer) {
        let email: &str = match std::str::from_utf8(found.as_bytes()) {
            Ok(email) => email,
            Err(_) => continue,
        };
        if email.starts_with(NO_REPLY_PREFIX) {
            continue;
        }
        return Some(email.to_string());
    }

    None
}
