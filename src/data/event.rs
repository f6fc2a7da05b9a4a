// src/data/event.rs

//! Decode one proprietary event-file buffer into an [`EventRecord`].
//!
//! The on-disk format is undocumented; there is no authoritative grammar.
//! Structure is recovered with a primary marker-byte strategy plus ordered
//! fallback heuristics, each a pure function over the buffer:
//!
//! 1. [`scan_field_length_markers`] finds the length-field sentinel group
//!    in the header window and yields a validated [`MarkerMatch`].
//! 2. [`locate_text_start`] anchors the variable-length text block, off
//!    the embedded markup closer or an `==` separator token.
//! 3. [`extract_marker_texts`] carves the subject and location spans.
//! 4. When the marker path yields no subject, markup metadata and then the
//!    string harvester supply best-effort candidates.
//!
//! Decoding never fails: malformed input degrades to an `EventRecord`
//! with absent fields.
//!
//! [`EventRecord`]: self::EventRecord
//! [`MarkerMatch`]: self::MarkerMatch
//! [`scan_field_length_markers`]: self::scan_field_length_markers
//! [`locate_text_start`]: self::locate_text_start
//! [`extract_marker_texts`]: self::extract_marker_texts

use std::ops::Range;

use ::memchr::memmem;
#[allow(unused_imports)]
use ::more_asserts::{
    assert_ge,
    assert_le,
    debug_assert_ge,
    debug_assert_le,
    debug_assert_lt,
};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

use crate::common::{BufOffset, FPath};
use crate::data::datetime::{
    duration_hours,
    pair_candidates,
    scan_timestamp_candidates,
    units_to_datetime,
    DateTimeLOpt,
    RawUnits,
    ScanRange,
};
use crate::data::html::{
    extract_html_block,
    html_body_text,
    html_location_candidate,
    html_subject_candidate,
    HTML_CLOSE_UTF16LE,
};
use crate::data::text::{
    decode_text_span,
    harvest_utf16_strings,
    scan_organizer_email,
};
#[cfg(any(debug_assertions, test))]
use crate::debug::printers::buffer_to_hex_preview;
use crate::de_wrn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// format constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sentinel preceding the subject length field.
pub const MARKER_SUBJECT_LEN: [u8; 4] = [0x02, 0x00, 0x00, 0x1f];
/// Sentinel preceding the location length field; expected 8 bytes after
/// [`MARKER_SUBJECT_LEN`].
pub const MARKER_LOCATION_LEN: [u8; 4] = [0x04, 0x00, 0x00, 0x1f];
/// Bytes from the subject sentinel to its length field.
const SUBJECT_LEN_OFFSET: BufOffset = 4;
/// Bytes from the subject sentinel to the location sentinel.
const MARKER_STRIDE: BufOffset = 8;
/// Bytes from the subject sentinel to the location length field.
const LOCATION_LEN_OFFSET: BufOffset = 12;
/// Total bytes of the sentinel + length-field group.
const MARKER_GROUP_SZ: BufOffset = 16;

/// Fallback text-block separator token, `==`.
pub const EQ_SEPARATOR: &[u8] = &[0x3d, 0x3d];
/// Bytes skipped after either text anchor; an embedded line terminator.
const TEXT_SKIP_AFTER_ANCHOR: BufOffset = 2;

/// Inclusive maximum of either length field.
pub const FIELD_LEN_MAX: u32 = 500;
/// Inclusive minimum of the subject length field; the location field may
/// be zero (an event with no location).
pub const SUBJECT_LEN_MIN: u32 = 2;

/// Default header window searched for the sentinel group. Empirically the
/// group sits a few hundred bytes in; see [`DecodeConfig`].
pub const MARKER_WINDOW_DEFAULT: Range<BufOffset> = 0x100..0x300;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// decode configuration and data containers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An opaque modification stamp passed through from the index; compared
/// for equality by the sync planner, never interpreted.
pub type ModStamp = i64;

/// Tunable bounds of a decode call. The defaults reflect observed files,
/// not guarantees of the format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeConfig {
    /// Header byte window searched for the length-field sentinel group.
    pub marker_window: Range<BufOffset>,
    /// Plausibility bounds for discovered timestamps.
    pub scan_range: ScanRange,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            marker_window: MARKER_WINDOW_DEFAULT,
            scan_range: ScanRange::default(),
        }
    }
}

/// A validated sentinel-group hit: the sentinel offset and the two length
/// fields read beside it. Transient; only meaningful for the buffer it
/// was scanned from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MarkerMatch {
    pub offset: BufOffset,
    pub subject_len: u32,
    pub location_len: u32,
}

/// A byte range within a buffer. Describes a region; never owns bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextSpan {
    pub start_offset: BufOffset,
    pub byte_length: usize,
}

impl TextSpan {
    /// The described bytes, or `None` when the span exceeds the buffer.
    pub fn slice<'a>(
        &self,
        buffer: &'a [u8],
    ) -> Option<&'a [u8]> {
        let end: BufOffset = self
            .start_offset
            .checked_add(self.byte_length)?;

        buffer.get(self.start_offset..end)
    }
}

/// Which anchor located the text block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextAnchor {
    /// The embedded UTF-16LE `</html>` closer.
    HtmlClose,
    /// The `==` separator token.
    EqSeparator,
}

/// Which strategy produced the subject.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubjectStrategy {
    /// Length-field marker carve; the reliable path.
    Marker,
    /// Markup metadata (`itemprop="name"` span or `<title>`).
    HtmlMeta,
    /// Best-effort harvested string.
    Harvest,
}

/// One authoritative row of the Outlook SQLite index. Start and end here
/// are ground truth and override anything carved from the file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DbEvent {
    pub start_units: RawUnits,
    pub end_units: RawUnits,
    /// Data-file path as recorded in the index, relative to the profile
    /// data directory.
    pub data_path: FPath,
    pub record_id: Option<String>,
    pub mod_stamp: Option<ModStamp>,
}

/// The decoded event. Constructed once per input buffer, immutable
/// thereafter. Absent fields mean the heuristics found nothing; that is
/// an expected outcome, not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub record_id: Option<String>,
    pub mod_stamp: Option<ModStamp>,
    pub source_path: FPath,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub body: Option<String>,
    pub start: DateTimeLOpt,
    pub end: DateTimeLOpt,
    /// `(end - start)` in hours whenever both instants are present.
    pub duration_hours: Option<f64>,
    /// Which strategy produced [`subject`], if any.
    ///
    /// [`subject`]: EventRecord::subject
    pub subject_strategy: Option<SubjectStrategy>,
    /// Which anchor located the text block, if any.
    pub text_anchor: Option<TextAnchor>,
}

impl EventRecord {
    /// An all-absent record for `source_path`.
    pub fn empty(source_path: FPath) -> Self {
        EventRecord {
            record_id: None,
            mod_stamp: None,
            source_path,
            subject: None,
            location: None,
            organizer: None,
            body: None,
            start: None,
            end: None,
            duration_hours: None,
            subject_strategy: None,
            text_anchor: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// marker scanning, anchoring, validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn read_u32_le(
    buffer: &[u8],
    offset: BufOffset,
) -> u32 {
    debug_assert_le!(offset + 4, buffer.len());

    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// Find where the variable-length text block begins.
///
/// Anchor strategies in order: 2 bytes past the UTF-16LE `</html>` closer
/// (skipping the embedded line terminator), else 2 bytes past the first
/// `==` token. `None` means no anchor; the caller falls back to
/// harvesting for text (timestamp extraction is unaffected).
///
/// The returned offset may lie at or past the end of `buffer`; span
/// extraction bound-checks.
pub fn locate_text_start(buffer: &[u8]) -> Option<(BufOffset, TextAnchor)> {
    defn!("(buffer len {})", buffer.len());
    if let Some(pos) = memmem::find(buffer, HTML_CLOSE_UTF16LE) {
        let start: BufOffset = pos + HTML_CLOSE_UTF16LE.len() + TEXT_SKIP_AFTER_ANCHOR;
        defx!("return (0x{:x}, HtmlClose)", start);
        return Some((start, TextAnchor::HtmlClose));
    }
    if let Some(pos) = memmem::find(buffer, EQ_SEPARATOR) {
        let start: BufOffset = pos + EQ_SEPARATOR.len();
        defx!("return (0x{:x}, EqSeparator)", start);
        return Some((start, TextAnchor::EqSeparator));
    }
    defx!("return None; no anchor");

    None
}

/// Is a `(text_start, subject_len, location_len)` triple plausible?
///
/// Checks the documented bounds, that the spans fit the buffer, and that
/// the subject span actually decodes to non-empty text. With no anchor
/// available there is nothing to decode against, so the length fields are
/// trusted as-is. Rejects silently; the scanner keeps searching.
pub fn validate_marker(
    buffer: &[u8],
    candidate: &MarkerMatch,
    text_start: Option<BufOffset>,
) -> bool {
    if !(SUBJECT_LEN_MIN..=FIELD_LEN_MAX).contains(&candidate.subject_len) {
        return false;
    }
    if candidate.location_len > FIELD_LEN_MAX {
        return false;
    }
    let start: BufOffset = match text_start {
        Some(start) => start,
        None => return true,
    };
    let subject_span = TextSpan {
        start_offset: start,
        byte_length: candidate.subject_len as usize,
    };
    let subject_bytes: &[u8] = match subject_span.slice(buffer) {
        Some(bytes) => bytes,
        None => return false,
    };
    if decode_text_span(subject_bytes).is_none() {
        return false;
    }
    if candidate.location_len > 0 {
        let location_end: BufOffset =
            start + candidate.subject_len as usize + candidate.location_len as usize;
        if location_end > buffer.len() {
            return false;
        }
    }

    true
}

/// Search the header window for the sentinel group and return the first
/// candidate that validates.
///
/// For each occurrence of [`MARKER_SUBJECT_LEN`] at offset `p` with
/// [`MARKER_LOCATION_LEN`] at `p + 8`, the length fields at `p + 4` and
/// `p + 12` are read and handed to [`validate_marker`]. Scanning stops at
/// the first validated match. No match is not an error; it signals "use
/// fallback".
pub fn scan_field_length_markers(
    buffer: &[u8],
    config: &DecodeConfig,
    text_start: Option<BufOffset>,
) -> Option<MarkerMatch> {
    defn!("(buffer len {}, window {:?})", buffer.len(), config.marker_window);
    if buffer.len() < MARKER_GROUP_SZ {
        defx!("return None; buffer smaller than one marker group");
        return None;
    }
    let search_end: BufOffset = config
        .marker_window
        .end
        .min(buffer.len() - MARKER_GROUP_SZ);
    let mut pos: BufOffset = config.marker_window.start;
    while pos < search_end {
        if buffer[pos..pos + 4] == MARKER_SUBJECT_LEN
            && buffer[pos + MARKER_STRIDE..pos + MARKER_STRIDE + 4] == MARKER_LOCATION_LEN
        {
            let candidate = MarkerMatch {
                offset: pos,
                subject_len: read_u32_le(buffer, pos + SUBJECT_LEN_OFFSET),
                location_len: read_u32_le(buffer, pos + LOCATION_LEN_OFFSET),
            };
            if validate_marker(buffer, &candidate, text_start) {
                defx!(
                    "return marker at 0x{:x}; subject_len {}, location_len {}",
                    pos,
                    candidate.subject_len,
                    candidate.location_len
                );
                return Some(candidate);
            }
            defo!(
                "rejected marker candidate at 0x{:x}; subject_len {}, location_len {}, group {}",
                pos,
                candidate.subject_len,
                candidate.location_len,
                buffer_to_hex_preview(&buffer[pos..pos + MARKER_GROUP_SZ], MARKER_GROUP_SZ)
            );
        }
        pos += 1;
    }
    defx!("return None; no validated marker");

    None
}

/// Carve the subject and location texts described by a validated marker.
///
/// A `location_len` of zero means an event without a location, not a
/// failure.
pub fn extract_marker_texts(
    buffer: &[u8],
    marker: &MarkerMatch,
    text_start: BufOffset,
) -> (Option<String>, Option<String>) {
    defn!("(text_start 0x{:x}, marker {:?})", text_start, marker);
    if text_start >= buffer.len() {
        defx!("return (None, None); text_start past buffer end");
        return (None, None);
    }
    let subject_span = TextSpan {
        start_offset: text_start,
        byte_length: marker.subject_len as usize,
    };
    let subject: Option<String> = subject_span
        .slice(buffer)
        .and_then(decode_text_span);
    let location: Option<String> = match marker.location_len {
        0 => None,
        _ => {
            let location_span = TextSpan {
                start_offset: text_start + marker.subject_len as usize,
                byte_length: marker.location_len as usize,
            };
            location_span
                .slice(buffer)
                .and_then(decode_text_span)
        }
    };
    defx!("return (subject {:?}, location {:?})", subject, location);

    (subject, location)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// record assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Minimum character count for a harvested location candidate.
const HARVEST_LOCATION_MIN_CHARS: usize = 2;

/// Decode one event-file buffer into an [`EventRecord`].
///
/// Subject and location come from the marker path when it validates; only
/// when that path yields no subject do markup metadata and then the
/// harvester run. Heuristic timestamps are always computed, and the
/// authoritative `db_event` times, when given, unconditionally override
/// them. Completes for any input, including a zero-length buffer, and
/// never panics on malformed bytes.
pub fn decode_event_buffer(
    buffer: &[u8],
    db_event: Option<&DbEvent>,
    config: &DecodeConfig,
) -> EventRecord {
    defn!("(buffer len {}, db row: {})", buffer.len(), db_event.is_some());
    let mut record: EventRecord = match db_event {
        Some(db) => {
            let mut record = EventRecord::empty(db.data_path.clone());
            record.record_id = db.record_id.clone();
            record.mod_stamp = db.mod_stamp;
            record
        }
        None => EventRecord::empty(FPath::default()),
    };
    if buffer.is_empty() {
        // nothing to carve; the authoritative row still applies
        apply_authoritative_times(&mut record, db_event, config);
        defx!("return all-absent record; empty buffer");
        return record;
    }

    let text_start_anchor: Option<(BufOffset, TextAnchor)> = locate_text_start(buffer);
    let text_start: Option<BufOffset> = text_start_anchor.map(|(start, _)| start);

    // primary strategy: length-field markers
    if let Some(marker) = scan_field_length_markers(buffer, config, text_start) {
        if let Some((start, anchor)) = text_start_anchor {
            let (subject, location) = extract_marker_texts(buffer, &marker, start);
            if subject.is_some() {
                record.subject_strategy = Some(SubjectStrategy::Marker);
            }
            record.text_anchor = Some(anchor);
            record.subject = subject;
            record.location = location;
        }
    }

    // embedded markup: body always, subject/location only as fallback
    let html: Option<String> = extract_html_block(buffer);
    record.body = html
        .as_deref()
        .and_then(html_body_text);

    if record.subject.is_none() {
        if let Some(subject) = html
            .as_deref()
            .and_then(html_subject_candidate)
        {
            record.subject = Some(subject);
            record.subject_strategy = Some(SubjectStrategy::HtmlMeta);
        }
        // best-effort: candidate ordering carries no guarantee of which
        // string is the subject
        let candidates: Vec<String> = harvest_utf16_strings(buffer);
        if record.subject.is_none() {
            if let Some(subject) = candidates.first() {
                record.subject = Some(subject.clone());
                record.subject_strategy = Some(SubjectStrategy::Harvest);
            }
        }
        if record.location.is_none() {
            record.location = html
                .as_deref()
                .and_then(html_location_candidate);
        }
        if record.location.is_none() {
            // a candidate used for the subject is not reused
            record.location = candidates
                .iter()
                .find(|candidate| {
                    Some(candidate.as_str()) != record.subject.as_deref()
                        && candidate.chars().count() >= HARVEST_LOCATION_MIN_CHARS
                })
                .cloned();
        }
    }

    record.organizer = scan_organizer_email(buffer);

    // heuristic timestamps are always computed; the authoritative row,
    // when present, overrides them below
    let candidates = scan_timestamp_candidates(buffer, &config.scan_range);
    let (start, end) = pair_candidates(&candidates);
    record.start = start;
    record.end = end;
    apply_authoritative_times(&mut record, db_event, config);
    defx!(
        "return record; subject {:?}, strategy {:?}, anchor {:?}",
        record.subject,
        record.subject_strategy,
        record.text_anchor
    );

    record
}

/// Overwrite heuristic times with the authoritative index times whenever
/// a row is present, then settle the duration. `end` earlier than `start`
/// is discarded; `duration_hours` is only set when both instants remain.
fn apply_authoritative_times(
    record: &mut EventRecord,
    db_event: Option<&DbEvent>,
    config: &DecodeConfig,
) {
    if let Some(db) = db_event {
        record.start = units_to_datetime(db.start_units, &config.scan_range);
        record.end = units_to_datetime(db.end_units, &config.scan_range);
    }
    if let (Some(start), Some(end)) = (record.start, record.end) {
        if end < start {
            de_wrn!("end {} earlier than start {}; dropping end", end, start);
            record.end = None;
        }
    }
    record.duration_hours = match (record.start.as_ref(), record.end.as_ref()) {
        (Some(start), Some(end)) => Some(duration_hours(start, end)),
        _ => None,
    };
}
