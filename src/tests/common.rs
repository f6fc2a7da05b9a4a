// src/tests/common.rs

//! Shared helpers to build synthetic event-file buffers.

use crate::common::{BufOffset, Bytes};
use crate::data::datetime::{
    datetime_to_units,
    DateTimeL,
    RawUnits,
    TimeZone,
    TZ_UTC,
};
use crate::data::event::{MARKER_LOCATION_LEN, MARKER_SUBJECT_LEN};
use crate::data::html::HTML_CLOSE_UTF16LE;

/// Default sentinel-group offset used by synthetic buffers; inside the
/// default marker window.
pub const MARKER_AT: BufOffset = 0x120;
/// Default text-anchor offset used by synthetic buffers.
pub const ANCHOR_AT: BufOffset = 0x200;

/// Encode `s` as UTF-16LE bytes.
pub fn utf16le_bytes(s: &str) -> Bytes {
    s.encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

/// Write `bytes` into `buffer` at `at`.
pub fn splice(
    buffer: &mut [u8],
    at: BufOffset,
    bytes: &[u8],
) {
    buffer[at..at + bytes.len()].copy_from_slice(bytes);
}

/// Write the sentinel group with the given length fields at
/// [`MARKER_AT`].
pub fn splice_marker_group(
    buffer: &mut [u8],
    subject_len: u32,
    location_len: u32,
) {
    splice(buffer, MARKER_AT, &MARKER_SUBJECT_LEN);
    splice(buffer, MARKER_AT + 4, &subject_len.to_le_bytes());
    splice(buffer, MARKER_AT + 8, &MARKER_LOCATION_LEN);
    splice(buffer, MARKER_AT + 12, &location_len.to_le_bytes());
}

/// A buffer with the sentinel group at [`MARKER_AT`], correctly encoded
/// length fields, the UTF-16LE `</html>` closer at [`ANCHOR_AT`] followed
/// by a line terminator, and the subject/location text block at the
/// documented offset.
pub fn build_marker_buffer(
    subject: &str,
    location: &str,
) -> Bytes {
    let subject_b: Bytes = utf16le_bytes(subject);
    let location_b: Bytes = utf16le_bytes(location);
    let text_start: BufOffset = ANCHOR_AT + HTML_CLOSE_UTF16LE.len() + 2;
    let mut buffer: Bytes = vec![0u8; text_start + subject_b.len() + location_b.len() + 0x40];
    splice_marker_group(&mut buffer, subject_b.len() as u32, location_b.len() as u32);
    splice(&mut buffer, ANCHOR_AT, HTML_CLOSE_UTF16LE);
    // embedded line terminator after the closer
    buffer[ANCHOR_AT + HTML_CLOSE_UTF16LE.len()] = 0x0d;
    splice(&mut buffer, text_start, &subject_b);
    splice(&mut buffer, text_start + subject_b.len(), &location_b);

    buffer
}

/// Like [`build_marker_buffer`] but anchored by the `==` separator token
/// instead of the markup closer.
pub fn build_eq_buffer(
    subject: &str,
    location: &str,
) -> Bytes {
    let subject_b: Bytes = utf16le_bytes(subject);
    let location_b: Bytes = utf16le_bytes(location);
    let text_start: BufOffset = ANCHOR_AT + 2;
    let mut buffer: Bytes = vec![0u8; text_start + subject_b.len() + location_b.len() + 0x40];
    splice_marker_group(&mut buffer, subject_b.len() as u32, location_b.len() as u32);
    splice(&mut buffer, ANCHOR_AT, &[0x3d, 0x3d]);
    splice(&mut buffer, text_start, &subject_b);
    splice(&mut buffer, text_start + subject_b.len(), &location_b);

    buffer
}

/// A buffer that is only the given raw minute counts, 4-byte-aligned
/// little-endian.
pub fn build_units_buffer(units: &[RawUnits]) -> Bytes {
    units
        .iter()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

/// Raw minute count of the given UTC wall-clock time.
pub fn units_for(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> RawUnits {
    let dt: DateTimeL = TZ_UTC
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap();

    datetime_to_units(&dt)
}
