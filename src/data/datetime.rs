// src/data/datetime.rs

//! Datetime types and functions for carving timestamps out of raw
//! event-file bytes.
//!
//! Event files and the Outlook SQLite index both store instants as a count
//! of minutes since 1601-01-01T00:00:00 UTC (the Windows `FILETIME`
//! calendar epoch, at minute granularity). This module holds the one
//! canonical conversion routine, [`units_to_datetime`], used by the
//! decoder, the index reader, and the printer.
//!
//! The decoder discovers timestamps statistically: every 4-byte-aligned
//! little-endian `u32` in a buffer is a [`TimestampCandidate`] if it falls
//! within a [`ScanRange`]. The range is configuration, not a property of
//! the file format; see [`ScanRange::from_years`].
//!
//! [`units_to_datetime`]: self::units_to_datetime
//! [`TimestampCandidate`]: self::TimestampCandidate
//! [`ScanRange`]: self::ScanRange

use std::collections::HashSet;

use ::chrono::Duration;
#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    Datelike, // adds method `.year()` onto `DateTime`
    FixedOffset,
    TimeZone,
    Utc,
};
use ::itertools::Itertools; // adds method `.tuple_combinations()`
use ::lazy_static::lazy_static;
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

use crate::common::BufOffset;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateTime types and the minutes-since-1601 epoch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A _Year_ in a date
pub type Year = i32;

/// A chrono [`DateTime`] type used in _occlib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// A count of minutes since [`UNITS_EPOCH`], as stored on disk.
///
/// [`UNITS_EPOCH`]: struct@self::UNITS_EPOCH
pub type RawUnits = u32;

lazy_static! {
    /// The calendar epoch of on-disk minute counts;
    /// 1601-01-01T00:00:00 UTC.
    pub static ref UNITS_EPOCH: DateTimeL =
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap();
    /// UTC as a `FixedOffset`, for `with_timezone` calls.
    pub static ref TZ_UTC: FixedOffset = FixedOffset::east_opt(0).unwrap();
}

/// Convert a raw on-disk minute count to an absolute instant.
///
/// This is the canonical conversion routine; every consumer of raw minute
/// counts goes through here. Returns `None` when `units` falls outside the
/// passed [`ScanRange`] (sanity bound) or the addition overflows chrono's
/// representable range.
pub fn units_to_datetime(
    units: RawUnits,
    range: &ScanRange,
) -> DateTimeLOpt {
    if !range.contains(units) {
        return None;
    }
    UNITS_EPOCH.checked_add_signed(Duration::minutes(units as i64))
}

/// Convert an absolute instant back to a raw on-disk minute count.
///
/// Instants before the epoch clamp to `0`.
pub fn datetime_to_units(dt: &DateTimeL) -> RawUnits {
    let minutes: i64 = (*dt - *UNITS_EPOCH).num_minutes();

    minutes.clamp(0, RawUnits::MAX as i64) as RawUnits
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScanRange, the plausibility window
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default first plausible year for discovered timestamps.
pub const SCAN_YEAR_FIRST_DEFAULT: Year = 2020;
/// Default last plausible year for discovered timestamps.
pub const SCAN_YEAR_LAST_DEFAULT: Year = 2030;

/// Inclusive bounds on plausible raw minute counts.
///
/// The binary format itself supports the full epoch range; this window is
/// a sanity bound tied to current real-world usage, so it is carried as
/// configuration rather than hardcoded where values are filtered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanRange {
    pub units_min: RawUnits,
    pub units_max: RawUnits,
}

impl ScanRange {
    /// A `ScanRange` spanning `year_first`-01-01T00:00 UTC through the
    /// last minute of `year_last` (inclusive years).
    ///
    /// Returns `None` for an inverted or unrepresentable year span.
    pub fn from_years(
        year_first: Year,
        year_last: Year,
    ) -> Option<ScanRange> {
        if year_first > year_last {
            return None;
        }
        let year_after: Year = year_last.checked_add(1)?;
        let beg: DateTimeL = TZ_UTC
            .with_ymd_and_hms(year_first, 1, 1, 0, 0, 0)
            .single()?;
        let end: DateTimeL = TZ_UTC
            .with_ymd_and_hms(year_after, 1, 1, 0, 0, 0)
            .single()?;
        let units_min: RawUnits = datetime_to_units(&beg);
        let units_max: RawUnits = datetime_to_units(&end).saturating_sub(1);

        Some(ScanRange { units_min, units_max })
    }

    pub const fn contains(
        &self,
        units: RawUnits,
    ) -> bool {
        self.units_min <= units && units <= self.units_max
    }
}

impl Default for ScanRange {
    fn default() -> Self {
        ScanRange::from_years(SCAN_YEAR_FIRST_DEFAULT, SCAN_YEAR_LAST_DEFAULT).unwrap()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// timestamp candidate discovery and pairing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One plausible timestamp discovered in a buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimestampCandidate {
    /// The raw minute count as read from the buffer.
    pub raw_units: RawUnits,
    /// [`raw_units`] materialized as an instant.
    ///
    /// [`raw_units`]: TimestampCandidate::raw_units
    pub instant: DateTimeL,
}

/// Minimum plausible meeting duration when pairing candidates; 15 minutes.
pub const PAIR_DURATION_MIN_SECS: i64 = 900;
/// Maximum plausible meeting duration when pairing candidates; 8 hours.
pub const PAIR_DURATION_MAX_SECS: i64 = 28800;

/// Scan every 4-byte-aligned window of `buffer` as a little-endian `u32`
/// and collect those within `range` as [`TimestampCandidate`]s.
///
/// Candidates are deduplicated by raw value (the same minute count at two
/// offsets contributes one candidate) and returned sorted by instant,
/// ascending.
pub fn scan_timestamp_candidates(
    buffer: &[u8],
    range: &ScanRange,
) -> Vec<TimestampCandidate> {
    defn!("(buffer len {}, range {:?})", buffer.len(), range);
    let mut seen: HashSet<RawUnits> = HashSet::new();
    let mut candidates: Vec<TimestampCandidate> = Vec::new();
    if buffer.len() < 4 {
        defx!("return 0 candidates; buffer too small");
        return candidates;
    }
    let mut offset: BufOffset = 0;
    while offset + 4 <= buffer.len() {
        let raw_units: RawUnits = u32::from_le_bytes([
            buffer[offset],
            buffer[offset + 1],
            buffer[offset + 2],
            buffer[offset + 3],
        ]);
        if range.contains(raw_units) && seen.insert(raw_units) {
            if let Some(instant) = units_to_datetime(raw_units, range) {
                defo!("candidate {} at offset 0x{:x} ({})", raw_units, offset, instant);
                candidates.push(TimestampCandidate { raw_units, instant });
            }
        }
        offset += 4;
    }
    candidates.sort_by_key(|candidate| candidate.instant);
    defx!("return {} candidates", candidates.len());

    candidates
}

/// Pair sorted candidates into a plausible `(start, end)` interval.
///
/// Iterates ordered pairs `(i < j)`, outer index ascending then inner index
/// ascending, and accepts the first pair whose duration lies within
/// [`PAIR_DURATION_MIN_SECS`]`..=`[`PAIR_DURATION_MAX_SECS`] inclusive.
/// With no plausible pair the two earliest candidates are used regardless
/// of duration. A single candidate yields only a start. Zero candidates
/// yield neither; that is not an error.
///
/// `candidates` must be sorted ascending by instant
/// (see [`scan_timestamp_candidates`]).
pub fn pair_candidates(
    candidates: &[TimestampCandidate],
) -> (DateTimeLOpt, DateTimeLOpt) {
    defn!("({} candidates)", candidates.len());
    match candidates.len() {
        0 => {
            defx!("return (None, None)");
            (None, None)
        }
        1 => {
            defx!("return (Some, None)");
            (Some(candidates[0].instant), None)
        }
        _ => {
            for (beg, end) in candidates
                .iter()
                .tuple_combinations()
            {
                debug_assert_le!(beg.instant, end.instant, "candidates not sorted ascending");
                let duration_secs: i64 = (end.instant - beg.instant).num_seconds();
                if (PAIR_DURATION_MIN_SECS..=PAIR_DURATION_MAX_SECS).contains(&duration_secs) {
                    defx!("return plausible pair ({}, {})", beg.instant, end.instant);
                    return (Some(beg.instant), Some(end.instant));
                }
            }
            // no pair within the plausibility window; fall back to the two
            // earliest candidates
            defx!(
                "return fallback pair ({}, {})",
                candidates[0].instant,
                candidates[1].instant
            );
            (Some(candidates[0].instant), Some(candidates[1].instant))
        }
    }
}

/// Hours between `start` and `end` as a fraction.
pub fn duration_hours(
    start: &DateTimeL,
    end: &DateTimeL,
) -> f64 {
    (*end - *start).num_seconds() as f64 / 3600.0
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// user timezone labels and rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse a user timezone label of the form `"UTC"`, `"UTC+8"`,
/// `"UTC-5:30"`, or a bare `"+8"` / `"-05:30"`.
pub fn parse_tz_offset_label(label: &str) -> Option<FixedOffset> {
    let upper: String = label.trim().to_uppercase();
    let rest: &str = upper
        .strip_prefix("UTC")
        .unwrap_or(upper.as_str());
    if rest.is_empty() {
        return Some(*TZ_UTC);
    }
    let (sign, digits): (i32, &str) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    let (hours_s, minutes_s): (&str, &str) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None => (digits, "0"),
    };
    let hours: i32 = hours_s.parse().ok()?;
    let minutes: i32 = minutes_s.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Render `tz` back to a `"UTC±H[:MM]"` label, e.g. `"UTC+8"`,
/// `"UTC-5:30"`.
pub fn tz_offset_label(tz: &FixedOffset) -> String {
    let total_secs: i32 = tz.local_minus_utc();
    let hours: i32 = total_secs / 3600;
    let minutes: i32 = (total_secs.abs() % 3600) / 60;
    let sign: &str = if total_secs >= 0 { "+" } else { "" };
    match minutes {
        0 => format!("UTC{}{}", sign, hours),
        _ => format!("UTC{}{}:{:02}", sign, hours, minutes),
    }
}

/// Render an instant in the user timezone, `"%Y-%m-%d %H:%M:%S"`.
pub fn format_datetime_local(
    dt: &DateTimeL,
    tz: &FixedOffset,
) -> String {
    dt.with_timezone(tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Render an instant in UTC, `"%Y-%m-%d %H:%M:%S UTC"`.
pub fn format_datetime_utc(dt: &DateTimeL) -> String {
    dt.with_timezone(&*TZ_UTC)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}
