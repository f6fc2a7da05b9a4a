// src/tests/datetime_tests.rs

//! tests for `datetime.rs`

#![allow(non_snake_case)]

use ::test_case::test_case;

use crate::data::datetime::{
    datetime_to_units,
    duration_hours,
    format_datetime_local,
    format_datetime_utc,
    pair_candidates,
    parse_tz_offset_label,
    scan_timestamp_candidates,
    tz_offset_label,
    units_to_datetime,
    DateTimeL,
    FixedOffset,
    RawUnits,
    ScanRange,
    TimeZone,
    TZ_UTC,
};
use crate::tests::common::{build_units_buffer, units_for};

#[test]
fn test_units_roundtrip() {
    let dt: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2024, 5, 5, 12, 30, 0)
        .unwrap();
    let units: RawUnits = datetime_to_units(&dt);
    let back: DateTimeL = units_to_datetime(units, &ScanRange::default()).unwrap();
    assert_eq!(dt, back);
}

#[test_case(2019, 12, 31, 23, 59 => false; "just before window")]
#[test_case(2020, 1, 1, 0, 0 => true; "window begin")]
#[test_case(2025, 6, 15, 9, 0 => true; "window middle")]
#[test_case(2030, 12, 31, 23, 59 => true; "window end")]
#[test_case(2031, 1, 1, 0, 0 => false; "just after window")]
fn test_default_range_materializes(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> bool {
    let units: RawUnits = units_for(year, month, day, hour, minute);

    units_to_datetime(units, &ScanRange::default()).is_some()
}

#[test]
fn test_scan_range_inverted_years() {
    assert!(ScanRange::from_years(2030, 2020).is_none());
}

#[test]
fn test_scan_range_configurable() {
    let range: ScanRange = ScanRange::from_years(1990, 1999).unwrap();
    let units: RawUnits = units_for(1995, 3, 3, 3, 3);
    assert!(range.contains(units));
    assert!(!ScanRange::default().contains(units));
}

#[test]
fn test_scan_candidates_dedup() {
    let unit: RawUnits = units_for(2024, 6, 1, 9, 0);
    let later: RawUnits = units_for(2024, 6, 1, 10, 0);
    // the same raw value at two offsets contributes one candidate
    let buffer = build_units_buffer(&[unit, unit, later]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].raw_units, unit);
    assert_eq!(candidates[1].raw_units, later);
}

#[test]
fn test_scan_candidates_sorted_ascending() {
    let early: RawUnits = units_for(2024, 6, 1, 9, 0);
    let late: RawUnits = units_for(2024, 6, 2, 9, 0);
    let buffer = build_units_buffer(&[late, early]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    assert_eq!(candidates.len(), 2);
    assert!(candidates[0].instant < candidates[1].instant);
}

#[test]
fn test_scan_candidates_alignment() {
    let unit: RawUnits = units_for(2024, 6, 1, 9, 0);
    // value placed off 4-byte alignment is not a candidate
    let mut buffer: Vec<u8> = vec![0u8; 8];
    buffer[2..6].copy_from_slice(&unit.to_le_bytes());
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    assert!(candidates.is_empty());
}

#[test]
fn test_pair_first_plausible_in_iteration_order() {
    let base: RawUnits = units_for(2024, 6, 1, 9, 0);
    // (0,1) is 5 minutes, rejected; (0,2) is 30 minutes, accepted before
    // the equally-plausible (1,2)
    let buffer = build_units_buffer(&[base, base + 5, base + 30]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    let (start, end) = pair_candidates(&candidates);
    assert_eq!(start, units_to_datetime(base, &ScanRange::default()));
    assert_eq!(end, units_to_datetime(base + 30, &ScanRange::default()));
}

#[test]
fn test_pair_advances_outer_index() {
    let base: RawUnits = units_for(2024, 6, 1, 9, 0);
    // 20 hours from base rejects (0,1) and (0,2); (1,2) is 30 minutes
    let buffer = build_units_buffer(&[base, base + 1200, base + 1230]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    let (start, end) = pair_candidates(&candidates);
    assert_eq!(start, units_to_datetime(base + 1200, &ScanRange::default()));
    assert_eq!(end, units_to_datetime(base + 1230, &ScanRange::default()));
}

#[test]
fn test_pair_window_inclusive_bounds() {
    let base: RawUnits = units_for(2024, 6, 1, 9, 0);
    // exactly 15 minutes is accepted
    let buffer = build_units_buffer(&[base, base + 15]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    let (start, end) = pair_candidates(&candidates);
    assert!(start.is_some());
    assert_eq!((end.unwrap() - start.unwrap()).num_minutes(), 15);
}

#[test]
fn test_pair_fallback_two_earliest() {
    let base: RawUnits = units_for(2024, 6, 1, 9, 0);
    // 83 hours apart; nothing plausible, fall back to the two earliest
    let buffer = build_units_buffer(&[base + 5000, base]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    let (start, end) = pair_candidates(&candidates);
    assert_eq!(start, units_to_datetime(base, &ScanRange::default()));
    assert_eq!(end, units_to_datetime(base + 5000, &ScanRange::default()));
}

#[test]
fn test_pair_single_candidate() {
    let base: RawUnits = units_for(2024, 6, 1, 9, 0);
    let buffer = build_units_buffer(&[base]);
    let candidates = scan_timestamp_candidates(&buffer, &ScanRange::default());
    let (start, end) = pair_candidates(&candidates);
    assert!(start.is_some());
    assert!(end.is_none());
}

#[test]
fn test_pair_no_candidates() {
    let (start, end) = pair_candidates(&[]);
    assert!(start.is_none());
    assert!(end.is_none());
}

#[test]
fn test_duration_hours() {
    let start: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .unwrap();
    let end: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2024, 6, 1, 10, 30, 0)
        .unwrap();
    assert_eq!(duration_hours(&start, &end), 1.5);
}

#[test_case("UTC", Some(0); "utc")]
#[test_case("UTC+8", Some(8 * 3600); "utc plus 8")]
#[test_case("utc-5:30", Some(-(5 * 3600 + 30 * 60)); "lowercase negative with minutes")]
#[test_case("+02:00", Some(2 * 3600); "bare positive")]
#[test_case("UTC+15", None; "hours out of range")]
#[test_case("UTC*9", None; "bad sign")]
#[test_case("bogus", None; "not a timezone")]
fn test_parse_tz_offset_label(
    label: &str,
    expect_secs: Option<i32>,
) {
    let result: Option<FixedOffset> = parse_tz_offset_label(label);
    assert_eq!(result.map(|tz| tz.local_minus_utc()), expect_secs);
}

#[test_case("UTC+8", "UTC+8")]
#[test_case("UTC-5:30", "UTC-5:30")]
#[test_case("UTC", "UTC+0")]
fn test_tz_offset_label_roundtrip(
    label: &str,
    expect: &str,
) {
    let tz: FixedOffset = parse_tz_offset_label(label).unwrap();
    assert_eq!(tz_offset_label(&tz), expect);
}

#[test]
fn test_format_datetime() {
    let dt: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .unwrap();
    assert_eq!(format_datetime_utc(&dt), "2024-06-01 09:00:00 UTC");
    let tz: FixedOffset = parse_tz_offset_label("UTC+8").unwrap();
    assert_eq!(format_datetime_local(&dt, &tz), "2024-06-01 17:00:00");
}
