// src/tests/indexreader_tests.rs

//! tests for `indexreader.rs`

#![allow(non_snake_case)]

use ::rusqlite::Connection;

use crate::common::FPath;
use crate::data::datetime::{DateTimeL, RawUnits, TimeZone, TZ_UTC};
use crate::data::event::DbEvent;
use crate::readers::indexreader::{IndexReader, QueryWindow};
use crate::tests::common::units_for;

const CREATE_CALENDAR_EVENTS: &str = "\
CREATE TABLE CalendarEvents (
    Calendar_StartDateUTC INTEGER,
    Calendar_EndDateUTC INTEGER,
    PathToDataFile TEXT,
    Calendar_UID TEXT,
    Record_ModDate REAL
)";

fn synthetic_index() -> IndexReader {
    let conn: Connection = Connection::open_in_memory().unwrap();
    conn.execute(CREATE_CALENDAR_EVENTS, []).unwrap();
    let insert = "INSERT INTO CalendarEvents VALUES (?1, ?2, ?3, ?4, ?5)";
    // two rows inside the queried window, out of start order
    conn.execute(
        insert,
        ::rusqlite::params![
            units_for(2024, 6, 2, 10, 0),
            units_for(2024, 6, 2, 11, 0),
            "Events/2/b.olk15Event",
            "UID-B",
            200.0_f64,
        ],
    )
    .unwrap();
    conn.execute(
        insert,
        ::rusqlite::params![
            units_for(2024, 6, 1, 9, 0),
            units_for(2024, 6, 1, 9, 30),
            "Events/1/a.olk15Event",
            "UID-A",
            100.0_f64,
        ],
    )
    .unwrap();
    // one row after the window
    conn.execute(
        insert,
        ::rusqlite::params![
            units_for(2024, 7, 20, 9, 0),
            units_for(2024, 7, 20, 10, 0),
            "Events/3/c.olk15Event",
            "UID-C",
            300.0_f64,
        ],
    )
    .unwrap();

    IndexReader::from_connection(conn, FPath::from(":memory:"))
}

#[test]
fn test_query_window_rows_ordered() {
    let index: IndexReader = synthetic_index();
    let from: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2024, 6, 1, 15, 30, 0)
        .unwrap();
    let window: QueryWindow = QueryWindow::from_day_start(&from, 14);
    let rows: Vec<DbEvent> = index.query_window(&window).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record_id.as_deref(), Some("UID-A"));
    assert_eq!(rows[1].record_id.as_deref(), Some("UID-B"));
    assert_eq!(rows[0].data_path, "Events/1/a.olk15Event");
    // REAL modification stamps carry over as integral stamps
    assert_eq!(rows[0].mod_stamp, Some(100));
    assert_eq!(rows[0].start_units, units_for(2024, 6, 1, 9, 0));
    assert_eq!(rows[0].end_units, units_for(2024, 6, 1, 9, 30));
}

#[test]
fn test_query_window_empty() {
    let index: IndexReader = synthetic_index();
    let from: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .unwrap();
    let window: QueryWindow = QueryWindow::from_day_start(&from, 7);
    let rows: Vec<DbEvent> = index.query_window(&window).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_window_from_day_start_truncates() {
    let from: DateTimeL = TZ_UTC
        .with_ymd_and_hms(2024, 6, 1, 15, 30, 0)
        .unwrap();
    let window: QueryWindow = QueryWindow::from_day_start(&from, 14);
    let expect_beg: RawUnits = units_for(2024, 6, 1, 0, 0);
    assert_eq!(window.units_beg, expect_beg);
    assert_eq!(window.units_end, expect_beg + 14 * 24 * 60);
}

#[test]
fn test_open_missing_index() {
    assert!(IndexReader::open(&FPath::from("/nonexistent/Outlook.sqlite")).is_err());
}
