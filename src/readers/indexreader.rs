// src/readers/indexreader.rs

//! Implements an [`IndexReader`], the authoritative-metadata side of the
//! system: a read-only view of the application's SQLite index.
//!
//! The `CalendarEvents` table records, per event, the start/end instants
//! (minutes since 1601, UTC), the relative path of the binary data file,
//! a stable record identifier, and a modification stamp. These values are
//! ground truth; the decoder's carved timestamps are only a fallback for
//! files with no surviving index row.
//!
//! Failures here are of the *UnreadableInput* class; they are reported to
//! the caller, not swallowed.
//!
//! [`IndexReader`]: self::IndexReader

use std::fmt;

use ::chrono::Duration;
use ::rusqlite::{Connection, OpenFlags, Row};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

use crate::common::FPath;
use crate::data::datetime::{
    datetime_to_units,
    DateTimeL,
    RawUnits,
    Utc,
    TZ_UTC,
};
use crate::data::event::{DbEvent, ModStamp};
use crate::readers::helpers::fpath_to_path;

/// Result from the underlying SQLite driver.
pub type ResultSqlite<T> = ::rusqlite::Result<T>;

/// Query for event rows within a start-time window, soonest first.
const QUERY_EVENTS_IN_WINDOW: &str = "\
SELECT Calendar_StartDateUTC, Calendar_EndDateUTC, PathToDataFile,
       Calendar_UID, Record_ModDate
FROM CalendarEvents
WHERE Calendar_StartDateUTC >= ?1 AND Calendar_StartDateUTC <= ?2
ORDER BY Calendar_StartDateUTC";

/// Inclusive bounds, in raw minute units, of one index query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QueryWindow {
    pub units_beg: RawUnits,
    pub units_end: RawUnits,
}

impl QueryWindow {
    /// The window `[day-start of `from`, day-start + `days`]` in UTC.
    pub fn from_day_start(
        from: &DateTimeL,
        days: u32,
    ) -> QueryWindow {
        let day_beg: DateTimeL = from
            .with_timezone(&*TZ_UTC)
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .with_timezone(&*TZ_UTC);
        let day_end: DateTimeL = day_beg + Duration::days(days as i64);

        QueryWindow {
            units_beg: datetime_to_units(&day_beg),
            units_end: datetime_to_units(&day_end),
        }
    }

    /// The window starting today, per the system clock.
    pub fn from_today(days: u32) -> QueryWindow {
        let now: DateTimeL = Utc::now().with_timezone(&*TZ_UTC);

        QueryWindow::from_day_start(&now, days)
    }
}

/// A read-only connection to the application's SQLite index.
pub struct IndexReader {
    conn: Connection,
    path: FPath,
}

impl fmt::Debug for IndexReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("IndexReader")
            .field("path", &self.path)
            .finish()
    }
}

impl IndexReader {
    /// Open the index at `path` read-only.
    pub fn open(path: &FPath) -> ResultSqlite<IndexReader> {
        defn!("({:?})", path);
        let conn: Connection =
            Connection::open_with_flags(fpath_to_path(path), OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        defx!("opened");

        Ok(IndexReader {
            conn,
            path: path.clone(),
        })
    }

    /// Wrap an already-open connection. For tests exercising the query
    /// against a synthetic index.
    #[doc(hidden)]
    pub fn from_connection(
        conn: Connection,
        path: FPath,
    ) -> IndexReader {
        IndexReader { conn, path }
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    /// Event rows whose start instant falls within `window`, ordered by
    /// start instant ascending.
    pub fn query_window(
        &self,
        window: &QueryWindow,
    ) -> ResultSqlite<Vec<DbEvent>> {
        defn!("({:?})", window);
        let mut stmt = self.conn.prepare(QUERY_EVENTS_IN_WINDOW)?;
        let rows = stmt.query_map(
            [window.units_beg as i64, window.units_end as i64],
            row_to_db_event,
        )?;
        let events: ResultSqlite<Vec<DbEvent>> = rows.collect();
        if let Ok(events_) = events.as_ref() {
            defx!("return {} rows", events_.len());
        }

        events
    }
}

/// Map one `CalendarEvents` row to a [`DbEvent`].
///
/// `Record_ModDate` is stored as either INTEGER or REAL depending on the
/// application version; both are accepted and carried as an integral
/// stamp.
fn row_to_db_event(row: &Row) -> ResultSqlite<DbEvent> {
    let start_units: i64 = row.get(0)?;
    let end_units: i64 = row.get(1)?;
    let data_path: String = row.get(2)?;
    let record_id: Option<String> = row.get(3)?;
    let mod_stamp: Option<f64> = row.get(4)?;

    Ok(DbEvent {
        start_units: clamp_units(start_units),
        end_units: clamp_units(end_units),
        data_path,
        record_id,
        mod_stamp: mod_stamp.map(|stamp| stamp as ModStamp),
    })
}

/// Clamp a stored minute count into `RawUnits`; the index occasionally
/// holds sentinel values outside `u32`.
const fn clamp_units(value: i64) -> RawUnits {
    if value < 0 {
        0
    } else if value > RawUnits::MAX as i64 {
        RawUnits::MAX
    } else {
        value as RawUnits
    }
}
