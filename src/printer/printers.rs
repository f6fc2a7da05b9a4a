// src/printer/printers.rs

//! A [`CsvPrinter`] serializes each [`EventRecord`] as one row of the
//! flat tabular export, and [`print_summary`] renders a [`RunSummary`].
//!
//! Every text cell is flattened first: line breaks become spaces, control
//! characters are removed, whitespace runs collapse. A raw subject line
//! must never be able to break the CSV framing.
//!
//! [`CsvPrinter`]: self::CsvPrinter
//! [`EventRecord`]: crate::data::event::EventRecord
//! [`print_summary`]: self::print_summary
//! [`RunSummary`]: crate::readers::summary::RunSummary

use std::io::Write;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};
use ::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::data::datetime::{
    format_datetime_local,
    format_datetime_utc,
    tz_offset_label,
    FixedOffset,
};
use crate::data::event::EventRecord;
use crate::data::text::collapse_whitespace;
use crate::readers::summary::RunSummary;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CSV export
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The export header, one name per column.
pub const CSV_FIELD_NAMES: [&str; 12] = [
    "Calendar_UID",
    "Record_ModDate",
    "Subject",
    "Location",
    "Organizer",
    "Duration",
    "Starts",
    "Ends",
    "Starts_UTC",
    "Ends_UTC",
    "Body",
    "PathToDataFile",
];

/// Flatten a text field into one CSV cell: line breaks to spaces, control
/// characters removed, whitespace runs collapsed.
pub fn flatten_csv_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .map(|c| match c {
            '\r' | '\n' => ' ',
            _ => c,
        })
        .filter(|c| !c.is_control())
        .collect();

    collapse_whitespace(&kept)
}

/// Writes [`EventRecord`]s as CSV rows, times rendered both in the user
/// timezone and UTC.
///
/// [`EventRecord`]: crate::data::event::EventRecord
pub struct CsvPrinter<W: Write> {
    writer: ::csv::Writer<W>,
    tz: FixedOffset,
}

impl<W: Write> CsvPrinter<W> {
    /// Create a `CsvPrinter` and write the header row.
    pub fn new(
        writer: W,
        tz: FixedOffset,
    ) -> ::csv::Result<CsvPrinter<W>> {
        let mut writer = ::csv::Writer::from_writer(writer);
        writer.write_record(CSV_FIELD_NAMES)?;

        Ok(CsvPrinter { writer, tz })
    }

    /// Serialize one record as one row. Absent fields are empty cells.
    pub fn write_event(
        &mut self,
        record: &EventRecord,
    ) -> ::csv::Result<()> {
        defñ!("({:?})", record.source_path);
        let starts: String = record
            .start
            .as_ref()
            .map(|dt| format_datetime_local(dt, &self.tz))
            .unwrap_or_default();
        let ends: String = record
            .end
            .as_ref()
            .map(|dt| format_datetime_local(dt, &self.tz))
            .unwrap_or_default();
        let starts_utc: String = record
            .start
            .as_ref()
            .map(format_datetime_utc)
            .unwrap_or_default();
        let ends_utc: String = record
            .end
            .as_ref()
            .map(format_datetime_utc)
            .unwrap_or_default();
        let duration: String = record
            .duration_hours
            .map(|hours| format!("{:.1}", hours))
            .unwrap_or_default();
        let mod_stamp: String = record
            .mod_stamp
            .map(|stamp| stamp.to_string())
            .unwrap_or_default();

        self.writer.write_record(&[
            flatten_csv_text(record.record_id.as_deref().unwrap_or("")),
            mod_stamp,
            flatten_csv_text(record.subject.as_deref().unwrap_or("")),
            flatten_csv_text(record.location.as_deref().unwrap_or("")),
            flatten_csv_text(record.organizer.as_deref().unwrap_or("")),
            duration,
            starts,
            ends,
            starts_utc,
            ends_utc,
            flatten_csv_text(record.body.as_deref().unwrap_or("")),
            flatten_csv_text(&record.source_path),
        ])
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Unwrap to the underlying writer, flushing buffered rows.
    pub fn into_inner(
        self,
    ) -> std::result::Result<W, ::csv::IntoInnerError<::csv::Writer<W>>> {
        self.writer.into_inner()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// summary printing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Print a run summary to stdout.
pub fn print_summary(
    summary: &RunSummary,
    tz: &FixedOffset,
    color_choice: ColorChoice,
) -> std::io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    writeln!(stdout, "Summary:")?;
    stdout.reset()?;
    writeln!(stdout, "  user timezone           {}", tz_offset_label(tz))?;
    writeln!(stdout, "  files processed         {}", summary.files_processed)?;
    writeln!(stdout, "  files missing           {}", summary.files_missing)?;
    writeln!(stdout, "  files unreadable        {}", summary.files_unreadable)?;
    writeln!(stdout, "  subject via marker      {}", summary.subject_marker)?;
    writeln!(stdout, "  subject via markup      {}", summary.subject_htmlmeta)?;
    writeln!(stdout, "  subject via harvest     {}", summary.subject_harvest)?;
    writeln!(stdout, "  subject absent          {}", summary.subject_absent)?;
    writeln!(stdout, "  location present        {}", summary.location_present)?;
    writeln!(stdout, "  organizer present       {}", summary.organizer_present)?;
    writeln!(stdout, "  body present            {}", summary.body_present)?;
    writeln!(stdout, "  start+end present       {}", summary.interval_present)?;

    stdout.flush()
}
