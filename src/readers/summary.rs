// src/readers/summary.rs

//! A [`RunSummary`] accumulates per-batch statistics about carving
//! outcomes, for the optional `--summary` output.
//!
//! [`RunSummary`]: self::RunSummary

use crate::common::Count;
use crate::data::event::{EventRecord, SubjectStrategy};

/// Counts of carving outcomes across one batch run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    /// Event files read and decoded.
    pub files_processed: Count,
    /// Index rows whose data file could not be found.
    pub files_missing: Count,
    /// Data files found but unreadable.
    pub files_unreadable: Count,
    /// Subjects recovered via the length-field marker path.
    pub subject_marker: Count,
    /// Subjects recovered from markup metadata.
    pub subject_htmlmeta: Count,
    /// Subjects recovered by the string harvester.
    pub subject_harvest: Count,
    /// Records with no recoverable subject.
    pub subject_absent: Count,
    pub location_present: Count,
    pub organizer_present: Count,
    pub body_present: Count,
    /// Records with both a start and an end instant.
    pub interval_present: Count,
}

impl RunSummary {
    /// Account one decoded record.
    pub fn update(
        &mut self,
        record: &EventRecord,
    ) {
        self.files_processed += 1;
        match record.subject_strategy {
            Some(SubjectStrategy::Marker) => self.subject_marker += 1,
            Some(SubjectStrategy::HtmlMeta) => self.subject_htmlmeta += 1,
            Some(SubjectStrategy::Harvest) => self.subject_harvest += 1,
            None => self.subject_absent += 1,
        }
        if record.location.is_some() {
            self.location_present += 1;
        }
        if record.organizer.is_some() {
            self.organizer_present += 1;
        }
        if record.body.is_some() {
            self.body_present += 1;
        }
        if record.start.is_some() && record.end.is_some() {
            self.interval_present += 1;
        }
    }
}
