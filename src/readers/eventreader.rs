// src/readers/eventreader.rs

//! Implements an [`EventReader`], the driver of deriving one
//! [`EventRecord`] from one event file on disk.
//!
//! The reader owns file I/O and nothing else; all carving happens in the
//! pure [`decode_event_buffer`]. Failing to *read* a file is an error for
//! the caller to log and skip. Failing to *decode* a file is not possible;
//! decode always yields a record.
//!
//! [`EventReader`]: self::EventReader
//! [`EventRecord`]: crate::data::event::EventRecord
//! [`decode_event_buffer`]: crate::data::event::decode_event_buffer

use std::fmt;
use std::io::Result;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

use crate::common::{Bytes, FPath, FileSz};
use crate::data::event::{decode_event_buffer, DbEvent, DecodeConfig, EventRecord};
use crate::readers::helpers::fpath_to_path;

/// A wrapper holding the bytes of one event file.
///
/// Construction reads the whole file into memory; event files are small
/// (tens of kilobytes). Decoding is then a pure computation over the
/// buffer, so any number of `EventReader`s may decode concurrently with
/// no coordination.
pub struct EventReader {
    /// The event file contents. Immutable once read.
    buffer: Bytes,
    /// The [`FPath`] of the file that was read.
    ///
    /// [`FPath`]: crate::common::FPath
    path: FPath,
    /// File size in bytes.
    filesz: FileSz,
    config: DecodeConfig,
}

impl fmt::Debug for EventReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("EventReader")
            .field("path", &self.path)
            .field("filesz", &self.filesz)
            .finish()
    }
}

impl EventReader {
    /// Create a new `EventReader` by reading the file at `path`.
    pub fn new(
        path: FPath,
        config: DecodeConfig,
    ) -> Result<EventReader> {
        defn!("({:?})", path);
        let buffer: Bytes = std::fs::read(fpath_to_path(&path))?;
        let filesz: FileSz = buffer.len() as FileSz;
        defx!("read {} bytes", filesz);

        Ok(EventReader {
            buffer,
            path,
            filesz,
            config,
        })
    }

    /// Decode the held buffer into an [`EventRecord`], combining it with
    /// the authoritative index row when one is supplied.
    ///
    /// [`EventRecord`]: crate::data::event::EventRecord
    pub fn decode(
        &self,
        db_event: Option<&DbEvent>,
    ) -> EventRecord {
        defñ!("({:?})", self.path);

        decode_event_buffer(&self.buffer, db_event, &self.config)
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub const fn filesz(&self) -> FileSz {
        self.filesz
    }
}
