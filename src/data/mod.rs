// src/data/mod.rs

//! The `data` module holds the pure decode core: byte-level carving of
//! event-file buffers into [`EventRecord`]s.
//!
//! ## Definitions of data
//!
//! ### Event file
//!
//! An "event file" is one proprietary binary file holding one calendar
//! event, referenced by a row of the application's SQLite index. Its
//! contents are an opaque byte buffer; no public grammar exists.
//!
//! ### MarkerMatch
//!
//! A [`MarkerMatch`] is a validated hit of the length-field sentinel
//! group within the header window; it gives the byte lengths of the
//! subject and location text spans.
//!
//! ### TimestampCandidate
//!
//! A [`TimestampCandidate`] is a 4-byte-aligned integer within the
//! plausible minutes-since-1601 window, found by
//! [`scan_timestamp_candidates`] and paired by [`pair_candidates`].
//!
//! ### EventRecord
//!
//! An [`EventRecord`] is the assembled output: best-effort decoded
//! fields plus pass-through identifiers from the index row. Decoding
//! always produces one, regardless of input.
//!
//! [`MarkerMatch`]: crate::data::event::MarkerMatch
//! [`TimestampCandidate`]: crate::data::datetime::TimestampCandidate
//! [`scan_timestamp_candidates`]: crate::data::datetime::scan_timestamp_candidates
//! [`pair_candidates`]: crate::data::datetime::pair_candidates
//! [`EventRecord`]: crate::data::event::EventRecord

pub mod datetime;
pub mod event;
pub mod html;
pub mod text;
