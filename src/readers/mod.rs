// src/readers/mod.rs

//! "Readers" for _occlib_.
//!
//! ## Overview of readers
//!
//! * An [`IndexReader`] queries the application's SQLite index for the
//!   authoritative event rows of a date window.
//! * An [`EventReader`] reads one binary event file and drives the pure
//!   decode core over its bytes.
//! * A [`SyncCache`] persists synchronization state between runs; its
//!   [`plan_sync`] diffs an export against it.
//! * A [`RunSummary`] accumulates batch statistics.
//!
//! The _occ_ binary program uses one `EventReader` per data file referenced
//! by the index rows, decoding files on a bounded worker pool.
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`IndexReader`]: crate::readers::indexreader::IndexReader
//! [`EventReader`]: crate::readers::eventreader::EventReader
//! [`SyncCache`]: crate::readers::synccache::SyncCache
//! [`plan_sync`]: crate::readers::synccache::plan_sync
//! [`RunSummary`]: crate::readers::summary::RunSummary
//! [`Read`]: std::io::Read

pub mod eventreader;
pub mod helpers;
pub mod indexreader;
pub mod summary;
pub mod synccache;
