// src/readers/synccache.rs

//! The decision core of the remote-calendar synchronization pass.
//!
//! A [`SyncCache`] persists, as JSON, the modification stamp each record
//! carried when it was last synchronized. Diffing a fresh export against
//! the cache classifies every record as create/update/skip, and cache
//! entries absent from the current export window are the events deleted
//! since the last run.
//!
//! The remote API itself (authentication, rate limiting, HTTP) is out of
//! scope; this module only decides, it does not transmit.
//!
//! [`SyncCache`]: self::SyncCache

use std::collections::BTreeMap;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;

use ::serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, den, deo, dex, deñ};

use crate::data::event::{EventRecord, ModStamp};

/// A stable record identifier from the index (`Calendar_UID`).
pub type RecordId = String;

/// Persisted map of record id to modification stamp at last sync.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SyncCache {
    pub entries: BTreeMap<RecordId, ModStamp>,
}

impl SyncCache {
    /// Load a cache from `path`. A missing file is an empty cache (the
    /// first run); a present-but-unparseable file is an error.
    pub fn load(path: &Path) -> Result<SyncCache> {
        defn!("({:?})", path);
        if !path.exists() {
            defx!("return empty; no cache file");
            return Ok(SyncCache::default());
        }
        let data: String = std::fs::read_to_string(path)?;
        let cache: SyncCache = serde_json::from_str(&data)
            .map_err(|err| Error::new(ErrorKind::InvalidData, err))?;
        defx!("return {} entries", cache.entries.len());

        Ok(cache)
    }

    /// Write the cache to `path` as pretty JSON.
    pub fn save(
        &self,
        path: &Path,
    ) -> Result<()> {
        defñ!("({:?}; {} entries)", path, self.entries.len());
        let data: String = serde_json::to_string_pretty(self)
            .map_err(|err| Error::new(ErrorKind::InvalidData, err))?;

        std::fs::write(path, data)
    }
}

/// What the synchronization pass should do with one record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncAction {
    /// Not in the cache; a new event.
    Create,
    /// In the cache with a different modification stamp.
    Update,
    /// In the cache, unchanged.
    Skip,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncDecision {
    pub record_id: RecordId,
    pub action: SyncAction,
}

/// The full diff of one export against the cache.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SyncPlan {
    /// One decision per exported record that carries a record id.
    pub decisions: Vec<SyncDecision>,
    /// Cached record ids absent from the current export window; events
    /// deleted (or moved out of the window) since the last run.
    pub deleted: Vec<RecordId>,
    next_entries: BTreeMap<RecordId, ModStamp>,
}

impl SyncPlan {
    /// Counts of (create, update, skip) decisions.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut create: usize = 0;
        let mut update: usize = 0;
        let mut skip: usize = 0;
        for decision in self.decisions.iter() {
            match decision.action {
                SyncAction::Create => create += 1,
                SyncAction::Update => update += 1,
                SyncAction::Skip => skip += 1,
            }
        }

        (create, update, skip)
    }

    /// The cache to persist after this plan is carried out: every current
    /// record id with its current stamp, deletions dropped.
    pub fn next_cache(&self) -> SyncCache {
        SyncCache {
            entries: self.next_entries.clone(),
        }
    }
}

/// Diff `records` against `cache`.
///
/// Records without a record id cannot be tracked and are excluded.
/// `force_update` turns every would-be `Skip` into an `Update`.
pub fn plan_sync(
    records: &[EventRecord],
    cache: &SyncCache,
    force_update: bool,
) -> SyncPlan {
    defn!("({} records, {} cached, force_update {})", records.len(), cache.entries.len(), force_update);
    let mut decisions: Vec<SyncDecision> = Vec::new();
    let mut next_entries: BTreeMap<RecordId, ModStamp> = BTreeMap::new();
    for record in records.iter() {
        let record_id: RecordId = match record.record_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => continue,
        };
        let stamp: ModStamp = record.mod_stamp.unwrap_or(0);
        let action: SyncAction = match cache.entries.get(&record_id) {
            None => SyncAction::Create,
            Some(_) if force_update => SyncAction::Update,
            Some(prev) if *prev != stamp => SyncAction::Update,
            Some(_) => SyncAction::Skip,
        };
        defo!("{:?} {:?}", action, record_id);
        next_entries.insert(record_id.clone(), stamp);
        decisions.push(SyncDecision { record_id, action });
    }
    let deleted: Vec<RecordId> = cache
        .entries
        .keys()
        .filter(|id| !next_entries.contains_key(*id))
        .cloned()
        .collect();
    defx!("return {} decisions, {} deleted", decisions.len(), deleted.len());

    SyncPlan {
        decisions,
        deleted,
        next_entries,
    }
}
