use std::collections::HashMap;

use crate::{CueId, SyncedEntry};

/// Authoritative per-cue state built from snapshots and lifecycle events.
///
/// Written by the snapshot ingestor and the transition handler, read by the
/// projection ticker.
#[derive(Debug, Default, Clone)]
pub struct CanonicalStore {
    entries: HashMap<CueId, SyncedEntry>,
    /// Latest round-trip latency estimate, in seconds.
    latency: f64,
}

impl CanonicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cue_id: &str) -> Option<&SyncedEntry> {
        self.entries.get(cue_id)
    }

    pub fn get_mut(&mut self, cue_id: &str) -> Option<&mut SyncedEntry> {
        self.entries.get_mut(cue_id)
    }

    pub fn contains(&self, cue_id: &str) -> bool {
        self.entries.contains_key(cue_id)
    }

    pub fn insert(&mut self, cue_id: CueId, entry: SyncedEntry) {
        self.entries.insert(cue_id, entry);
    }

    pub fn remove(&mut self, cue_id: &str) -> Option<SyncedEntry> {
        self.entries.remove(cue_id)
    }

    /// Drops every entry and installs `entries` instead.
    pub fn replace(&mut self, entries: HashMap<CueId, SyncedEntry>) {
        self.entries = entries;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CueId, &SyncedEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn set_latency(&mut self, seconds: f64) {
        self.latency = seconds;
    }
}
