use std::{collections::HashMap, time::Instant};

use indexmap::IndexMap;

use crate::{
    ActiveCue, CanonicalStore, EngineConfig, FullShowState, PlaybackStatus, Projection,
    SyncSnapshot, SyncedEntry,
};

/// Applies a periodic position snapshot to the canonical store.
///
/// Positions are re-anchored at `now`; statuses are never touched. A cue the
/// store has never heard of is an inconsistency: it is recorded as playing
/// from zero and reported, never rejected.
pub fn apply_snapshot(
    store: &mut CanonicalStore,
    snapshot: &SyncSnapshot,
    config: &EngineConfig,
    now: Instant,
) {
    store.set_latency(config.latency_seconds(snapshot.latency));

    for cue in &snapshot.cues {
        match store.get_mut(&cue.id) {
            Some(entry) => {
                entry.position = cue.position;
                entry.last_synced_at = now;
            }
            None => {
                tracing::warn!(cue_id = %cue.id, "sync snapshot references an unknown cue");
                store.insert(
                    cue.id.clone(),
                    SyncedEntry::new(0.0, PlaybackStatus::Playing, now),
                );
            }
        }
    }
}

/// Rebuilds both the canonical store and the projection from a full show
/// state. Nothing from before survives; `null` and terminal records are
/// dropped.
pub fn apply_full_state(
    store: &mut CanonicalStore,
    projection: &mut Projection,
    state: &FullShowState,
    now: Instant,
) {
    let mut entries = HashMap::with_capacity(state.active_cues.len());
    let mut cues = IndexMap::with_capacity(state.active_cues.len());

    for (cue_id, record) in &state.active_cues {
        let Some(record) = record else {
            continue;
        };
        if record.status.is_terminal() {
            tracing::trace!(%cue_id, status = ?record.status, "ignoring finished cue");
            continue;
        }

        entries.insert(
            cue_id.clone(),
            SyncedEntry::new(record.position, record.status, now),
        );
        let mut cue = ActiveCue {
            cue_id: cue_id.clone(),
            position: record.position,
            duration: record.duration,
            status: record.status,
            params: record.params,
        };
        cue.position = cue.bound(cue.position);
        cues.insert(cue_id.clone(), cue);
    }

    tracing::debug!(active_cues = entries.len(), "replacing show state");
    store.replace(entries);
    projection.replace(cues);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{ActiveCueRecord, CueSnapshot, LatencyUnit, StateParam};

    fn record(position: f64, status: PlaybackStatus) -> ActiveCueRecord {
        ActiveCueRecord {
            position,
            duration: 20.0,
            status,
            params: StateParam::None,
        }
    }

    #[test]
    fn snapshot_reanchors_positions_but_keeps_status() {
        let then = Instant::now();
        let now = then + Duration::from_secs(3);
        let mut store = CanonicalStore::new();
        store.insert(
            "a".into(),
            SyncedEntry::new(1.0, PlaybackStatus::Stopping, then),
        );

        let snapshot = SyncSnapshot {
            latency: 0.04,
            cues: vec![CueSnapshot::new("a", 3.5)],
        };
        apply_snapshot(&mut store, &snapshot, &EngineConfig::default(), now);

        let entry = store.get("a").unwrap();
        assert_eq!(entry.position, 3.5);
        assert_eq!(entry.status, PlaybackStatus::Stopping);
        assert_eq!(entry.last_synced_at, now);
        assert!((store.latency() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn snapshot_for_unknown_cue_fabricates_a_playing_entry() {
        let now = Instant::now();
        let mut store = CanonicalStore::new();

        let snapshot = SyncSnapshot {
            latency: 0.0,
            cues: vec![CueSnapshot::new("ghost", 7.0)],
        };
        apply_snapshot(&mut store, &snapshot, &EngineConfig::default(), now);

        let entry = store.get("ghost").unwrap();
        assert_eq!(entry.status, PlaybackStatus::Playing);
        assert_eq!(entry.position, 0.0);
    }

    #[test]
    fn latency_is_last_write_wins_and_converted() {
        let config = EngineConfig {
            latency_unit: LatencyUnit::Milliseconds,
            ..EngineConfig::default()
        };
        let mut store = CanonicalStore::new();
        let now = Instant::now();

        for latency in [30.0, 80.0] {
            let snapshot = SyncSnapshot {
                latency,
                cues: Vec::new(),
            };
            apply_snapshot(&mut store, &snapshot, &config, now);
        }

        assert!((store.latency() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn full_state_replaces_everything() {
        let now = Instant::now();
        let mut store = CanonicalStore::new();
        let mut projection = Projection::new();
        store.insert(
            "old".into(),
            SyncedEntry::new(1.0, PlaybackStatus::Playing, now),
        );
        projection.tick(&store, 0.5, now);

        let mut state = FullShowState::new()
            .with_cue("a", record(2.0, PlaybackStatus::Paused))
            .with_cue("done", record(0.0, PlaybackStatus::Completed));
        state.active_cues.insert("empty".into(), None);
        apply_full_state(&mut store, &mut projection, &state, now);

        assert_eq!(store.len(), 1);
        assert_eq!(projection.len(), 1);
        assert!(!store.contains("old"));
        let cue = projection.get("a").unwrap();
        assert_eq!(cue.duration, 20.0);
        assert_eq!(cue.status, PlaybackStatus::Paused);
    }

    #[test]
    fn full_state_is_idempotent() {
        let now = Instant::now();
        let mut store = CanonicalStore::new();
        let mut projection = Projection::new();
        let playing = record(2.0, PlaybackStatus::Playing);
        let state = FullShowState::new().with_cue("a", playing);

        apply_full_state(&mut store, &mut projection, &state, now);
        let first: Vec<_> = projection.iter().cloned().collect();
        apply_full_state(&mut store, &mut projection, &state, now);
        let second: Vec<_> = projection.iter().cloned().collect();

        assert_eq!(first, second);
        assert_eq!(store.get("a").unwrap().position, 2.0);
    }

    #[test]
    fn empty_full_state_clears_both_structures() {
        let now = Instant::now();
        let mut store = CanonicalStore::new();
        let mut projection = Projection::new();
        let playing = record(2.0, PlaybackStatus::Playing);
        let state = FullShowState::new().with_cue("a", playing);
        apply_full_state(&mut store, &mut projection, &state, now);

        apply_full_state(&mut store, &mut projection, &FullShowState::new(), now);

        assert!(store.is_empty());
        assert!(projection.is_empty());
    }
}
