use std::time::Instant;

use crate::{
    ActiveCue, CanonicalStore, CueStatusEvent, PlaybackStatus, Projection, StateParam, SyncedEntry,
};

/// Applies one lifecycle event to the per-cue state machine.
///
/// Events that create a cue (`loaded`, `preWaitStarted`, `started`) overwrite
/// whatever was there. Events that only move an existing cue are ignored when
/// the cue is unknown. Terminal events drop the canonical entry; the
/// projection follows on the next tick.
pub fn apply_event(
    store: &mut CanonicalStore,
    projection: &mut Projection,
    event: &CueStatusEvent,
    now: Instant,
) {
    if let Some(cue_id) = event.cue_id() {
        tracing::debug!(kind = event.kind(), %cue_id, "cue status event");
    }

    match event {
        CueStatusEvent::Loaded {
            cue_id,
            position,
            duration,
        } => {
            let status = PlaybackStatus::Loaded;
            store.insert(cue_id.clone(), SyncedEntry::new(*position, status, now));
            projection.upsert(ActiveCue {
                cue_id: cue_id.clone(),
                position: *position,
                duration: *duration,
                status,
                params: StateParam::None,
            });
        }
        CueStatusEvent::PreWaitStarted { cue_id, duration } => {
            let status = PlaybackStatus::PreWaiting;
            store.insert(cue_id.clone(), SyncedEntry::new(0.0, status, now));
            projection.upsert(ActiveCue {
                cue_id: cue_id.clone(),
                position: 0.0,
                duration: *duration,
                status,
                params: StateParam::None,
            });
        }
        CueStatusEvent::PreWaitPaused { cue_id, position } => {
            store.insert(
                cue_id.clone(),
                SyncedEntry::new(*position, PlaybackStatus::PreWaitPaused, now),
            );
        }
        CueStatusEvent::PreWaitResumed { cue_id } => {
            resume(store, cue_id, PlaybackStatus::PreWaiting, now);
        }
        CueStatusEvent::PreWaitCompleted { .. } => {
            // The engine follows up with `started` for the same cue.
        }
        CueStatusEvent::Started {
            cue_id,
            duration,
            params,
        } => {
            let status = PlaybackStatus::Playing;
            store.insert(cue_id.clone(), SyncedEntry::new(0.0, status, now));
            projection.upsert(ActiveCue {
                cue_id: cue_id.clone(),
                position: 0.0,
                duration: *duration,
                status,
                params: *params,
            });
        }
        CueStatusEvent::Paused { cue_id, position } => {
            store.insert(
                cue_id.clone(),
                SyncedEntry::new(*position, PlaybackStatus::Paused, now),
            );
            if let Some(cue) = projection.get_mut(cue_id) {
                cue.position = cue.bound(*position);
            }
        }
        CueStatusEvent::Resumed { cue_id } => {
            resume(store, cue_id, PlaybackStatus::Playing, now);
        }
        CueStatusEvent::Stopping { cue_id } => {
            // The fade-out keeps running from the current anchor; moving it
            // here would snap the display back to the last synced position.
            if let Some(entry) = store.get_mut(cue_id) {
                entry.status = PlaybackStatus::Stopping;
            }
        }
        CueStatusEvent::Seeked { cue_id, position } => {
            if let Some(entry) = store.get_mut(cue_id) {
                entry.position = *position;
                entry.last_synced_at = now;
            }
            if let Some(cue) = projection.get_mut(cue_id) {
                cue.position = cue.bound(*position);
            }
        }
        CueStatusEvent::PreWaitStopped { cue_id }
        | CueStatusEvent::Stopped { cue_id }
        | CueStatusEvent::Completed { cue_id } => {
            store.remove(cue_id);
        }
        CueStatusEvent::Error { cue_id, error } => {
            tracing::warn!(%cue_id, %error, "cue reported an error");
            store.remove(cue_id);
        }
        CueStatusEvent::StateParamUpdated { cue_id, params } => {
            if let Some(cue) = projection.get_mut(cue_id) {
                cue.params = *params;
                cue.position = cue.bound(cue.position);
            }
        }
        CueStatusEvent::Unknown => {
            tracing::trace!("ignoring unknown cue status event");
        }
    }
}

/// Restarts the clock of a paused cue. Its position stays, only the anchor
/// moves to `now`.
fn resume(store: &mut CanonicalStore, cue_id: &str, status: PlaybackStatus, now: Instant) {
    if let Some(entry) = store.get_mut(cue_id) {
        entry.status = status;
        entry.last_synced_at = now;
    }
}
