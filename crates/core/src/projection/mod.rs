use std::time::Instant;

use indexmap::IndexMap;

use crate::{ActiveCue, CanonicalStore, CueId, SyncedEntry};

/// Display-ready view of the active cues, regenerated on every frame from the
/// canonical store.
///
/// Entries survive between ticks only as a cache for `duration` and `params`;
/// positions and statuses are recomputed by [`Projection::tick`].
#[derive(Debug, Default, Clone)]
pub struct Projection {
    cues: IndexMap<CueId, ActiveCue>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cue_id: &str) -> Option<&ActiveCue> {
        self.cues.get(cue_id)
    }

    pub fn get_mut(&mut self, cue_id: &str) -> Option<&mut ActiveCue> {
        self.cues.get_mut(cue_id)
    }

    /// Inserts or overwrites the entry for `cue.cue_id`, bounding its position.
    pub fn upsert(&mut self, mut cue: ActiveCue) {
        cue.position = cue.bound(cue.position);
        self.cues.insert(cue.cue_id.clone(), cue);
    }

    pub fn replace(&mut self, cues: IndexMap<CueId, ActiveCue>) {
        self.cues = cues;
    }

    /// Active cues in the order they first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCue> {
        self.cues.values()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Reconciliation tick: brings every entry in line with `store` as of
    /// `now`, then reaps entries whose cue left the store.
    ///
    /// `latency_compensation` is the share of the stored round-trip latency
    /// added to running positions (0.5 for half-RTT).
    pub fn tick(&mut self, store: &CanonicalStore, latency_compensation: f64, now: Instant) {
        let lead = store.latency() * latency_compensation;

        for (cue_id, entry) in store.iter() {
            let cue = self
                .cues
                .entry(cue_id.clone())
                .or_insert_with(|| ActiveCue::placeholder(cue_id.clone(), entry));

            cue.status = entry.status;

            match extrapolate(entry, cue, lead, now) {
                Some(position) => cue.position = position,
                None if entry.status.is_advancing() && cue.duration > 0.0 => {
                    tracing::trace!(%cue_id, "skipping extrapolation of non-finite position");
                    cue.position = cue.bound(cue.position);
                }
                None => cue.position = cue.bound(cue.position),
            }
        }

        self.cues.retain(|cue_id, _| store.contains(cue_id));
    }
}

/// Position of `cue` at `now`, or `None` when it should stay where it is:
/// the cue is not running, its duration is unknown, or the arithmetic is not
/// finite.
///
/// `lead` is added on top of the elapsed time to account for the age of the
/// reported position when it was captured remotely.
pub fn extrapolate(entry: &SyncedEntry, cue: &ActiveCue, lead: f64, now: Instant) -> Option<f64> {
    if !entry.status.is_advancing() || cue.duration.is_nan() || cue.duration <= 0.0 {
        return None;
    }

    let elapsed = now.saturating_duration_since(entry.last_synced_at).as_secs_f64();
    let candidate = entry.position + lead + elapsed;
    if !candidate.is_finite() {
        return None;
    }

    let position = if cue.params.is_repeating() {
        candidate.rem_euclid(cue.duration)
    } else {
        candidate
    };
    Some(cue.bound(position))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{AudioStateParam, PlaybackStatus, StateParam};

    fn cue(id: &str, duration: f64, params: StateParam) -> ActiveCue {
        ActiveCue {
            cue_id: id.to_string(),
            position: 0.0,
            duration,
            status: PlaybackStatus::Playing,
            params,
        }
    }

    fn looping() -> StateParam {
        StateParam::Audio(AudioStateParam { repeating: true })
    }

    #[test]
    fn repeating_cue_wraps_around() {
        let anchor = Instant::now();
        let entry = SyncedEntry::new(8.0, PlaybackStatus::Playing, anchor);
        let cue = cue("a", 10.0, looping());

        let later = anchor + Duration::from_secs(5);
        let position = extrapolate(&entry, &cue, 0.5, later).unwrap();

        assert!((position - 3.5).abs() < 1e-9);
    }

    #[test]
    fn one_shot_cue_clamps_to_duration() {
        let anchor = Instant::now();
        let entry = SyncedEntry::new(9.0, PlaybackStatus::Playing, anchor);
        let cue = cue("a", 10.0, StateParam::None);

        let later = anchor + Duration::from_secs(5);
        let position = extrapolate(&entry, &cue, 0.0, later).unwrap();

        assert_eq!(position, 10.0);
    }

    #[test]
    fn static_statuses_and_unknown_durations_are_left_alone() {
        let anchor = Instant::now();
        let later = anchor + Duration::from_secs(1);

        let one_shot = cue("a", 10.0, StateParam::None);
        let unknown_length = cue("a", 0.0, StateParam::None);

        let paused = SyncedEntry::new(2.0, PlaybackStatus::Paused, anchor);
        assert_eq!(extrapolate(&paused, &one_shot, 0.0, later), None);

        let playing = SyncedEntry::new(2.0, PlaybackStatus::Playing, anchor);
        assert_eq!(extrapolate(&playing, &unknown_length, 0.0, later), None);

        let broken = SyncedEntry::new(f64::NAN, PlaybackStatus::Playing, anchor);
        assert_eq!(extrapolate(&broken, &one_shot, 0.0, later), None);
    }

    #[test]
    fn frames_before_the_anchor_do_not_go_negative() {
        let anchor = Instant::now() + Duration::from_secs(10);
        let entry = SyncedEntry::new(0.0, PlaybackStatus::Playing, anchor);

        let cue = cue("a", 10.0, StateParam::None);

        let position = extrapolate(&entry, &cue, 0.0, Instant::now()).unwrap();

        assert_eq!(position, 0.0);
    }

    #[test]
    fn tick_creates_placeholders_and_reaps_stale_entries() {
        let now = Instant::now();
        let mut store = CanonicalStore::new();
        store.insert(
            "a".into(),
            SyncedEntry::new(4.0, PlaybackStatus::Playing, now),
        );

        let mut projection = Projection::new();
        projection.upsert(cue("gone", 10.0, StateParam::None));
        projection.tick(&store, 0.5, now + Duration::from_secs(1));

        assert_eq!(projection.len(), 1);
        let placeholder = projection.get("a").unwrap();
        assert_eq!(placeholder.duration, 0.0);
        assert_eq!(placeholder.position, 4.0);
        assert_eq!(placeholder.params, StateParam::None);
        assert!(projection.get("gone").is_none());
    }

    #[test]
    fn ticking_twice_at_the_same_instant_is_stable() {
        let anchor = Instant::now();
        let mut store = CanonicalStore::new();
        store.set_latency(0.2);
        store.insert(
            "a".into(),
            SyncedEntry::new(1.0, PlaybackStatus::Playing, anchor),
        );

        let mut projection = Projection::new();
        projection.upsert(cue("a", 30.0, StateParam::None));

        let frame = anchor + Duration::from_millis(1500);
        projection.tick(&store, 0.5, frame);
        let first = projection.get("a").unwrap().position;
        projection.tick(&store, 0.5, frame);
        let second = projection.get("a").unwrap().position;

        assert_eq!(first, second);
        assert!((first - 2.6).abs() < 1e-9);
    }

    #[test]
    fn repeating_cue_never_lands_on_its_duration() {
        let anchor = Instant::now();
        let entry = SyncedEntry::new(-1e-17, PlaybackStatus::Playing, anchor);

        let cue = cue("a", 10.0, looping());
        let position = extrapolate(&entry, &cue, 0.0, anchor).unwrap();

        assert_eq!(position, 0.0);
    }

    #[test]
    fn tick_bounds_cached_positions_of_static_cues() {
        let now = Instant::now();
        let mut store = CanonicalStore::new();
        store.insert(
            "a".into(),
            SyncedEntry::new(12.0, PlaybackStatus::Paused, now),
        );

        let mut projection = Projection::new();
        let mut paused = cue("a", 10.0, StateParam::None);
        paused.position = 12.0;
        projection.cues.insert("a".into(), paused);
        projection.tick(&store, 0.5, now);

        assert_eq!(projection.get("a").unwrap().position, 10.0);
    }
}
