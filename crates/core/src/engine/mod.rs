use std::time::Instant;

use crate::{
    snapshot, transition, ActiveCue, CanonicalStore, Clock, CueId, CueStatusEvent, EngineConfig,
    FullShowState, InboundMessage, MonotonicClock, Projection, SyncSnapshot, SyncedEntry,
};

/// Owner of the playback state of a connected show.
///
/// Feed it transport messages as they arrive and call [`ShowStateEngine::tick`]
/// once per rendered frame; then read [`ShowStateEngine::active_cues`]. All
/// calls are expected to come from one logical queue, which is why the engine
/// needs `&mut self` and holds no locks. Hosts that share it across threads
/// should wrap it in a single mutex.
#[derive(Debug)]
pub struct ShowStateEngine<C: Clock = MonotonicClock> {
    config: EngineConfig,
    clock: C,
    store: CanonicalStore,
    projection: Projection,
    playback_cursor: Option<CueId>,
}

impl ShowStateEngine<MonotonicClock> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl Default for ShowStateEngine<MonotonicClock> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C: Clock> ShowStateEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            store: CanonicalStore::new(),
            projection: Projection::new(),
            playback_cursor: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Dispatches a decoded transport message to the matching handler.
    pub fn handle_message(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::CueStatus(event) => self.apply_event(event),
            InboundMessage::SyncState(snapshot) => self.apply_snapshot(snapshot),
            InboundMessage::PlaybackCursorMoved { cue_id } => {
                self.set_playback_cursor(cue_id.clone())
            }
            InboundMessage::ShowState(state) => self.apply_full_state(state),
            InboundMessage::Other(kind) => {
                tracing::trace!(%kind, "ignoring message unrelated to playback state");
            }
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: &SyncSnapshot) {
        let now = self.clock.now();
        snapshot::apply_snapshot(&mut self.store, snapshot, &self.config, now);
    }

    pub fn apply_full_state(&mut self, state: &FullShowState) {
        let now = self.clock.now();
        self.playback_cursor = state.playback_cursor.clone();
        snapshot::apply_full_state(&mut self.store, &mut self.projection, state, now);
    }

    pub fn apply_event(&mut self, event: &CueStatusEvent) {
        let now = self.clock.now();
        transition::apply_event(&mut self.store, &mut self.projection, event, now);
    }

    pub fn set_playback_cursor(&mut self, cue_id: Option<CueId>) {
        self.playback_cursor = cue_id;
    }

    /// Forgets every cue, as after a lost connection.
    pub fn reset(&mut self) {
        self.apply_full_state(&FullShowState::new());
    }

    /// Recomputes the projection for a frame rendered at `now`.
    pub fn tick(&mut self, now: Instant) -> &Projection {
        self.projection
            .tick(&self.store, self.config.latency_compensation, now);
        &self.projection
    }

    /// [`ShowStateEngine::tick`] using the engine's own clock.
    pub fn tick_now(&mut self) -> &Projection {
        let now = self.clock.now();
        self.tick(now)
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn active_cues(&self) -> impl Iterator<Item = &ActiveCue> {
        self.projection.iter()
    }

    pub fn active_cue(&self, cue_id: &str) -> Option<&ActiveCue> {
        self.projection.get(cue_id)
    }

    pub fn synced_entry(&self, cue_id: &str) -> Option<&SyncedEntry> {
        self.store.get(cue_id)
    }

    pub fn playback_cursor(&self) -> Option<&str> {
        self.playback_cursor.as_deref()
    }

    /// Current round-trip latency estimate in seconds.
    pub fn latency(&self) -> f64 {
        self.store.latency()
    }

    /// `true` when no cue is known to be active.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty() && self.projection.is_empty()
    }
}
