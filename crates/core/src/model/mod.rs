use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a cue as sent by the audio engine.
pub type CueId = String;

/// Playback status of a cue on the remote engine.
///
/// The last three variants are terminal: they are never stored, they only
/// cause the cue to be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    Loaded,
    PreWaiting,
    PreWaitPaused,
    Playing,
    Paused,
    Stopping,
    Stopped,
    Completed,
    Error,
}

impl PlaybackStatus {
    /// Returns `true` for statuses that remove the cue instead of being stored.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed | Self::Error)
    }

    /// Returns `true` while the remote clock of the cue is running, i.e. its
    /// position has to be extrapolated between updates.
    pub fn is_advancing(self) -> bool {
        matches!(self, Self::PreWaiting | Self::Playing | Self::Stopping)
    }
}

/// Cue-type specific parameters attached to a running cue.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateParam {
    #[default]
    None,
    Audio(AudioStateParam),
    Wait,
}

impl StateParam {
    /// Whether the position wraps around at the end of the cue.
    pub fn is_repeating(&self) -> bool {
        matches!(self, Self::Audio(AudioStateParam { repeating: true }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStateParam {
    pub repeating: bool,
}

/// Row of the canonical store: the last authoritative knowledge about a cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncedEntry {
    /// Position in seconds as last reported by the engine.
    pub position: f64,
    pub status: PlaybackStatus,
    /// Local monotonic time at which `position` was received.
    pub last_synced_at: Instant,
}

impl SyncedEntry {
    pub fn new(position: f64, status: PlaybackStatus, last_synced_at: Instant) -> Self {
        Self {
            position,
            status,
            last_synced_at,
        }
    }
}

/// Projected, display-ready state of an active cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCue {
    pub cue_id: CueId,
    pub position: f64,
    pub duration: f64,
    pub status: PlaybackStatus,
    pub params: StateParam,
}

impl ActiveCue {
    /// Brings `position` into the displayable range of this cue.
    pub fn bound(&self, position: f64) -> f64 {
        bound_position(position, self.duration, self.params.is_repeating())
    }

    /// Placeholder used when the canonical store knows a cue before any
    /// lifecycle event told us its duration.
    pub fn placeholder(cue_id: CueId, entry: &SyncedEntry) -> Self {
        Self {
            cue_id,
            position: entry.position,
            duration: 0.0,
            status: entry.status,
            params: StateParam::None,
        }
    }
}

/// Keeps a position within `[0, duration]`, or `[0, duration)` when the cue
/// repeats. Without a known duration only the lower bound applies.
pub fn bound_position(position: f64, duration: f64, repeating: bool) -> f64 {
    if position.is_nan() {
        return 0.0;
    }
    if duration.is_nan() || duration <= 0.0 {
        return position.max(0.0);
    }

    let bounded = position.clamp(0.0, duration);
    if repeating && bounded >= duration {
        0.0
    } else {
        bounded
    }
}

/// Per-cue record carried by a full show state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCueRecord {
    pub position: f64,
    pub duration: f64,
    pub status: PlaybackStatus,
    #[serde(default)]
    pub params: StateParam,
}

/// Complete state of the show, sent on (re)connect or on explicit resync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullShowState {
    #[serde(default)]
    pub playback_cursor: Option<CueId>,
    #[serde(default)]
    pub active_cues: IndexMap<CueId, Option<ActiveCueRecord>>,
}

impl FullShowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cue(mut self, cue_id: impl Into<CueId>, record: ActiveCueRecord) -> Self {
        self.active_cues.insert(cue_id.into(), Some(record));
        self
    }
}
