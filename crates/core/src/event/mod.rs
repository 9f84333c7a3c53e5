use serde::{Deserialize, Serialize};

use crate::{CueId, FullShowState, Result, StateParam};

/// Periodic, partial position update for every running cue.
///
/// `latency` is the round-trip time measured by the transport. The unit is
/// set by [`crate::EngineConfig::latency_unit`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub latency: f64,
    pub cues: Vec<CueSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueSnapshot {
    pub id: CueId,
    pub position: f64,
}

impl CueSnapshot {
    pub fn new(id: impl Into<CueId>, position: f64) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Discrete playback transition pushed by the engine for a single cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum CueStatusEvent {
    Loaded {
        cue_id: CueId,
        #[serde(default)]
        position: f64,
        duration: f64,
    },
    PreWaitStarted {
        cue_id: CueId,
        duration: f64,
    },
    PreWaitPaused {
        cue_id: CueId,
        position: f64,
    },
    PreWaitResumed {
        cue_id: CueId,
    },
    PreWaitStopped {
        cue_id: CueId,
    },
    PreWaitCompleted {
        cue_id: CueId,
    },
    Started {
        cue_id: CueId,
        duration: f64,
        #[serde(default)]
        params: StateParam,
    },
    Paused {
        cue_id: CueId,
        position: f64,
    },
    Resumed {
        cue_id: CueId,
    },
    Stopping {
        cue_id: CueId,
    },
    Seeked {
        cue_id: CueId,
        position: f64,
    },
    Stopped {
        cue_id: CueId,
    },
    Completed {
        cue_id: CueId,
    },
    Error {
        cue_id: CueId,
        #[serde(default)]
        error: String,
    },
    StateParamUpdated {
        cue_id: CueId,
        params: StateParam,
    },
    /// Any event kind this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl CueStatusEvent {
    /// Cue the event refers to. `None` only for [`CueStatusEvent::Unknown`].
    pub fn cue_id(&self) -> Option<&str> {
        match self {
            Self::Loaded { cue_id, .. }
            | Self::PreWaitStarted { cue_id, .. }
            | Self::PreWaitPaused { cue_id, .. }
            | Self::PreWaitResumed { cue_id }
            | Self::PreWaitStopped { cue_id }
            | Self::PreWaitCompleted { cue_id }
            | Self::Started { cue_id, .. }
            | Self::Paused { cue_id, .. }
            | Self::Resumed { cue_id }
            | Self::Stopping { cue_id }
            | Self::Seeked { cue_id, .. }
            | Self::Stopped { cue_id }
            | Self::Completed { cue_id }
            | Self::Error { cue_id, .. }
            | Self::StateParamUpdated { cue_id, .. } => Some(cue_id),
            Self::Unknown => None,
        }
    }

    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::PreWaitStarted { .. } => "preWaitStarted",
            Self::PreWaitPaused { .. } => "preWaitPaused",
            Self::PreWaitResumed { .. } => "preWaitResumed",
            Self::PreWaitStopped { .. } => "preWaitStopped",
            Self::PreWaitCompleted { .. } => "preWaitCompleted",
            Self::Started { .. } => "started",
            Self::Paused { .. } => "paused",
            Self::Resumed { .. } => "resumed",
            Self::Stopping { .. } => "stopping",
            Self::Seeked { .. } => "seeked",
            Self::Stopped { .. } => "stopped",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
            Self::StateParamUpdated { .. } => "stateParamUpdated",
            Self::Unknown => "unknown",
        }
    }
}

/// Decoded message from the transport, ready to be handed to
/// [`crate::ShowStateEngine::handle_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    CueStatus(CueStatusEvent),
    SyncState(SyncSnapshot),
    PlaybackCursorMoved { cue_id: Option<CueId> },
    ShowState(FullShowState),
    /// Message kinds that do not concern playback state (model edits,
    /// settings, asset results...). Carries the wire kind for logging.
    Other(String),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    param: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CursorMoved {
    #[serde(default)]
    cue_id: Option<CueId>,
}

impl InboundMessage {
    /// Decodes a `{"type": ..., "param": ...}` envelope.
    pub fn from_json(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    /// Same as [`InboundMessage::from_json`] for an already parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let envelope: Envelope = serde_json::from_value(value)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self> {
        let Envelope { kind, param } = envelope;
        let message = match kind.as_str() {
            "cueStatus" => Self::CueStatus(serde_json::from_value(param)?),
            "syncState" => Self::SyncState(serde_json::from_value(param)?),
            "playbackCursorMoved" => {
                let moved: CursorMoved = serde_json::from_value(param)?;
                Self::PlaybackCursorMoved {
                    cue_id: moved.cue_id,
                }
            }
            "showState" => Self::ShowState(serde_json::from_value(param)?),
            _ => Self::Other(kind),
        };
        Ok(message)
    }

    /// Wire name of the message kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::CueStatus(_) => "cueStatus",
            Self::SyncState(_) => "syncState",
            Self::PlaybackCursorMoved { .. } => "playbackCursorMoved",
            Self::ShowState(_) => "showState",
            Self::Other(kind) => kind,
        }
    }
}
