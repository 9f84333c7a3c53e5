//! Core library of the cue sync client.
//!
//! Keeps track of which cues are running on a remote show-control engine and
//! estimates, for every rendered frame, where each of them is. Two kinds of
//! input feed the [`CanonicalStore`]: sparse position snapshots
//! ([`snapshot`]) and discrete lifecycle events ([`transition`]). Once per
//! frame the [`Projection`] extrapolates the stored positions to "now".
//! [`ShowStateEngine`] ties the pieces together for a host application.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod projection;
pub mod snapshot;
pub mod store;
pub mod transition;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{EngineConfig, LatencyUnit};
pub use engine::ShowStateEngine;
pub use error::{CueSyncError, Result};
pub use event::{CueSnapshot, CueStatusEvent, InboundMessage, SyncSnapshot};
pub use model::{
    bound_position, ActiveCue, ActiveCueRecord, AudioStateParam, CueId, FullShowState,
    PlaybackStatus, StateParam, SyncedEntry,
};
pub use projection::{extrapolate, Projection};
pub use store::CanonicalStore;
