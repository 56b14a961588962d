//! Transport adapter seams.
//!
//! The playback service drives three transports through these traits: a
//! local short-preview sink, an in-process embedded playback client, and the
//! polled remote device (which lives behind [`BackendApi`] and has no trait
//! here because it pushes nothing).
//!
//! [`BackendApi`]: crate::services::api::BackendApi

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::types::{DeviceId, Track, Volume};

/// Errors surfaced by local transport adapters.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Playback could not start (autoplay-policy analog); always swallowed
    /// by the playback service.
    #[error("playback start rejected: {0}")]
    StartRejected(String),

    /// The transport has no loaded media or is not connected.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// A transport command failed.
    #[error("transport command failed: {0}")]
    Command(String),
}

/// Event emitted by a preview sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEvent {
    /// The loaded clip played to its natural end.
    Ended,
}

/// A local single-track audio sink for short preview clips.
#[async_trait]
pub trait PreviewSink: Send + Sync {
    /// Loads a preview clip, replacing any current one.
    async fn load(&self, url: &str) -> Result<(), TransportError>;

    /// Starts playback of the loaded clip.
    ///
    /// # Errors
    /// Returns [`TransportError::StartRejected`] when the environment refuses
    /// to start playback; callers ignore the failure.
    async fn play(&self) -> Result<(), TransportError>;

    /// Pauses playback.
    async fn pause(&self);

    /// Moves the playhead.
    async fn seek(&self, position: Duration);

    /// Sets the sink volume.
    async fn set_volume(&self, volume: Volume);

    /// Subscribes to sink events.
    fn events(&self) -> broadcast::Receiver<PreviewEvent>;
}

/// State report from the embedded playback client.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedState {
    /// Whether the client is paused.
    pub paused: bool,

    /// Playhead position.
    pub position: Duration,

    /// Track duration.
    pub duration: Duration,

    /// The track currently loaded in the client, when known.
    pub track: Option<Track>,
}

/// Event stream payload of the embedded playback client.
#[derive(Debug, Clone)]
pub enum EmbeddedEvent {
    /// The client connected and received a device identifier.
    Ready {
        /// Announced device id.
        device_id: DeviceId,
    },

    /// The client lost its device registration.
    NotReady {
        /// Device id that went away.
        device_id: DeviceId,
    },

    /// The client's playback state changed.
    StateChanged(EmbeddedState),

    /// The client reported an error; logged, never fatal.
    Error(String),
}

/// An in-process playback client bound to a device identifier.
///
/// Construction and authentication (display name, token-provider callback)
/// happen outside this crate; the playback service only consumes the
/// connected client.
#[async_trait]
pub trait EmbeddedPlayer: Send + Sync {
    /// Pauses playback.
    async fn pause(&self) -> Result<(), TransportError>;

    /// Resumes playback.
    async fn resume(&self) -> Result<(), TransportError>;

    /// Moves the playhead.
    async fn seek(&self, position: Duration) -> Result<(), TransportError>;

    /// Sets the client volume.
    async fn set_volume(&self, volume: Volume) -> Result<(), TransportError>;

    /// The client's live state, or None when it is not playing locally.
    ///
    /// A Some return marks the embedded device as the more authoritative
    /// source for the playing flag than remote polls.
    async fn current_state(&self) -> Option<EmbeddedState>;

    /// Subscribes to client events.
    fn events(&self) -> broadcast::Receiver<EmbeddedEvent>;
}

/// Preview sink for environments without audio output.
///
/// Every `play` reports a start rejection, which the playback service
/// swallows; the snapshot then simply stays paused.
pub struct NullPreview {
    events_tx: broadcast::Sender<PreviewEvent>,
}

impl NullPreview {
    /// Creates the sink.
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(8);
        Self { events_tx }
    }
}

impl Default for NullPreview {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreviewSink for NullPreview {
    async fn load(&self, _url: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn play(&self) -> Result<(), TransportError> {
        Err(TransportError::StartRejected(
            "no audio output in this environment".to_string(),
        ))
    }

    async fn pause(&self) {}

    async fn seek(&self, _position: Duration) {}

    async fn set_volume(&self, _volume: Volume) {}

    fn events(&self) -> broadcast::Receiver<PreviewEvent> {
        self.events_tx.subscribe()
    }
}
