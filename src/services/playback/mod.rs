//! Playback orchestration service.
//!
//! Reconciles three asynchronous sources of truth - the local preview sink,
//! an optionally-connected embedded playback client, and the polled remote
//! device - into one authoritative now-playing snapshot, and routes user
//! playback intents to whichever transport is authoritative for the current
//! track.

/// The playback service itself
pub mod core;
/// Playback error types
pub mod error;
/// Auto-advance debounce guard
pub mod guard;
/// Remote polling and embedded event forwarding
mod monitoring;
/// Elapsed-time interpolation
pub mod progress;
/// Ordered play queue
pub mod queue;
/// Transport adapter seams
pub mod transport;
/// Playback domain types
pub mod types;

pub use self::core::PlaybackService;
pub use error::PlaybackError;
pub use guard::AdvanceGuard;
pub use progress::ProgressBaseline;
pub use queue::PlayQueue;
pub use transport::{
    EmbeddedEvent, EmbeddedPlayer, EmbeddedState, NullPreview, PreviewEvent, PreviewSink,
    TransportError,
};
pub use types::{
    ArtworkBuffers, ArtworkSlot, DeviceId, NowPlaying, PlayerEvent, Track, TrackKey,
    TransportSelection, Volume,
};
