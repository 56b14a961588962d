//! Reactive services for backend integration and playback orchestration.

/// Backend REST API client.
pub mod api;
/// Common utilities and abstractions for services.
pub mod common;
/// Playback orchestration service.
pub mod playback;

pub use api::{ApiError, BackendApi, HttpBackend};
pub use playback::{PlaybackService, PlayerEvent};
