//! Backend REST API client.
//!
//! Thin typed wrapper over the backend's HTTP contract: authentication
//! status, device listing, transport commands (transfer/play/pause/volume),
//! the current-playback snapshot, and library retrieval. The orchestrator
//! consumes it through the [`BackendApi`] trait so tests can substitute an
//! in-memory implementation.

mod client;
mod error;
mod types;

pub use client::HttpBackend;
pub use error::ApiError;
pub use types::{
    CurrentPlayback, PlaylistSummary, RemoteDevice, TrackPayload,
};

use async_trait::async_trait;

/// Capability surface of the backend consumed by the playback engine.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Whether the session is authenticated.
    async fn auth_status(&self) -> Result<bool, ApiError>;

    /// Fetches a short-lived access token for the embedded playback client.
    async fn access_token(&self) -> Result<String, ApiError>;

    /// Lists the remote devices known to the service.
    async fn devices(&self) -> Result<Vec<RemoteDevice>, ApiError>;

    /// Transfers playback to a device, optionally starting playback.
    async fn transfer(&self, device_id: &str, play: bool) -> Result<(), ApiError>;

    /// Starts playback of a catalog URI on a device.
    async fn play(&self, device_id: &str, uri: &str) -> Result<(), ApiError>;

    /// Pauses playback on a device.
    async fn pause(&self, device_id: &str) -> Result<(), ApiError>;

    /// Sets a device's volume as an integer percentage.
    async fn set_volume(&self, device_id: &str, volume_percent: u8) -> Result<(), ApiError>;

    /// Fetches the current playback snapshot.
    async fn current_playback(&self) -> Result<CurrentPlayback, ApiError>;

    /// Fetches the full song library.
    async fn songs(&self) -> Result<Vec<TrackPayload>, ApiError>;

    /// Lists the user's playlists.
    async fn playlists(&self) -> Result<Vec<PlaylistSummary>, ApiError>;

    /// Fetches the songs of one playlist.
    async fn playlist_songs(&self, playlist_id: &str) -> Result<Vec<TrackPayload>, ApiError>;
}
