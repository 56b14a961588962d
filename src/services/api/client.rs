use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::config::BackendConfig;

use super::types::{
    AuthStatus, DevicePage, PauseRequest, PlayRequest, PlaylistPage, TokenResponse,
    TransferRequest, VolumeRequest,
};
use super::{ApiError, BackendApi, CurrentPlayback, PlaylistSummary, RemoteDevice, TrackPayload};

/// Header that bypasses the tunneling provider's browser interstitial.
const TUNNEL_BYPASS_HEADER: (&str, &str) = ("ngrok-skip-browser-warning", "true");

/// Reqwest-backed implementation of [`BackendApi`].
///
/// Carries a cookie jar so session credentials established by the auth flow
/// accompany every request, mirroring the browser client's
/// `credentials: 'include'` fetches.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(format!("platter/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .header(TUNNEL_BYPASS_HEADER.0, TUNNEL_BYPASS_HEADER.1)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http
            .put(self.url(path))
            .header(TUNNEL_BYPASS_HEADER.0, TUNNEL_BYPASS_HEADER.1)
    }

    /// Maps auth-shaped failure statuses to [`ApiError::Restricted`].
    fn check_status(response: Response) -> Result<Response, ApiError> {
        match response.status() {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Restricted),
            s => Err(ApiError::Status(s.as_u16())),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = Self::check_status(self.get(path).send().await?)?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn put_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self.put(path).json(body).send().await?;
        Self::check_status(response)?;
        Ok(())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn auth_status(&self) -> Result<bool, ApiError> {
        let status: AuthStatus = self.get_json("/api/auth/status").await?;
        Ok(status.authenticated)
    }

    async fn access_token(&self) -> Result<String, ApiError> {
        let token: TokenResponse = self.get_json("/api/spotify/token").await?;
        Ok(token.access_token)
    }

    async fn devices(&self) -> Result<Vec<RemoteDevice>, ApiError> {
        let page: DevicePage = self.get_json("/api/spotify/devices").await?;
        Ok(page.devices)
    }

    async fn transfer(&self, device_id: &str, play: bool) -> Result<(), ApiError> {
        debug!(device_id, play, "Transferring playback");
        self.put_json("/api/spotify/transfer", &TransferRequest { device_id, play })
            .await
    }

    async fn play(&self, device_id: &str, uri: &str) -> Result<(), ApiError> {
        debug!(device_id, uri, "Starting playback");
        self.put_json(
            "/api/spotify/play",
            &PlayRequest {
                device_id,
                uris: vec![uri],
            },
        )
        .await
    }

    async fn pause(&self, device_id: &str) -> Result<(), ApiError> {
        debug!(device_id, "Pausing playback");
        self.put_json("/api/spotify/pause", &PauseRequest { device_id })
            .await
    }

    async fn set_volume(&self, device_id: &str, volume_percent: u8) -> Result<(), ApiError> {
        self.put_json(
            "/api/spotify/volume",
            &VolumeRequest {
                device_id,
                volume_percent,
            },
        )
        .await
    }

    async fn current_playback(&self) -> Result<CurrentPlayback, ApiError> {
        let current: CurrentPlayback = self.get_json("/api/spotify/current").await?;

        if current.error.as_deref() == Some("premium_required") {
            return Err(ApiError::Restricted);
        }

        Ok(current)
    }

    async fn songs(&self) -> Result<Vec<TrackPayload>, ApiError> {
        self.get_json("/api/songs").await
    }

    async fn playlists(&self) -> Result<Vec<PlaylistSummary>, ApiError> {
        let page: PlaylistPage = self.get_json("/api/spotify/playlists").await?;
        Ok(page.items.into_iter().map(Into::into).collect())
    }

    async fn playlist_songs(&self, playlist_id: &str) -> Result<Vec<TrackPayload>, ApiError> {
        self.get_json(&format!("/api/spotify/playlists/{playlist_id}/songs"))
            .await
    }
}
