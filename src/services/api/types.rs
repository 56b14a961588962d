use serde::{Deserialize, Serialize};

/// A remote playback device as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDevice {
    /// Stable device identifier.
    pub id: String,

    /// Human-readable device name.
    #[serde(default)]
    pub name: String,

    /// Whether the service currently considers this device active.
    #[serde(default)]
    pub is_active: bool,

    /// Current device volume as a percentage, when reported.
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

/// A track as it appears on the wire.
///
/// Field names follow the backend's JSON convention; the playback service
/// converts this into its own [`Track`](crate::services::playback::Track).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPayload {
    /// Library identifier.
    pub id: u64,

    /// Track title.
    pub title: String,

    /// Artist display string.
    pub artist: String,

    /// Album name.
    #[serde(default)]
    pub album: String,

    /// Artwork URL.
    #[serde(default)]
    pub album_art: String,

    /// Duration in whole seconds.
    #[serde(default)]
    pub duration: u64,

    /// Optional preview-clip URL.
    #[serde(default)]
    pub audio_url: Option<String>,

    /// Optional full-track catalog URI.
    #[serde(default)]
    pub spotify_uri: Option<String>,
}

/// The polled current-playback snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlayback {
    /// Whether the remote device reports active playback.
    #[serde(default)]
    pub is_playing: bool,

    /// Elapsed time in milliseconds.
    #[serde(default)]
    pub progress_ms: u64,

    /// Track duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,

    /// The remotely playing track, when one exists.
    #[serde(default)]
    pub track: Option<TrackPayload>,

    /// Error marker; `"premium_required"` signals a restricted account tier.
    #[serde(default)]
    pub error: Option<String>,
}

/// Minimal playlist info for selection surfaces.
#[derive(Debug, Clone)]
pub struct PlaylistSummary {
    /// Playlist identifier.
    pub id: String,

    /// Playlist display name.
    pub name: String,

    /// First playlist image URL, when present.
    pub image_url: Option<String>,
}

/// Wire shape of the playlist listing.
#[derive(Debug, Deserialize)]
pub(super) struct PlaylistPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaylistItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<PlaylistImage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaylistImage {
    pub url: String,
}

impl From<PlaylistItem> for PlaylistSummary {
    fn from(item: PlaylistItem) -> Self {
        let image_url = item.images.into_iter().next().map(|i| i.url);
        Self {
            id: item.id,
            name: item.name,
            image_url,
        }
    }
}

/// Wire shape of the device listing.
#[derive(Debug, Deserialize)]
pub(super) struct DevicePage {
    #[serde(default)]
    pub devices: Vec<RemoteDevice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TransferRequest<'a> {
    pub device_id: &'a str,
    pub play: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct PlayRequest<'a> {
    pub device_id: &'a str,
    pub uris: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct PauseRequest<'a> {
    pub device_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct VolumeRequest<'a> {
    pub device_id: &'a str,
    pub volume_percent: u8,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_current_playback_in_wire_convention() {
        let body = r#"{
            "isPlaying": true,
            "progressMs": 42000,
            "durationMs": 180000,
            "track": {
                "id": 7,
                "title": "Blue in Green",
                "artist": "Miles Davis",
                "album": "Kind of Blue",
                "albumArt": "https://img.example/kob.jpg",
                "duration": 180,
                "spotifyUri": "spotify:track:abc123"
            }
        }"#;

        let current: CurrentPlayback = serde_json::from_str(body).unwrap();
        assert!(current.is_playing);
        assert_eq!(current.progress_ms, 42_000);
        assert_eq!(current.duration_ms, 180_000);
        let track = current.track.unwrap();
        assert_eq!(track.spotify_uri.as_deref(), Some("spotify:track:abc123"));
        assert!(current.error.is_none());
    }

    #[test]
    fn decodes_restricted_marker() {
        let current: CurrentPlayback =
            serde_json::from_str(r#"{"error": "premium_required"}"#).unwrap();
        assert_eq!(current.error.as_deref(), Some("premium_required"));
    }

    #[test]
    fn playlist_summary_takes_first_image() {
        let page: PlaylistPage = serde_json::from_str(
            r#"{"items": [{"id": "p1", "name": "Focus", "images": [{"url": "a"}, {"url": "b"}]}]}"#,
        )
        .unwrap();

        let summary: PlaylistSummary = page.items.into_iter().next().unwrap().into();
        assert_eq!(summary.image_url.as_deref(), Some("a"));
    }
}
