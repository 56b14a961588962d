use std::fmt;
use std::ops::Deref;
use std::time::Duration;

use crate::services::api::TrackPayload;

/// Unique identifier for a playback device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a DeviceId from its string form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw device id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a track across transports.
///
/// Remote transports report tracks by catalog URI; preview-only tracks are
/// identified by their library id. Queue resynchronization and the
/// auto-advance guard both compare identities, never positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackKey {
    /// Full-track catalog URI.
    Catalog(String),
    /// Local library identifier.
    Library(u64),
}

/// A playable track. Immutable once constructed; supplied by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Library identifier.
    pub id: u64,

    /// Track title.
    pub title: String,

    /// Artist display string.
    pub artist: String,

    /// Album name.
    pub album: String,

    /// Artwork URL.
    pub album_art: String,

    /// Full track duration.
    pub duration: Duration,

    /// Optional short preview clip URL.
    pub audio_url: Option<String>,

    /// Optional full-track catalog URI.
    pub catalog_uri: Option<String>,
}

impl Track {
    /// The identity used for queue resynchronization and advance debouncing.
    pub fn key(&self) -> TrackKey {
        match &self.catalog_uri {
            Some(uri) => TrackKey::Catalog(uri.clone()),
            None => TrackKey::Library(self.id),
        }
    }
}

impl From<TrackPayload> for Track {
    fn from(payload: TrackPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            artist: payload.artist,
            album: payload.album,
            album_art: payload.album_art,
            duration: Duration::from_secs(payload.duration),
            audio_url: payload.audio_url,
            catalog_uri: payload.spotify_uri,
        }
    }
}

/// The authoritative now-playing snapshot consumed by presentation layers.
///
/// Produced exclusively by the playback service; read-only for everyone else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NowPlaying {
    /// Whether playback is (believed to be) running.
    pub is_playing: bool,

    /// Elapsed time at the last transport update.
    pub elapsed: Duration,

    /// Track duration; falls back to the track's own metadata until a
    /// transport reports one.
    pub duration: Duration,

    /// The current track, when one exists.
    pub track: Option<Track>,
}

impl NowPlaying {
    /// Elapsed/duration as a display ratio in `[0.0, 1.0]`.
    pub fn progress_ratio(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Which transport is authoritative for the current track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSelection {
    /// Local short-preview sink.
    Preview,

    /// The in-process embedded playback client.
    Embedded(DeviceId),

    /// A remote device controlled through backend commands.
    Remote(DeviceId),
}

/// Volume of the player
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Volume(f64);

impl Volume {
    /// Create a new instance of a volume with safeguarded values
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Get the volume as an integer percentage for remote commands
    pub fn as_percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl Deref for Volume {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<f64> for Volume {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Which of the two artwork buffers is frontmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtworkSlot {
    /// First buffer.
    #[default]
    A,
    /// Second buffer.
    B,
}

/// Paired double-buffer driving the presentation layer's artwork cross-fade.
///
/// New artwork lands in the back buffer and the front flag flips, so the
/// consumer can fade between the two slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtworkBuffers {
    /// First buffer contents.
    pub slot_a: Option<String>,

    /// Second buffer contents.
    pub slot_b: Option<String>,

    /// Which slot is frontmost.
    pub front: ArtworkSlot,
}

impl ArtworkBuffers {
    /// The URL currently shown, if any.
    pub fn front_url(&self) -> Option<&str> {
        match self.front {
            ArtworkSlot::A => self.slot_a.as_deref(),
            ArtworkSlot::B => self.slot_b.as_deref(),
        }
    }

    /// Swaps the given artwork into the back buffer and flips the front.
    ///
    /// Returns false without touching the buffers when the URL is empty or
    /// already frontmost.
    pub(crate) fn swap_to(&mut self, url: &str) -> bool {
        if url.is_empty() || self.front_url() == Some(url) {
            return false;
        }

        match self.front {
            ArtworkSlot::A => {
                self.slot_b = Some(url.to_string());
                self.front = ArtworkSlot::B;
            }
            ArtworkSlot::B => {
                self.slot_a = Some(url.to_string());
                self.front = ArtworkSlot::A;
            }
        }

        true
    }
}

/// Discrete events emitted by the playback service.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The active track changed (locally or externally initiated).
    TrackChanged {
        /// The new track.
        track: Track,
    },

    /// The artwork double-buffer swapped.
    ArtworkChanged {
        /// The buffer state after the swap.
        buffers: ArtworkBuffers,
    },

    /// The embedded device came online.
    DeviceReady {
        /// Device id announced by the embedded client.
        device_id: DeviceId,
    },

    /// The embedded device went offline.
    DeviceGone {
        /// Device id that disappeared.
        device_id: DeviceId,
    },

    /// Remote playback was permanently disabled for this session.
    Restricted,
}
