use serde::{Deserialize, Serialize};

/// Playback engine tuning.
///
/// The near-end threshold and advance debounce window are exposed as
/// configuration rather than hard-coded so deployments can adjust them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Display name announced by the embedded playback client.
    pub device_name: String,

    /// Interval between remote playback-state polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// A track counts as "near its end" when the remaining time drops to or
    /// below this many milliseconds.
    pub near_end_threshold_ms: u64,

    /// Minimum spacing between two auto-advance triggers for the same track.
    pub advance_debounce_ms: u64,

    /// Maximum attempts for a transfer-then-play command sequence.
    pub command_attempts: u32,

    /// Fixed delay between command attempts, in milliseconds.
    pub command_backoff_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            device_name: "Platter".to_string(),
            poll_interval_ms: 1200,
            near_end_threshold_ms: 800,
            advance_debounce_ms: 1000,
            command_attempts: 3,
            command_backoff_ms: 300,
        }
    }
}
