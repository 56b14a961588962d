//! Persisted user-preference store.
//!
//! Holds the small set of preferences that survive restarts: the explicitly
//! selected playback device, the global volume, and appearance choices.
//! Consumers read typed values and subscribe to change broadcasts; storage is
//! a JSON file in the platter config directory.

mod store;

pub use store::{SettingsChange, SettingsStore};

use serde::{Deserialize, Serialize};

/// Background aesthetic modes offered by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Cross-faded album artwork.
    #[default]
    Album,
    /// Blurred album artwork.
    Blur,
    /// Flat user-chosen color.
    Custom,
    /// Starfield animation.
    Starry,
    /// Static gradient.
    Gradient,
    /// Audio-feature-driven dynamic background.
    Dynamic,
    /// Minimal gradient variant.
    Minimal,
}

/// Vinyl disc color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VinylTheme {
    /// Deep black disc.
    Classic,
    /// Warm golden disc.
    Sunflower,
    /// Cream/orange retro disc.
    Warm,
    /// Soft mint disc.
    Mint,
    /// Translucent acrylic disc.
    #[default]
    Clear,
}

/// The complete set of persisted preferences.
///
/// Every field has a defined default so a missing or partial settings file
/// always yields a usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Explicitly selected playback device id, if the user made a choice.
    pub selected_device: Option<String>,

    /// Global volume in `[0.0, 1.0]`.
    pub volume: f64,

    /// Chosen background mode.
    pub background_mode: BackgroundMode,

    /// Chosen vinyl disc theme.
    pub vinyl_theme: VinylTheme,

    /// Custom background color (CSS color string).
    pub custom_bg_color: String,

    /// Optional vinyl disc color override.
    pub vinyl_custom_color: Option<String>,

    /// Whether the record shelf is shown.
    pub show_shelf: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_device: None,
            volume: 0.8,
            background_mode: BackgroundMode::default(),
            vinyl_theme: VinylTheme::default(),
            custom_bg_color: "#111827".to_string(),
            vinyl_custom_color: None,
            show_shelf: true,
        }
    }
}
