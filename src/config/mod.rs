//! Configuration schema definitions and validation.
//!
//! Defines the complete configuration structure for Platter, including
//! general settings, backend connection parameters and playback tuning.
//! All configurations are serializable to/from TOML format.

mod backend;
mod general;
mod loading;
mod paths;
mod playback;

pub use backend::BackendConfig;
pub use general::GeneralConfig;
pub use paths::ConfigPaths;
pub use playback::PlaybackConfig;

use serde::{Deserialize, Serialize};

/// Main configuration structure for Platter.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend REST API connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Playback engine tuning.
    #[serde(default)]
    pub playback: PlaybackConfig,
}
