use std::{fs, path::Path};

use tracing::info;

use super::Config;
use crate::{PlatterError, Result};

impl Config {
    /// Loads the configuration from a TOML file.
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let file_content = fs::read_to_string(path)?;
        Self::parse(&file_content, Some(path))
    }

    /// Loads the configuration from the default location.
    ///
    /// # Errors
    /// Returns error if the config directory cannot be determined or the
    /// file cannot be parsed.
    pub fn load() -> Result<Config> {
        let path = super::ConfigPaths::main_config()?;
        Self::load_from(&path)
    }

    fn parse(content: &str, path: Option<&Path>) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| PlatterError::toml_parse(e, path))?;

        if config.playback.command_attempts == 0 {
            return Err(PlatterError::ConfigValidation {
                section: "playback".to_string(),
                details: "command_attempts must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}
