use std::{
    fs,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use futures::Stream;
use tokio::sync::broadcast;
use tracing::warn;

use crate::config::ConfigPaths;
use crate::{PlatterError, Result};

use super::{BackgroundMode, Settings, VinylTheme};

/// A change to a single persisted preference, carrying the new value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsChange {
    /// The explicitly selected device changed.
    SelectedDevice(Option<String>),
    /// The global volume changed.
    Volume(f64),
    /// The background mode changed.
    BackgroundMode(BackgroundMode),
    /// The vinyl theme changed.
    VinylTheme(VinylTheme),
    /// The record-shelf visibility changed.
    ShowShelf(bool),
}

/// A thread-safe preference store that persists settings and broadcasts changes.
///
/// The store is the single write path for user preferences; services hold a
/// clone and observe changes through [`SettingsStore::subscribe`].
#[derive(Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: Option<PathBuf>,
    change_sender: broadcast::Sender<SettingsChange>,
}

impl SettingsStore {
    /// Creates an in-memory store with default values and no persistence.
    pub fn with_defaults() -> Self {
        let (change_sender, _) = broadcast::channel(64);

        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path: None,
            change_sender,
        }
    }

    /// Loads the store from the default settings file location.
    ///
    /// A missing file yields defaults; an unreadable file is replaced with
    /// defaults after a warning, so a corrupt store never blocks startup.
    ///
    /// # Errors
    /// Returns error if the config directory cannot be determined.
    pub fn load() -> Result<Self> {
        let path = ConfigPaths::settings_file()?;
        Ok(Self::load_from(path))
    }

    /// Loads the store from an explicit file path.
    pub fn load_from(path: PathBuf) -> Self {
        let settings = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Invalid settings file {}: {e}, using defaults", path.display());
                Settings::default()
            }),
            Err(_) => Settings::default(),
        };

        let (change_sender, _) = broadcast::channel(64);

        Self {
            settings: Arc::new(RwLock::new(settings)),
            path: Some(path),
            change_sender,
        }
    }

    /// Returns a clone of the current settings, handling poisoned locks gracefully.
    pub fn current(&self) -> Settings {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The explicitly selected device id, if any.
    pub fn selected_device(&self) -> Option<String> {
        self.current().selected_device
    }

    /// Sets (or clears) the explicitly selected device and persists the change.
    pub fn set_selected_device(&self, device: Option<String>) {
        self.update(|s| s.selected_device = device.clone());
        self.notify(SettingsChange::SelectedDevice(device));
    }

    /// The persisted volume in `[0.0, 1.0]`.
    pub fn volume(&self) -> f64 {
        self.current().volume
    }

    /// Sets the volume, clamped to `[0.0, 1.0]`, and persists the change.
    pub fn set_volume(&self, volume: f64) {
        let clamped = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            Settings::default().volume
        };
        self.update(|s| s.volume = clamped);
        self.notify(SettingsChange::Volume(clamped));
    }

    /// Sets the background mode and persists the change.
    pub fn set_background_mode(&self, mode: BackgroundMode) {
        self.update(|s| s.background_mode = mode);
        self.notify(SettingsChange::BackgroundMode(mode));
    }

    /// Sets the vinyl theme and persists the change.
    pub fn set_vinyl_theme(&self, theme: VinylTheme) {
        self.update(|s| s.vinyl_theme = theme);
        self.notify(SettingsChange::VinylTheme(theme));
    }

    /// Sets the record-shelf visibility and persists the change.
    pub fn set_show_shelf(&self, show: bool) {
        self.update(|s| s.show_shelf = show);
        self.notify(SettingsChange::ShowShelf(show));
    }

    /// Creates a stream that yields every subsequent preference change.
    pub fn subscribe(&self) -> impl Stream<Item = SettingsChange> + Send {
        let receiver = self.change_sender.subscribe();

        futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(change) => return Some((change, receiver)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }

    fn update(&self, mutate: impl FnOnce(&mut Settings)) {
        {
            let mut guard = match self.settings.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            mutate(&mut guard);
        }

        if let Err(e) = self.persist() {
            warn!("Failed to persist settings: {e}");
        }
    }

    fn notify(&self, change: SettingsChange) {
        let _ = self.change_sender.send(change);
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current())
            .map_err(|e| PlatterError::Settings(e.to_string()))?;
        fs::write(path, content)?;

        Ok(())
    }
}
