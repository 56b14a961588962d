//! Integration tests for the persisted preference store.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use futures::StreamExt;
use tempfile::TempDir;

use platter::settings::{BackgroundMode, SettingsChange, SettingsStore, VinylTheme};

fn store_in(temp: &TempDir) -> SettingsStore {
    SettingsStore::load_from(temp.path().join("settings.json"))
}

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    let settings = store.current();
    assert_eq!(settings.selected_device, None);
    assert!((settings.volume - 0.8).abs() < f64::EPSILON);
    assert_eq!(settings.background_mode, BackgroundMode::Album);
    assert_eq!(settings.vinyl_theme, VinylTheme::Clear);
    assert!(settings.show_shelf);
}

#[test]
fn values_survive_reload() {
    let temp = TempDir::new().unwrap();

    {
        let store = store_in(&temp);
        store.set_selected_device(Some("turntable".to_string()));
        store.set_volume(0.35);
        store.set_background_mode(BackgroundMode::Starry);
        store.set_vinyl_theme(VinylTheme::Mint);
        store.set_show_shelf(false);
    }

    let reloaded = store_in(&temp);
    let settings = reloaded.current();
    assert_eq!(settings.selected_device.as_deref(), Some("turntable"));
    assert!((settings.volume - 0.35).abs() < f64::EPSILON);
    assert_eq!(settings.background_mode, BackgroundMode::Starry);
    assert_eq!(settings.vinyl_theme, VinylTheme::Mint);
    assert!(!settings.show_shelf);
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("settings.json"), "{not json").unwrap();

    let store = store_in(&temp);
    assert_eq!(store.current().selected_device, None);
}

#[test]
fn volume_is_clamped_on_write() {
    let temp = TempDir::new().unwrap();
    let store = store_in(&temp);

    store.set_volume(2.4);
    assert!((store.volume() - 1.0).abs() < f64::EPSILON);

    store.set_volume(-1.0);
    assert!(store.volume().abs() < f64::EPSILON);

    store.set_volume(f64::NAN);
    assert!((store.volume() - 0.8).abs() < f64::EPSILON);
}

#[tokio::test]
async fn subscribers_see_changes() {
    let store = SettingsStore::with_defaults();
    let mut changes = Box::pin(store.subscribe());

    store.set_volume(0.25);
    assert_eq!(changes.next().await, Some(SettingsChange::Volume(0.25)));

    store.set_selected_device(Some("deck".to_string()));
    assert_eq!(
        changes.next().await,
        Some(SettingsChange::SelectedDevice(Some("deck".to_string())))
    );
}
