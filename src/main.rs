//! Platter monitor - headless now-playing monitor for a remote streaming backend.
//!
//! Mirrors the backend's playback state into the terminal: `watch` streams
//! now-playing transitions, `devices` lists the remote devices the service
//! currently knows about.

use std::{error::Error, sync::Arc};

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;

use platter::{
    config::Config,
    services::playback::{NowPlaying, NullPreview, PlaybackService},
    services::{BackendApi, HttpBackend},
    settings::SettingsStore,
    tracing_config,
};

#[derive(Parser)]
#[command(name = "platter", about = "Headless now-playing monitor")]
struct Cli {
    /// Override the configured backend base URL.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Stream now-playing transitions to the terminal (default).
    Watch,
    /// List the remote devices known to the service.
    Devices,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Watch);

    match command {
        Command::Devices => tracing_config::init()?,
        Command::Watch => tracing_config::init_with_file()?,
    }

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }

    let api = Arc::new(HttpBackend::new(&config.backend)?);

    match command {
        Command::Devices => list_devices(api.as_ref()).await,
        Command::Watch => watch(api, config).await?,
    }

    Ok(())
}

async fn list_devices(api: &dyn BackendApi) {
    match api.devices().await {
        Ok(devices) if devices.is_empty() => println!("No devices reported"),
        Ok(devices) => {
            for device in devices {
                let marker = if device.is_active { "*" } else { " " };
                println!("{marker} {}  {}", device.id, device.name);
            }
        }
        Err(e) => eprintln!("Failed to list devices: {e}"),
    }
}

async fn watch(api: Arc<HttpBackend>, config: Config) -> Result<(), Box<dyn Error>> {
    info!("Starting playback monitor against {}", config.backend.base_url);

    let settings = SettingsStore::load()?;
    let service = PlaybackService::start(
        api,
        Arc::new(NullPreview::new()),
        settings,
        config.playback,
    )
    .await;

    service.load_library().await;

    let mut updates = Box::pin(service.now_playing_monitored());
    while let Some(snapshot) = updates.next().await {
        print_snapshot(&snapshot);
    }

    Ok(())
}

fn print_snapshot(snapshot: &NowPlaying) {
    let state = if snapshot.is_playing { "playing" } else { "paused" };
    match &snapshot.track {
        Some(track) => println!(
            "[{state}] {} - {} ({}/{}s)",
            track.artist,
            track.title,
            snapshot.elapsed.as_secs(),
            snapshot.duration.as_secs(),
        ),
        None => println!("[{state}] nothing loaded"),
    }
}
