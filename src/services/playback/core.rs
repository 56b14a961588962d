use std::sync::{
    Arc, Mutex, PoisonError, RwLock as StdRwLock,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use async_stream::stream;
use futures::Stream;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::PlaybackConfig;
use crate::services::api::BackendApi;
use crate::settings::SettingsStore;

use super::PlaybackError;
use super::guard::AdvanceGuard;
use super::monitoring::{EmbeddedPump, RemotePoller};
use super::progress::ProgressBaseline;
use super::queue::PlayQueue;
use super::transport::{EmbeddedPlayer, PreviewEvent, PreviewSink};
use super::types::{
    ArtworkBuffers, DeviceId, NowPlaying, PlayerEvent, Track, TrackKey, TransportSelection, Volume,
};
use crate::services::common::Property;

/// Minimum delay of the fallback end-of-track timer.
const END_TIMER_MIN_DELAY: Duration = Duration::from_millis(800);

/// How far before the estimated track end the fallback timer fires.
const END_TIMER_LEAD: Duration = Duration::from_millis(200);

/// Playback orchestration service.
///
/// Owns the authoritative [`NowPlaying`] snapshot and the play queue, picks
/// which transport is authoritative for the current track, issues commands to
/// it, and merges transport events and remote polls back into the snapshot.
/// All state mutation happens inside this service's own methods; consumers
/// observe it through reactive properties and the event stream.
///
/// Every public operation is infallible toward the caller: backend and
/// transport failures are caught, logged and abandoned, leaving the snapshot
/// to be reconciled by the next poll or event.
#[derive(Clone)]
pub struct PlaybackService {
    pub(super) api: Arc<dyn BackendApi>,
    preview: Arc<dyn PreviewSink>,
    embedded: Arc<StdRwLock<Option<Arc<dyn EmbeddedPlayer>>>>,
    settings: SettingsStore,
    pub(super) tuning: PlaybackConfig,

    queue: Arc<RwLock<PlayQueue>>,
    now_playing: Property<NowPlaying>,
    artwork: Property<ArtworkBuffers>,
    embedded_device: Property<Option<DeviceId>>,

    pub(super) restricted: Arc<AtomicBool>,
    baseline: Arc<Mutex<Option<ProgressBaseline>>>,
    advance_guard: Arc<Mutex<AdvanceGuard>>,
    pending_play: Arc<Mutex<Option<Track>>>,
    last_external_key: Arc<Mutex<Option<TrackKey>>>,

    end_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    events_tx: broadcast::Sender<PlayerEvent>,
}

impl PlaybackService {
    /// Creates a service without starting any background monitoring.
    ///
    /// Useful for embedding and tests; [`PlaybackService::start`] is the
    /// usual entry point.
    pub fn new(
        api: Arc<dyn BackendApi>,
        preview: Arc<dyn PreviewSink>,
        settings: SettingsStore,
        tuning: PlaybackConfig,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        let debounce = Duration::from_millis(tuning.advance_debounce_ms);

        Self {
            api,
            preview,
            embedded: Arc::new(StdRwLock::new(None)),
            settings,
            tuning,
            queue: Arc::new(RwLock::new(PlayQueue::new())),
            now_playing: Property::new(NowPlaying::default()),
            artwork: Property::new(ArtworkBuffers::default()),
            embedded_device: Property::new(None),
            restricted: Arc::new(AtomicBool::new(false)),
            baseline: Arc::new(Mutex::new(None)),
            advance_guard: Arc::new(Mutex::new(AdvanceGuard::new(debounce))),
            pending_play: Arc::new(Mutex::new(None)),
            last_external_key: Arc::new(Mutex::new(None)),
            end_timer: Arc::new(Mutex::new(None)),
            tasks: Arc::new(Mutex::new(Vec::new())),
            events_tx,
        }
    }

    /// Starts the service: listens for preview end events and, when the
    /// session is authenticated, begins polling remote playback state.
    #[instrument(skip_all)]
    pub async fn start(
        api: Arc<dyn BackendApi>,
        preview: Arc<dyn PreviewSink>,
        settings: SettingsStore,
        tuning: PlaybackConfig,
    ) -> Self {
        let service = Self::new(api, preview, settings, tuning);
        service.spawn_preview_listener();

        let authenticated = match service.api.auth_status().await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                warn!("Auth status check failed: {e}");
                false
            }
        };

        if authenticated {
            info!("Session authenticated, starting remote playback polling");
            let handle = RemotePoller::start(service.clone());
            service.push_task(handle);
        } else {
            info!("Session not authenticated; remote polling disabled");
        }

        service
    }

    /// Attaches a connected embedded playback client and starts forwarding
    /// its events into the service.
    pub fn attach_embedded(&self, player: Arc<dyn EmbeddedPlayer>) {
        {
            let mut slot = self
                .embedded
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *slot = Some(Arc::clone(&player));
        }
        let handle = EmbeddedPump::start(self.clone(), player);
        self.push_task(handle);
    }

    /// Shuts down background tasks. The snapshot stays readable.
    pub fn shutdown(&self) {
        for handle in self.lock_tasks().drain(..) {
            handle.abort();
        }
        if let Some(handle) = self.lock_end_timer().take() {
            handle.abort();
        }
    }

    // --- Snapshot access -------------------------------------------------

    /// The current snapshot with the elapsed time interpolated to now.
    pub fn now_playing(&self) -> NowPlaying {
        let mut snapshot = self.now_playing.get();
        snapshot.elapsed = self.elapsed();
        snapshot
    }

    /// Watches snapshot changes (without interpolation between updates).
    pub fn now_playing_monitored(&self) -> impl Stream<Item = NowPlaying> + Send {
        self.now_playing.watch()
    }

    /// The interpolated elapsed time for smooth progress display.
    ///
    /// Between transport updates this extrapolates from the last reported
    /// position and the wall clock, clamped to the track length; recomputed
    /// on every call, never persisted.
    pub fn elapsed(&self) -> Duration {
        let snapshot = self.now_playing.get();
        if !snapshot.is_playing {
            return snapshot.elapsed;
        }
        match *self.lock_baseline() {
            Some(baseline) => baseline.elapsed_at(Instant::now()),
            None => snapshot.elapsed,
        }
    }

    /// Interpolated progress ratio in `[0.0, 1.0]`.
    pub fn progress_ratio(&self) -> f64 {
        let snapshot = self.now_playing.get();
        if snapshot.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed().as_secs_f64() / snapshot.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// The artwork double-buffer state.
    pub fn artwork(&self) -> ArtworkBuffers {
        self.artwork.get()
    }

    /// Watches artwork buffer swaps.
    pub fn artwork_monitored(&self) -> impl Stream<Item = ArtworkBuffers> + Send {
        self.artwork.watch()
    }

    /// The embedded device id, when the embedded client is connected.
    pub fn embedded_device(&self) -> Option<DeviceId> {
        self.embedded_device.get()
    }

    /// Whether remote playback has been permanently disabled for this session.
    pub fn is_restricted(&self) -> bool {
        self.restricted.load(Ordering::SeqCst)
    }

    /// A snapshot of the play queue.
    pub async fn queue(&self) -> PlayQueue {
        self.queue.read().await.clone()
    }

    /// Subscribes to discrete player events.
    pub fn events(&self) -> impl Stream<Item = PlayerEvent> + Send {
        let mut rx = self.events_tx.subscribe();

        stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        }
    }

    // --- Queue management ------------------------------------------------

    /// Replaces the play queue wholesale.
    pub async fn replace_queue(&self, tracks: Vec<Track>) {
        let mut queue = self.queue.write().await;
        queue.replace(tracks);
    }

    /// Fetches the song library and replaces the queue with it.
    pub async fn load_library(&self) {
        match self.api.songs().await {
            Ok(payloads) => {
                let tracks: Vec<Track> = payloads.into_iter().map(Into::into).collect();
                info!("Loaded {} library tracks", tracks.len());
                self.replace_queue(tracks).await;
            }
            Err(e) => warn!("Could not fetch songs: {e}"),
        }
    }

    /// Fetches one playlist's songs and replaces the queue with them.
    pub async fn load_playlist(&self, playlist_id: &str) {
        match self.api.playlist_songs(playlist_id).await {
            Ok(payloads) => {
                let tracks: Vec<Track> = payloads.into_iter().map(Into::into).collect();
                info!("Loaded {} playlist tracks", tracks.len());
                self.replace_queue(tracks).await;
            }
            Err(e) => warn!("Failed to fetch playlist songs: {e}"),
        }
    }

    // --- User intents ----------------------------------------------------

    /// Starts playback of a track.
    ///
    /// Catalog tracks resolve a target device (explicit selection, then the
    /// server-reported active device, then the connected embedded device) and
    /// get a retried transfer-then-play sequence; when no device resolves the
    /// request is parked until one appears. Tracks without a catalog URI fall
    /// back to the local preview sink. The snapshot updates optimistically
    /// before any command resolves.
    #[instrument(skip_all, fields(title = %track.title))]
    pub async fn play(&self, track: Track) {
        self.sync_queue_to(&track).await;

        if let Some(uri) = track.catalog_uri.clone() {
            if !self.is_restricted() {
                match self.resolve_device().await {
                    Some(device) => {
                        self.apply_optimistic(&track, true);
                        if self.start_on_device(&device, &uri).await {
                            self.nudge_embedded(&device).await;
                        } else {
                            warn!("Failed to start playback on target device");
                        }
                    }
                    None => {
                        debug!("No resolvable device; parking play request");
                        *self.lock_pending() = Some(track.clone());
                        self.apply_optimistic(&track, true);
                    }
                }
                return;
            }
        }

        self.play_preview(&track).await;
    }

    /// Toggles between pause and resume on the authoritative transport.
    pub async fn toggle(&self) {
        if self.now_playing.get().is_playing {
            self.pause().await;
        } else {
            self.resume().await;
        }
    }

    /// Pauses playback on the authoritative transport.
    pub async fn pause(&self) {
        if let Err(e) = self.route_pause().await {
            warn!("Pause failed: {e}");
        }
        self.freeze_progress();
        self.update_snapshot(|s| s.is_playing = false);
    }

    /// Resumes playback on the authoritative transport.
    pub async fn resume(&self) {
        match self.selection() {
            TransportSelection::Preview => {
                match self.preview.play().await {
                    Ok(()) => {
                        self.reanchor_progress();
                        self.update_snapshot(|s| s.is_playing = true);
                    }
                    // Start rejections are expected (autoplay policy analog).
                    Err(e) => debug!("Preview start rejected: {e}"),
                }
            }
            selection => {
                if let Err(e) = self.route_resume(&selection).await {
                    warn!("Resume failed: {e}");
                }
                self.reanchor_progress();
                self.update_snapshot(|s| s.is_playing = true);
            }
        }
    }

    /// Seeks to a position expressed as a ratio of the track duration.
    ///
    /// No-op when the duration is unknown or the ratio is not finite.
    pub async fn seek(&self, ratio: f64) {
        if !ratio.is_finite() {
            return;
        }
        let duration = self.now_playing.get().duration;
        if duration.is_zero() {
            return;
        }

        let ratio = ratio.clamp(0.0, 1.0);
        let target_ms = (ratio * duration.as_millis() as f64).round() as u64;
        let target = Duration::from_millis(target_ms).min(duration);

        match self.selection() {
            TransportSelection::Embedded(_) => {
                if let Some(player) = self.embedded_player() {
                    if let Err(e) = player.seek(target).await {
                        warn!("Embedded seek failed: {e}");
                    }
                }
            }
            TransportSelection::Preview => self.preview.seek(target).await,
            // The backend contract has no seek command for remote devices.
            TransportSelection::Remote(_) => return,
        }

        // Overwrite the interpolation anchor immediately so the display does
        // not snap back before the next poll or event arrives.
        *self.lock_baseline() = Some(ProgressBaseline::capture(target, duration, Instant::now()));
        self.update_snapshot(|s| s.elapsed = target);
        self.rearm_end_timer();
    }

    /// Sets the volume, clamped to `[0.0, 1.0]`.
    ///
    /// The preview sink always follows; additionally the authoritative
    /// external transport is updated (native call for the embedded client, a
    /// percentage command for a remote device).
    pub async fn set_volume(&self, level: f64) {
        let volume = Volume::new(level);
        self.settings.set_volume(*volume);
        self.preview.set_volume(volume).await;

        if let Err(e) = self.route_volume(volume).await {
            debug!("External volume update failed: {e}");
        }
    }

    /// Advances the queue circularly and starts the new current track.
    pub async fn next(&self) {
        let track = {
            let mut queue = self.queue.write().await;
            queue.advance().cloned()
        };
        let Some(track) = track else { return };

        self.apply_optimistic(&track, true);
        self.start_catalog_playback(&track).await;
    }

    /// Retreats the queue circularly and starts the new current track.
    pub async fn previous(&self) {
        let track = {
            let mut queue = self.queue.write().await;
            queue.retreat().cloned()
        };
        let Some(track) = track else { return };

        self.apply_optimistic(&track, true);
        self.start_catalog_playback(&track).await;
    }

    /// Sets (or clears) the explicitly selected device and retries any
    /// parked play request against it.
    pub async fn select_device(&self, device: Option<DeviceId>) {
        self.settings
            .set_selected_device(device.map(|d| d.as_str().to_string()));
        self.flush_pending().await;
    }

    // --- Transport routing ----------------------------------------------

    /// Which transport is authoritative for the current track.
    pub fn selection(&self) -> TransportSelection {
        let snapshot = self.now_playing.get();
        let Some(track) = snapshot.track else {
            return TransportSelection::Preview;
        };
        if track.catalog_uri.is_none() || self.is_restricted() {
            return TransportSelection::Preview;
        }

        let embedded = self.embedded_device.get();
        let target = self
            .settings
            .selected_device()
            .map(DeviceId::new)
            .or_else(|| embedded.clone());

        match target {
            Some(device) if Some(&device) == embedded.as_ref() => {
                TransportSelection::Embedded(device)
            }
            Some(device) => TransportSelection::Remote(device),
            None => TransportSelection::Preview,
        }
    }

    async fn route_pause(&self) -> Result<(), PlaybackError> {
        match self.selection() {
            TransportSelection::Embedded(device) => {
                // Both calls matter: the native pause gives instant local
                // feedback, the backend call keeps server-side state
                // authoritative for polling clients.
                if let Some(player) = self.embedded_player() {
                    player.pause().await?;
                }
                self.api.transfer(device.as_str(), false).await?;
            }
            TransportSelection::Remote(device) => {
                self.api.pause(device.as_str()).await?;
            }
            TransportSelection::Preview => self.preview.pause().await,
        }
        Ok(())
    }

    async fn route_resume(&self, selection: &TransportSelection) -> Result<(), PlaybackError> {
        match selection {
            TransportSelection::Embedded(device) => {
                if let Some(player) = self.embedded_player() {
                    player.resume().await?;
                }
                self.api.transfer(device.as_str(), true).await?;
            }
            TransportSelection::Remote(device) => {
                // No local element to resume; reload the current track.
                let uri = self
                    .now_playing
                    .get()
                    .track
                    .and_then(|t| t.catalog_uri);
                if let Some(uri) = uri {
                    self.api.transfer(device.as_str(), true).await?;
                    self.api.play(device.as_str(), &uri).await?;
                }
            }
            TransportSelection::Preview => {}
        }
        Ok(())
    }

    async fn route_volume(&self, volume: Volume) -> Result<(), PlaybackError> {
        let embedded = self.embedded_device.get();
        let selected = self.settings.selected_device().map(DeviceId::new);

        match (selected, embedded) {
            (Some(selected), Some(embedded)) if selected == embedded => {
                if let Some(player) = self.embedded_player() {
                    player.set_volume(volume).await?;
                }
            }
            (Some(selected), _) => {
                self.api
                    .set_volume(selected.as_str(), volume.as_percent())
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn play_preview(&self, track: &Track) {
        self.apply_optimistic(track, false);

        let Some(url) = &track.audio_url else {
            return;
        };

        if let Err(e) = self.preview.load(url).await {
            debug!("Preview load failed: {e}");
            return;
        }
        match self.preview.play().await {
            Ok(()) => {
                self.reanchor_progress();
                self.update_snapshot(|s| s.is_playing = true);
            }
            Err(e) => debug!("Preview start rejected: {e}"),
        }
    }

    // --- Device resolution and commands ----------------------------------

    /// Resolves the target device for a playback command: the explicit
    /// selection when the server still lists it, else the server-reported
    /// active device, else the (possibly stale) selection, else the
    /// connected embedded device.
    pub(super) async fn resolve_device(&self) -> Option<DeviceId> {
        let selected = self.settings.selected_device().map(DeviceId::new);
        let mut target = selected.clone();

        match self.api.devices().await {
            Ok(devices) => {
                let selected_listed = selected
                    .as_ref()
                    .is_some_and(|s| devices.iter().any(|d| d.id == s.as_str()));
                if !selected_listed {
                    if let Some(active) = devices.iter().find(|d| d.is_active) {
                        target = Some(DeviceId::new(&active.id));
                    }
                }
            }
            Err(e) => debug!("Device listing failed: {e}"),
        }

        target.or_else(|| self.embedded_device.get())
    }

    /// Issues the transfer-then-play sequence with bounded retries.
    ///
    /// Any non-success response is retryable; after the attempts are
    /// exhausted the failure is abandoned and the next poll reconciles.
    async fn start_on_device(&self, device: &DeviceId, uri: &str) -> bool {
        let attempts = self.tuning.command_attempts.max(1);
        let backoff = Duration::from_millis(self.tuning.command_backoff_ms);

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(backoff).await;
            }
            if let Err(e) = self.api.transfer(device.as_str(), true).await {
                debug!("Transfer attempt {attempt} failed: {e}");
            }
            match self.api.play(device.as_str(), uri).await {
                Ok(()) => return true,
                Err(e) => debug!("Play attempt {attempt} failed: {e}"),
            }
        }

        false
    }

    async fn start_catalog_playback(&self, track: &Track) {
        let Some(uri) = &track.catalog_uri else {
            return;
        };
        if self.is_restricted() {
            return;
        }
        let Some(device) = self.resolve_device().await else {
            return;
        };

        if self.start_on_device(&device, uri).await {
            self.nudge_embedded(&device).await;
        } else {
            warn!("Failed to start playback on target device");
        }
    }

    /// When the target is the embedded device, poke its native resume so the
    /// local client reflects the transferred playback immediately.
    async fn nudge_embedded(&self, device: &DeviceId) {
        if Some(device) == self.embedded_device.get().as_ref() {
            if let Some(player) = self.embedded_player() {
                if let Err(e) = player.resume().await {
                    debug!("Embedded resume after transfer failed: {e}");
                }
            }
        }
    }

    pub(super) async fn flush_pending(&self) {
        let parked = self.lock_pending().take();
        let Some(track) = parked else { return };
        let Some(uri) = track.catalog_uri.clone() else {
            return;
        };
        if self.is_restricted() {
            return;
        }

        let Some(device) = self.resolve_device().await else {
            // Still no device; keep holding the request.
            *self.lock_pending() = Some(track);
            return;
        };

        info!("Starting deferred play request");
        if self.start_on_device(&device, &uri).await {
            self.nudge_embedded(&device).await;
        } else {
            warn!("Deferred play failed");
        }
    }

    // --- Transport update mailbox ----------------------------------------

    /// Merges an embedded state-changed event into the snapshot.
    pub(super) async fn on_embedded_state(
        &self,
        state: super::transport::EmbeddedState,
    ) {
        let now = Instant::now();
        let key = state
            .track
            .as_ref()
            .map(Track::key)
            .or_else(|| self.now_playing.get().track.map(|t| t.key()));

        // End-of-track: the embedded client parks itself paused at the end.
        // Once a signal reaches this path the report is consumed either way;
        // merging an ended-track state would drag the snapshot back behind
        // the optimistic advance.
        if state.paused && self.near_end(state.position, state.duration) {
            if self.lock_advance_guard().try_fire(key.as_ref(), now) {
                self.next().await;
            }
            return;
        }

        if !state.duration.is_zero() {
            *self.lock_baseline() =
                Some(ProgressBaseline::capture(state.position, state.duration, now));
        }

        let mut snapshot = self.now_playing.get();
        snapshot.is_playing = !state.paused;
        if !state.duration.is_zero() {
            snapshot.elapsed = state.position;
            snapshot.duration = state.duration;
        }

        if let Some(track) = &state.track {
            let changed = snapshot.track.as_ref().map(Track::key) != Some(track.key());
            snapshot.track = Some(track.clone());
            if changed {
                self.note_external_change(track).await;
            }
            self.resync_queue(track.key()).await;
        }

        self.now_playing.set(snapshot);
        self.rearm_end_timer();
    }

    /// Merges a remote poll result into the snapshot.
    ///
    /// While the embedded client reports live state it stays authoritative
    /// for the playing flag; progress and track data still merge.
    pub(super) async fn on_remote_poll(
        &self,
        current: crate::services::api::CurrentPlayback,
        embedded_live: bool,
    ) {
        let now = Instant::now();
        let position = Duration::from_millis(current.progress_ms);
        let duration = Duration::from_millis(current.duration_ms);
        let track: Option<Track> = current.track.map(Into::into);
        let key = track
            .as_ref()
            .map(Track::key)
            .or_else(|| self.now_playing.get().track.map(|t| t.key()));

        // Remote devices stop at the end of a track instead of pausing.
        // As above, an end-of-track report never merges: stale repeats of it
        // would otherwise be taken for external track changes.
        if !current.is_playing && self.near_end(position, duration) {
            if self.lock_advance_guard().try_fire(key.as_ref(), now) {
                self.next().await;
            }
            return;
        }

        if !duration.is_zero() {
            *self.lock_baseline() = Some(ProgressBaseline::capture(position, duration, now));
        }

        let mut snapshot = self.now_playing.get();
        if !embedded_live {
            snapshot.is_playing = current.is_playing;
        }
        if !duration.is_zero() {
            snapshot.elapsed = position;
            snapshot.duration = duration;
        }

        if let Some(track) = track {
            let external_change = {
                let mut last = self.lock_last_external();
                if last.as_ref() != Some(&track.key()) {
                    *last = Some(track.key());
                    true
                } else {
                    false
                }
            };

            if external_change && snapshot.track.as_ref().map(Track::key) != Some(track.key()) {
                self.note_external_change(&track).await;
            }
            self.resync_queue(track.key()).await;
            snapshot.track = Some(track);
        }

        self.now_playing.set(snapshot);
        self.rearm_end_timer();
    }

    /// Handles a preview-clip end signal.
    pub(super) async fn on_preview_ended(&self) {
        let key = self.now_playing.get().track.map(|t| t.key());
        if self
            .lock_advance_guard()
            .try_fire(key.as_ref(), Instant::now())
        {
            self.next().await;
        }
    }

    /// An externally-initiated track change (another client switched tracks):
    /// swap artwork, reset the advance guard to the new identity, announce.
    async fn note_external_change(&self, track: &Track) {
        debug!(title = %track.title, "Externally-initiated track change");
        self.lock_advance_guard().reset(Some(track.key()));
        self.swap_artwork(&track.album_art);
        self.emit(PlayerEvent::TrackChanged {
            track: track.clone(),
        });
    }

    pub(super) fn mark_restricted(&self) {
        if !self.restricted.swap(true, Ordering::SeqCst) {
            info!("Remote playback unavailable for this account; polling stopped");
            self.emit(PlayerEvent::Restricted);
        }
    }

    /// Whether the embedded client currently reports live local state.
    pub(super) async fn embedded_live(&self) -> bool {
        let Some(player) = self.embedded_player() else {
            return false;
        };
        player.current_state().await.is_some()
    }

    /// Handles embedded client lifecycle events.
    pub(super) async fn on_embedded_event(
        &self,
        event: super::transport::EmbeddedEvent,
    ) {
        use super::transport::EmbeddedEvent;

        match event {
            EmbeddedEvent::Ready { device_id } => {
                info!(%device_id, "Embedded playback device ready");
                self.embedded_device.set(Some(device_id.clone()));

                // Default the selection to the embedded device unless the
                // user already made an explicit choice.
                if self.settings.selected_device().is_none() {
                    self.settings
                        .set_selected_device(Some(device_id.as_str().to_string()));
                }

                // Register the device with the backend without starting
                // playback, then apply the persisted volume.
                if let Err(e) = self.api.transfer(device_id.as_str(), false).await {
                    debug!("Device registration transfer failed: {e}");
                }
                let volume = Volume::new(self.settings.volume());
                if let Some(player) = self.embedded_player() {
                    if let Err(e) = player.set_volume(volume).await {
                        debug!("Applying persisted volume failed: {e}");
                    }
                }

                self.emit(PlayerEvent::DeviceReady { device_id });
                self.flush_pending().await;
            }
            EmbeddedEvent::NotReady { device_id } => {
                warn!(%device_id, "Embedded playback device went away");
                self.embedded_device.set(None);
                self.emit(PlayerEvent::DeviceGone { device_id });
            }
            EmbeddedEvent::StateChanged(state) => self.on_embedded_state(state).await,
            EmbeddedEvent::Error(message) => {
                warn!("Embedded playback client error: {message}");
            }
        }
    }

    // --- Internal state helpers ------------------------------------------

    /// Optimistically applies a locally-initiated track change before any
    /// command resolves, so consumers reflect intent immediately.
    fn apply_optimistic(&self, track: &Track, playing: bool) {
        let duration = track.duration;

        *self.lock_baseline() = Some(ProgressBaseline::capture(
            Duration::ZERO,
            duration,
            Instant::now(),
        ));
        self.now_playing.set(NowPlaying {
            is_playing: playing,
            elapsed: Duration::ZERO,
            duration,
            track: Some(track.clone()),
        });
        self.swap_artwork(&track.album_art);
        self.emit(PlayerEvent::TrackChanged {
            track: track.clone(),
        });
        self.rearm_end_timer();
    }

    async fn sync_queue_to(&self, track: &Track) {
        let mut queue = self.queue.write().await;
        if let Some(index) = queue.index_of(&track.key()) {
            queue.set_current(index);
        }
    }

    async fn resync_queue(&self, key: TrackKey) {
        let mut queue = self.queue.write().await;
        if let Some(index) = queue.index_of(&key) {
            queue.set_current(index);
        }
    }

    fn near_end(&self, position: Duration, duration: Duration) -> bool {
        !duration.is_zero()
            && duration.saturating_sub(position)
                <= Duration::from_millis(self.tuning.near_end_threshold_ms)
    }

    fn swap_artwork(&self, url: &str) {
        let mut buffers = self.artwork.get();
        if buffers.swap_to(url) {
            self.artwork.set(buffers.clone());
            self.emit(PlayerEvent::ArtworkChanged { buffers });
        }
    }

    /// Pins the interpolation anchor at the current elapsed time.
    fn freeze_progress(&self) {
        let elapsed = self.elapsed();
        let duration = self.now_playing.get().duration;
        self.update_snapshot(|s| s.elapsed = elapsed);
        if !duration.is_zero() {
            *self.lock_baseline() =
                Some(ProgressBaseline::capture(elapsed, duration, Instant::now()));
        }
    }

    /// Restarts interpolation from the snapshot's elapsed time.
    fn reanchor_progress(&self) {
        let snapshot = self.now_playing.get();
        if !snapshot.duration.is_zero() {
            *self.lock_baseline() = Some(ProgressBaseline::capture(
                snapshot.elapsed,
                snapshot.duration,
                Instant::now(),
            ));
        }
    }

    /// Arms the redundant fallback timer that advances the queue if every
    /// end-of-track signal is missed; re-armed on every snapshot update and
    /// debounced by the same guard as the event paths.
    fn rearm_end_timer(&self) {
        let mut slot = self.lock_end_timer();
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let snapshot = self.now_playing.get();
        let Some(track) = snapshot.track else { return };
        if snapshot.duration.is_zero() {
            return;
        }

        let elapsed = match *self.lock_baseline() {
            Some(baseline) => baseline.elapsed_at(Instant::now()),
            None => snapshot.elapsed,
        };
        let delay = snapshot
            .duration
            .saturating_sub(elapsed)
            .saturating_sub(END_TIMER_LEAD)
            .max(END_TIMER_MIN_DELAY);

        let key = track.key();
        let service = self.clone();
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Take our own handle out first so the rearm inside next() does
            // not abort the running advance.
            service.lock_end_timer().take();
            if service
                .lock_advance_guard()
                .try_fire(Some(&key), Instant::now())
            {
                service.next().await;
            }
        }));
    }

    fn update_snapshot(&self, mutate: impl FnOnce(&mut NowPlaying)) {
        let mut snapshot = self.now_playing.get();
        mutate(&mut snapshot);
        self.now_playing.set(snapshot);
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.events_tx.send(event);
    }

    fn embedded_player(&self) -> Option<Arc<dyn EmbeddedPlayer>> {
        self.embedded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn spawn_preview_listener(&self) {
        let mut rx = self.preview.events();
        let service = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(PreviewEvent::Ended) => service.on_preview_ended().await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });
        self.push_task(handle);
    }

    fn push_task(&self, handle: JoinHandle<()>) {
        self.lock_tasks().push(handle);
    }

    fn lock_baseline(&self) -> std::sync::MutexGuard<'_, Option<ProgressBaseline>> {
        self.baseline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_advance_guard(&self) -> std::sync::MutexGuard<'_, AdvanceGuard> {
        self.advance_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<Track>> {
        self.pending_play
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_last_external(&self) -> std::sync::MutexGuard<'_, Option<TrackKey>> {
        self.last_external_key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_end_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.end_timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
