use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::core::PlaybackService;
use super::transport::EmbeddedPlayer;

/// Polls the backend's current-playback endpoint and feeds the results into
/// the playback service.
///
/// The loop tears itself down when the session turns out to be restricted
/// (401/403 or the `premium_required` marker); transient failures are logged
/// and the next tick tries again.
pub(super) struct RemotePoller;

impl RemotePoller {
    /// Starts the poll loop on its own task.
    pub(super) fn start(service: PlaybackService) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_millis(service.tuning.poll_interval_ms);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if service.restricted.load(std::sync::atomic::Ordering::SeqCst) {
                    info!("Remote polling stopped: session restricted");
                    return;
                }

                match service.api.current_playback().await {
                    Ok(current) => {
                        let embedded_live = service.embedded_live().await;
                        service.on_remote_poll(current, embedded_live).await;
                    }
                    Err(e) if e.is_restricted() => {
                        service.mark_restricted();
                        return;
                    }
                    Err(e) => debug!("Playback poll failed: {e}"),
                }
            }
        })
    }
}

/// Forwards embedded client events into the playback service.
pub(super) struct EmbeddedPump;

impl EmbeddedPump {
    /// Starts the event pump on its own task.
    pub(super) fn start(
        service: PlaybackService,
        player: Arc<dyn EmbeddedPlayer>,
    ) -> JoinHandle<()> {
        let mut rx = player.events();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => service.on_embedded_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Embedded event stream lagged, skipped {skipped}");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Embedded event stream closed");
                        return;
                    }
                }
            }
        })
    }
}
