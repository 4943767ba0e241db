//! Engine task and the cloneable [`Player`] handle
//!
//! All playback state lives inside a single tokio task that owns the
//! [`PlaybackController`]. Handles talk to it over a command channel, the
//! media element reports back on its own channel, and a coarse interval
//! drives time-based housekeeping. One consumer serializes every mutation,
//! so no locks guard playback state.

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::history::HistorySink;
use crate::playback::adapter::{MediaElement, MediaElementAdapter};
use crate::playback::controller::PlaybackController;
use crate::playback::events::ElementEvent;
use crate::playback::transport::TransportSnapshot;
use omp_common::{EventBus, MediaItem, PlayerEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time;
use tracing::{info, warn};
use uuid::Uuid;

/// Event bus capacity; slow SSE subscribers past this lag and resync
const EVENT_BUS_CAPACITY: usize = 100;

/// Housekeeping interval of the engine task
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Commands a [`Player`] handle sends to the engine task
#[derive(Debug)]
pub enum PlayerCommand {
    SelectAndPlay {
        item_id: Uuid,
        reply: oneshot::Sender<Result<()>>,
    },
    SelectIndex {
        index: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    TogglePlayPause,
    Next,
    Previous,
    SeekTo {
        position_secs: f64,
    },
    SkipBy {
        delta_secs: f64,
    },
    SetVolume {
        volume: f32,
    },
    SetMuted {
        muted: bool,
    },
    ReplacePlaylist {
        items: Vec<Arc<MediaItem>>,
    },
    ShufflePlaylist,
    PointerActivity,
    SetFavorite {
        item_id: Uuid,
        favorited: bool,
    },
    Snapshot {
        reply: oneshot::Sender<TransportSnapshot>,
    },
}

/// Cloneable handle to the playback engine
///
/// Commands are queued in submission order; fire-and-forget operations
/// return immediately, fallible ones await the engine's reply.
#[derive(Clone)]
pub struct Player {
    command_tx: mpsc::UnboundedSender<PlayerCommand>,
    bus: Arc<EventBus>,
}

impl Player {
    /// Spawn the engine task around `element` and return a handle to it
    pub fn launch(
        config: &PlayerConfig,
        element: Box<dyn MediaElement>,
        sink: Arc<dyn HistorySink>,
    ) -> Player {
        let bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (element_tx, element_rx) = mpsc::unbounded_channel();

        let adapter = MediaElementAdapter::new(element, element_tx);
        let controller = PlaybackController::new(
            adapter,
            bus.clone(),
            sink,
            config.default_volume_f32(),
            config.controls_hide(),
            config.progress_interval(),
        );

        tokio::spawn(engine_loop(controller, command_rx, element_rx));

        Player { command_tx, bus }
    }

    /// Select `item_id` in the playlist and start playing it
    pub async fn select_and_play(&self, item_id: Uuid) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::SelectAndPlay { item_id, reply });
        rx.await.map_err(|_| Self::engine_gone())?
    }

    /// Select the playlist entry at `index` and start playing it
    pub async fn select_index(&self, index: usize) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::SelectIndex { index, reply });
        rx.await.map_err(|_| Self::engine_gone())?
    }

    pub fn toggle_play_pause(&self) {
        self.send(PlayerCommand::TogglePlayPause);
    }

    pub fn next(&self) {
        self.send(PlayerCommand::Next);
    }

    pub fn previous(&self) {
        self.send(PlayerCommand::Previous);
    }

    pub fn seek_to(&self, position_secs: f64) {
        self.send(PlayerCommand::SeekTo { position_secs });
    }

    pub fn skip_by(&self, delta_secs: f64) {
        self.send(PlayerCommand::SkipBy { delta_secs });
    }

    /// Set volume on the internal 0.0..=1.0 scale
    pub fn set_volume(&self, volume: f32) {
        self.send(PlayerCommand::SetVolume { volume });
    }

    pub fn set_muted(&self, muted: bool) {
        self.send(PlayerCommand::SetMuted { muted });
    }

    pub fn replace_playlist(&self, items: Vec<Arc<MediaItem>>) {
        self.send(PlayerCommand::ReplacePlaylist { items });
    }

    pub fn shuffle_playlist(&self) {
        self.send(PlayerCommand::ShufflePlaylist);
    }

    pub fn pointer_activity(&self) {
        self.send(PlayerCommand::PointerActivity);
    }

    pub fn set_favorite(&self, item_id: Uuid, favorited: bool) {
        self.send(PlayerCommand::SetFavorite { item_id, favorited });
    }

    /// Current transport snapshot, serialized behind any queued commands
    pub async fn snapshot(&self) -> Result<TransportSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot { reply });
        rx.await.map_err(|_| Self::engine_gone())
    }

    /// Subscribe to the player event stream
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.bus.subscribe()
    }

    fn send(&self, command: PlayerCommand) {
        if self.command_tx.send(command).is_err() {
            warn!("Playback engine task is gone, dropping command");
        }
    }

    fn engine_gone() -> Error {
        Error::Internal("playback engine task is gone".to_string())
    }
}

async fn engine_loop(
    mut controller: PlaybackController,
    mut command_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    mut element_rx: mpsc::UnboundedReceiver<ElementEvent>,
) {
    let mut tick = time::interval(TICK_INTERVAL);
    info!("Playback engine task started");

    loop {
        tokio::select! {
            command = command_rx.recv() => {
                match command {
                    Some(command) => handle_command(&mut controller, command),
                    None => {
                        info!("All player handles dropped, stopping engine");
                        break;
                    }
                }
            }
            Some(event) = element_rx.recv() => {
                controller.handle_element_event(event, Instant::now());
            }
            _ = tick.tick() => {
                controller.tick(Instant::now());
            }
        }
    }
}

fn handle_command(controller: &mut PlaybackController, command: PlayerCommand) {
    let now = Instant::now();
    match command {
        PlayerCommand::SelectAndPlay { item_id, reply } => {
            let _ = reply.send(controller.select_and_play(item_id, now));
        }
        PlayerCommand::SelectIndex { index, reply } => {
            let _ = reply.send(controller.select_index(index, now));
        }
        PlayerCommand::TogglePlayPause => controller.toggle_play_pause(now),
        PlayerCommand::Next => controller.next(now),
        PlayerCommand::Previous => controller.previous(now),
        PlayerCommand::SeekTo { position_secs } => controller.seek_to(position_secs, now),
        PlayerCommand::SkipBy { delta_secs } => controller.skip_by(delta_secs, now),
        PlayerCommand::SetVolume { volume } => controller.set_volume(volume),
        PlayerCommand::SetMuted { muted } => controller.set_muted(muted),
        PlayerCommand::ReplacePlaylist { items } => controller.replace_playlist(items),
        PlayerCommand::ShufflePlaylist => controller.shuffle_playlist(),
        PlayerCommand::PointerActivity => controller.pointer_activity(now),
        PlayerCommand::SetFavorite { item_id, favorited } => {
            controller.set_favorite(item_id, favorited)
        }
        PlayerCommand::Snapshot { reply } => {
            let _ = reply.send(controller.snapshot());
        }
    }
}
