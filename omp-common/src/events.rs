//! Event types for the OMP event system
//!
//! Provides the shared `PlayerEvent` definitions and the `EventBus` used to
//! broadcast them. Events are emitted by the playback engine and consumed by
//! SSE clients and any in-process subscriber.
//!
//! # Architecture
//!
//! OMP uses hybrid communication:
//! - **EventBus** (tokio::broadcast): one-to-many event broadcasting
//! - **Command channels** (tokio::mpsc): request → single engine task
//!
//! All reconciliation happens on the engine task; the bus carries the
//! resulting observable state changes outward.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Transport status of the active player surface
///
/// `Idle` means no item is loaded; `Playing` implies an item is loaded and
/// position is advancing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportStatus {
    Idle,
    Paused,
    Playing,
}

impl std::fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportStatus::Idle => write!(f, "idle"),
            TransportStatus::Paused => write!(f, "paused"),
            TransportStatus::Playing => write!(f, "playing"),
        }
    }
}

/// OMP player event types
///
/// Events are broadcast via `EventBus` and serialized for SSE transmission.
/// All events use this central enum for type safety and exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Transport status changed (Idle / Paused / Playing)
    ///
    /// Triggers:
    /// - SSE: update play/pause controls
    PlaybackStateChanged {
        /// Status before change
        old_state: TransportStatus,
        /// Status after change
        new_state: TransportStatus,
        /// When status changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An item was loaded and became the current transport item
    ///
    /// Triggers:
    /// - History sink: record play start
    /// - SSE: update now-playing display
    ItemStarted {
        /// Item that started
        item_id: Uuid,
        /// Display title (saves a catalog lookup on the UI side)
        title: String,
        /// When the item started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Current item finished or was replaced
    ///
    /// Triggers:
    /// - History sink: record completion (natural completion only)
    /// - SSE: update now-playing display
    ItemCompleted {
        /// Item that completed
        item_id: Uuid,
        /// Seconds of the item actually played
        duration_played_secs: f64,
        /// Whether the item reached natural completion (false if skipped)
        completed: bool,
        /// When the item completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback progress update
    ///
    /// Emitted on element time updates, throttled to the configured progress
    /// interval, and immediately after seek or metadata arrival.
    ///
    /// Triggers:
    /// - SSE: update progress bar and time display
    PlaybackProgress {
        /// Item currently loaded
        item_id: Uuid,
        /// Current position in milliseconds
        position_ms: u64,
        /// Total duration in milliseconds (None until the element reports
        /// metadata; UI renders a placeholder, not 0:00)
        duration_ms: Option<u64>,
        /// Progress update timestamp
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playlist contents or selection changed
    ///
    /// Triggers:
    /// - SSE: update playlist display
    PlaylistChanged {
        /// Item ids in playback order
        item_ids: Vec<Uuid>,
        /// Selected index (None when nothing is selected)
        current_index: Option<usize>,
        /// When the playlist changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume changed
    ///
    /// Triggers:
    /// - SSE: update volume slider
    VolumeChanged {
        /// Previous volume (0.0-1.0)
        old_volume: f32,
        /// New volume (0.0-1.0)
        new_volume: f32,
        /// When volume changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mute toggled
    ///
    /// Triggers:
    /// - SSE: update mute button state
    MutedChanged {
        /// New mute state
        muted: bool,
        /// When mute changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport controls visibility changed (idle-hide policy)
    ///
    /// Controls hide after the configured inactivity timeout while playing
    /// and stay visible whenever playback is not advancing.
    ///
    /// Triggers:
    /// - SSE: show/hide transport controls overlay
    ControlsVisibility {
        /// Whether controls are visible
        visible: bool,
        /// When visibility changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Runtime declined to start playback without a direct user gesture
    ///
    /// Recoverable: the item stays loaded, the UI renders a "tap to play"
    /// prompt and the user re-triggers play directly.
    ///
    /// Triggers:
    /// - SSE: show tap-to-play prompt
    PlaybackBlocked {
        /// Item whose play request was rejected
        item_id: Uuid,
        /// When the rejection was reported
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An item could not be loaded (empty or bad media URL)
    ///
    /// Recoverable: the player falls back to Idle for that item; the user
    /// can skip or retry.
    ///
    /// Triggers:
    /// - SSE: show load-failure notice
    LoadFailed {
        /// Item whose load failed
        item_id: Uuid,
        /// Failure description
        reason: String,
        /// When the failure was reported
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// SSE event name for this variant
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::ItemStarted { .. } => "ItemStarted",
            PlayerEvent::ItemCompleted { .. } => "ItemCompleted",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::PlaylistChanged { .. } => "PlaylistChanged",
            PlayerEvent::VolumeChanged { .. } => "VolumeChanged",
            PlayerEvent::MutedChanged { .. } => "MutedChanged",
            PlayerEvent::ControlsVisibility { .. } => "ControlsVisibility",
            PlayerEvent::PlaybackBlocked { .. } => "PlaybackBlocked",
            PlayerEvent::LoadFailed { .. } => "LoadFailed",
        }
    }
}

/// Event broadcast bus
///
/// Thin wrapper over `tokio::sync::broadcast` sized at construction time.
/// Subscribers that fall behind lose the oldest events.
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Used for the frequent, non-critical events (progress updates,
    /// controls visibility) where a missing subscriber is normal.
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
